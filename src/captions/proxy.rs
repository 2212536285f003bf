use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use super::{select_track, Transcript, TranscriptSource, VideoInfo};
use crate::config::ProxyConfig;
use crate::extractors::VideoId;
use crate::{ConverterError, Result};

/// Fetches captions through a fixed, ordered list of Invidious instances.
///
/// Instances are tried one after another. The first instance that lists a
/// usable caption track *and* serves its content ends the search, even if a
/// later instance might offer a better language.
pub struct ProxyCaptionFetcher {
    client: Client,
    endpoints: Vec<String>,
    info_timeout: Duration,
    download_timeout: Option<Duration>,
}

impl ProxyCaptionFetcher {
    pub fn new(config: &ProxyConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoints: config
                .endpoints
                .iter()
                .map(|e| e.trim_end_matches('/').to_string())
                .collect(),
            info_timeout: Duration::from_secs(config.info_timeout_secs),
            download_timeout: config.download_timeout_secs.map(Duration::from_secs),
        })
    }

    /// Override the per-instance info request timeout
    pub fn with_info_timeout(mut self, timeout: Duration) -> Self {
        self.info_timeout = timeout;
        self
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Try a single instance. `Ok(None)` means it answered but had nothing usable.
    async fn try_endpoint(&self, endpoint: &str, video_id: &VideoId) -> Result<Option<Transcript>> {
        let info = self.get_video_info(endpoint, video_id).await?;

        let Some(track) = select_track(&info.captions) else {
            tracing::info!("{} lists no usable captions for {}", endpoint, video_id);
            return Ok(None);
        };

        tracing::debug!(
            "Selected caption track {} ({}) from {}",
            track.language_name(),
            track.locale_code(),
            endpoint
        );

        if !track.is_downloadable() {
            anyhow::bail!("Selected caption track {} has no URL", track.locale_code());
        }

        let caption_url = resolve_caption_url(endpoint, &track.url);
        let text = self.download_captions(&caption_url).await?;

        Ok(Some(Transcript {
            video_id: video_id.clone(),
            endpoint: endpoint.to_string(),
            track: track.clone(),
            text,
        }))
    }

    async fn get_video_info(&self, endpoint: &str, video_id: &VideoId) -> Result<VideoInfo> {
        let info_url = format!("{}/api/v1/videos/{}", endpoint, video_id);
        tracing::debug!("Requesting video info: {}", info_url);

        let response = self
            .client
            .get(&info_url)
            .timeout(self.info_timeout)
            .send()
            .await
            .with_context(|| format!("Video info request to {} failed", endpoint))?;

        if response.status() != StatusCode::OK {
            anyhow::bail!("Video info request returned HTTP {}", response.status());
        }

        let body = response
            .text()
            .await
            .context("Failed to read video info body")?;

        let value: serde_json::Value =
            serde_json::from_str(&body).context("Video info body is not valid JSON")?;

        // A JSON body that does not fit the schema counts as "no captions"
        Ok(serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::warn!("Unexpected video info shape from {}: {}", endpoint, e);
            VideoInfo::default()
        }))
    }

    async fn download_captions(&self, caption_url: &str) -> Result<String> {
        tracing::debug!("Downloading captions: {}", caption_url);

        let mut request = self.client.get(caption_url);
        if let Some(timeout) = self.download_timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .context("Caption download failed")?;

        if response.status() != StatusCode::OK {
            anyhow::bail!("Caption download returned HTTP {}", response.status());
        }

        response
            .text()
            .await
            .context("Failed to read caption body")
    }
}

#[async_trait]
impl TranscriptSource for ProxyCaptionFetcher {
    async fn fetch_transcript(&self, video_id: &VideoId) -> Result<Transcript> {
        tracing::info!("Target video ID: {}", video_id);

        for endpoint in &self.endpoints {
            tracing::info!("Trying proxy: {}", endpoint);

            match self.try_endpoint(endpoint, video_id).await {
                Ok(Some(transcript)) => {
                    tracing::info!(
                        "Fetched {} caption characters ({}) from {}",
                        transcript.char_count(),
                        transcript.track.locale_code(),
                        endpoint
                    );
                    return Ok(transcript);
                }
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!("Failed with {}: {:#}", endpoint, e);
                    continue;
                }
            }
        }

        Err(ConverterError::TranscriptNotFound(video_id.to_string()).into())
    }

    fn source_name(&self) -> &'static str {
        "Invidious"
    }
}

/// Join a caption URL onto the instance it was listed by.
/// Absolute URLs are used unchanged.
fn resolve_caption_url(endpoint: &str, track_url: &str) -> String {
    if track_url.starts_with("http://") || track_url.starts_with("https://") {
        return track_url.to_string();
    }

    let base = endpoint.trim_end_matches('/');
    if track_url.starts_with('/') {
        format!("{}{}", base, track_url)
    } else {
        format!("{}/{}", base, track_url)
    }
}
