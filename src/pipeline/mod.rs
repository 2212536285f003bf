use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::captions::{CaptionTrack, ProxyCaptionFetcher, Transcript, TranscriptSource};
use crate::config::Config;
use crate::extractors::{extract_video_id, VideoId};
use crate::synthesis::{ContentGenerator, GeminiClient, OutputLanguage};
use crate::{ConverterError, Result};

/// What the user asked for
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub url: String,
    pub api_key: String,
    pub language: OutputLanguage,
}

/// Generated content with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedContent {
    /// Model output, rendered as-is
    pub content: String,

    /// Generation metadata
    pub metadata: GenerationMetadata,
}

/// Metadata about one generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationMetadata {
    pub video_id: VideoId,

    /// Proxy instance that served the captions
    pub endpoint: String,

    /// Caption track that was used
    pub caption_track: CaptionTrack,

    /// Caption characters downloaded
    pub transcript_chars: usize,

    /// Whether the captions were cut before generation
    pub truncated: bool,

    pub model: String,

    pub language: OutputLanguage,

    /// Processing time in seconds
    pub processing_duration: f64,

    pub completed_at: chrono::DateTime<chrono::Utc>,
}

/// URL -> video ID -> captions -> Gemini
pub struct ContentPipeline {
    source: Box<dyn TranscriptSource>,
    generator: Box<dyn ContentGenerator>,
    max_transcript_chars: usize,
    show_progress: bool,
}

impl ContentPipeline {
    /// Create a pipeline backed by the configured proxies and Gemini
    pub fn new(config: &Config) -> Result<Self> {
        let source = ProxyCaptionFetcher::new(&config.proxy)?;
        let generator = GeminiClient::new(&config.synthesis)?;

        Ok(Self::with_components(Box::new(source), Box::new(generator), config))
    }

    /// Create a pipeline from explicit components
    pub fn with_components(
        source: Box<dyn TranscriptSource>,
        generator: Box<dyn ContentGenerator>,
        config: &Config,
    ) -> Self {
        Self {
            source,
            generator,
            max_transcript_chars: config.synthesis.max_transcript_chars,
            show_progress: config.app.show_progress,
        }
    }

    /// Run the whole flow for one request
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedContent> {
        if request.api_key.trim().is_empty() {
            return Err(ConverterError::MissingCredential.into());
        }

        let started = std::time::Instant::now();
        let transcript = self.fetch_only(&request.url).await?;

        let progress = self.spinner();
        progress.set_message(format!(
            "Transcript found! Generating content with {}...",
            self.generator.model_name()
        ));

        let result = self
            .generator
            .generate(&transcript.text, request.api_key.trim(), request.language)
            .await;
        progress.finish_and_clear();
        let content = result?;

        let transcript_chars = transcript.char_count();

        Ok(GeneratedContent {
            content,
            metadata: GenerationMetadata {
                video_id: transcript.video_id,
                endpoint: transcript.endpoint,
                caption_track: transcript.track,
                transcript_chars,
                truncated: transcript_chars > self.max_transcript_chars,
                model: self.generator.model_name(),
                language: request.language,
                processing_duration: started.elapsed().as_secs_f64(),
                completed_at: chrono::Utc::now(),
            },
        })
    }

    /// Resolve the URL and download its captions without calling the model
    pub async fn fetch_only(&self, url: &str) -> Result<Transcript> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ConverterError::MissingUrl.into());
        }

        let video_id = extract_video_id(url)?;

        let progress = self.spinner();
        progress.set_message(format!(
            "Connecting to {} proxy servers...",
            self.source.source_name()
        ));

        let result = self.source.fetch_transcript(&video_id).await;
        progress.finish_and_clear();
        result
    }

    fn spinner(&self) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new_spinner();
        progress.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        progress.enable_steady_tick(Duration::from_millis(120));
        progress
    }
}
