use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod proxy;

pub use proxy::ProxyCaptionFetcher;

use crate::extractors::VideoId;
use crate::Result;

/// A caption track as advertised by an Invidious instance
///
/// Every field falls back to an empty string so a partially filled record
/// never fails the whole response. `label` and `language_code` are what
/// stock Invidious instances send; they only fill in for an empty
/// `language` or `code`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionTrack {
    /// Human readable language name, e.g. "Korean"
    #[serde(default)]
    pub language: String,

    /// Short locale code, e.g. "ko"
    #[serde(default)]
    pub code: String,

    /// Caption URL, usually relative to the instance that listed it
    #[serde(default)]
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

impl CaptionTrack {
    /// Language name, falling back to the Invidious `label`
    pub fn language_name(&self) -> &str {
        match self.label.as_deref() {
            Some(label) if self.language.is_empty() => label,
            _ => &self.language,
        }
    }

    /// Locale code, falling back to the Invidious `language_code`
    pub fn locale_code(&self) -> &str {
        match self.language_code.as_deref() {
            Some(code) if self.code.is_empty() => code,
            _ => &self.code,
        }
    }

    fn matches(&self, language: &str, code: &str) -> bool {
        self.language_name() == language || self.locale_code() == code
    }

    /// Tracks without a URL cannot be downloaded
    pub fn is_downloadable(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

/// Subset of the `/api/v1/videos/{id}` response this crate relies on
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub captions: Vec<CaptionTrack>,
}

/// Caption languages tried in order before falling back to the first track
const PREFERRED_LANGUAGES: &[(&str, &str)] = &[("Korean", "ko"), ("English", "en")];

/// Pick the caption track to download.
///
/// Korean wins over English, English over everything else; with neither
/// present the first listed track is used, which is typically the
/// auto-generated one. The pick may lack a URL, in which case the caller
/// gives up on the instance.
pub fn select_track(captions: &[CaptionTrack]) -> Option<&CaptionTrack> {
    PREFERRED_LANGUAGES
        .iter()
        .find_map(|(language, code)| captions.iter().find(|track| track.matches(language, code)))
        .or_else(|| captions.first())
}

/// Raw caption text together with where it came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub video_id: VideoId,

    /// Base URL of the proxy instance that served the captions
    pub endpoint: String,

    /// The track that was downloaded
    pub track: CaptionTrack,

    /// Unparsed caption payload (VTT, JSON3, ...)
    pub text: String,
}

impl Transcript {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Anything that can turn a video ID into caption text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the captions for a video
    async fn fetch_transcript(&self, video_id: &VideoId) -> Result<Transcript>;

    /// Short name used in logs
    fn source_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(language: &str, code: &str) -> CaptionTrack {
        CaptionTrack {
            language: language.to_string(),
            code: code.to_string(),
            url: format!("/api/v1/captions/x?lang={}", code),
            ..CaptionTrack::default()
        }
    }

    #[test]
    fn test_select_korean_regardless_of_position() {
        let captions = vec![track("Japanese", "ja"), track("Korean", "ko"), track("English", "en")];
        assert_eq!(select_track(&captions).unwrap().code, "ko");
    }

    #[test]
    fn test_select_matches_on_code_or_language() {
        let by_code = vec![track("Japanese", "ja"), track("한국어", "ko")];
        assert_eq!(select_track(&by_code).unwrap().code, "ko");

        let by_name = vec![track("Japanese", "ja"), track("English", "en-US")];
        assert_eq!(select_track(&by_name).unwrap().code, "en-US");
    }

    #[test]
    fn test_select_english_when_no_korean() {
        let captions = vec![track("Japanese", "ja"), track("German", "de"), track("English", "en")];
        assert_eq!(select_track(&captions).unwrap().code, "en");
    }

    #[test]
    fn test_select_falls_back_to_first_track() {
        let captions = vec![track("Japanese", "ja")];
        assert_eq!(select_track(&captions).unwrap().code, "ja");
    }

    #[test]
    fn test_select_empty() {
        assert!(select_track(&[]).is_none());
    }

    #[test]
    fn test_select_keeps_priority_when_url_missing() {
        let mut korean = track("Korean", "ko");
        korean.url.clear();
        let captions = vec![korean, track("English", "en")];

        let picked = select_track(&captions).unwrap();
        assert_eq!(picked.code, "ko");
        assert!(!picked.is_downloadable());
    }

    #[test]
    fn test_video_info_schema_defaults() {
        let info: VideoInfo = serde_json::from_str(r#"{"title": "no captions here"}"#).unwrap();
        assert!(info.captions.is_empty());

        let info: VideoInfo = serde_json::from_str(
            r#"{"captions": [{"label": "English (auto-generated)", "language_code": "en", "url": "/c"}, {"code": "ko"}]}"#,
        )
        .unwrap();
        assert_eq!(info.captions[0].language_name(), "English (auto-generated)");
        assert_eq!(info.captions[0].locale_code(), "en");
        assert_eq!(info.captions[1].url, "");
    }

    #[test]
    fn test_video_info_with_label_next_to_language() {
        let info: VideoInfo = serde_json::from_str(
            r#"{"captions":[{"language":"Korean","label":"한국어","code":"ko","language_code":"ko-KR","url":"/c?lang=ko"}]}"#,
        )
        .unwrap();

        let track = &info.captions[0];
        assert_eq!(track.language_name(), "Korean");
        assert_eq!(track.locale_code(), "ko");
        assert_eq!(select_track(&info.captions).unwrap().url, "/c?lang=ko");
    }

    #[test]
    fn test_select_matches_invidious_fields() {
        let info: VideoInfo = serde_json::from_str(
            r#"{"captions":[{"label":"Japanese","language_code":"ja","url":"/ja"},{"label":"Korean","language_code":"ko","url":"/ko"}]}"#,
        )
        .unwrap();
        assert_eq!(select_track(&info.captions).unwrap().url, "/ko");
    }
}
