use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{ConverterError, Result};

/// Length of a YouTube video ID
pub const VIDEO_ID_LEN: usize = 11;

/// Matches an 11-character video ID after `v=` or a path separator
static VIDEO_ID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11})").expect("Failed to compile video ID regex")
});

/// A YouTube video identifier, always exactly 11 characters of `[0-9A-Za-z_-]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VideoId(String);

impl VideoId {
    /// Accept a bare video ID such as `dQw4w9WgXcQ`
    pub fn parse(raw: &str) -> Result<Self> {
        Ok(Self::try_from(raw.to_string())?)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for VideoId {
    type Error = ConverterError;

    fn try_from(raw: String) -> std::result::Result<Self, Self::Error> {
        if is_valid_id(&raw) {
            Ok(Self(raw))
        } else {
            Err(ConverterError::InvalidUrl(raw))
        }
    }
}

impl From<VideoId> for String {
    fn from(id: VideoId) -> Self {
        id.0
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_valid_id(raw: &str) -> bool {
    raw.len() == VIDEO_ID_LEN
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Extract the video ID from any of the usual YouTube URL shapes
/// (`watch?v=`, `youtu.be/`, `embed/`, `shorts/`, ...).
///
/// The first match anywhere in the string wins. Input without a match,
/// including the empty string, yields [`ConverterError::InvalidUrl`].
pub fn extract_video_id(url: &str) -> Result<VideoId> {
    let id = VIDEO_ID_REGEX
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ConverterError::InvalidUrl(url.to_string()))?;

    tracing::debug!("Extracted video ID {} from {}", id, url);
    Ok(VideoId(id))
}
