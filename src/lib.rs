//! Caption Forge - turn YouTube captions into ready-to-publish content
//!
//! This library fetches a video's caption track through a list of fallback
//! Invidious proxy instances and hands the raw caption text to Google Gemini,
//! which writes a blog post, a short thread and a list of key facts in the
//! requested language.

pub mod captions;
pub mod cli;
pub mod config;
pub mod extractors;
pub mod output;
pub mod pipeline;
pub mod synthesis;
pub mod utils;

pub use captions::{CaptionTrack, Transcript, TranscriptSource};
pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use extractors::{extract_video_id, VideoId};
pub use pipeline::{ContentPipeline, GeneratedContent, GenerationRequest};
pub use synthesis::{ContentGenerator, OutputLanguage, SynthesisError};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to caption-forge
#[derive(thiserror::Error, Debug)]
pub enum ConverterError {
    #[error("Invalid URL: no video ID found in {0:?}")]
    InvalidUrl(String),

    #[error("Enter a URL")]
    MissingUrl,

    #[error("API key required")]
    MissingCredential,

    #[error("Failed to fetch transcript for {0}. The video might not have captions, or all proxies are busy.")]
    TranscriptNotFound(String),

    #[error("Gemini error: {0}")]
    Synthesis(#[from] SynthesisError),
}
