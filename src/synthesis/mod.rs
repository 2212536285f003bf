use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub mod gemini;

pub use gemini::GeminiClient;

use crate::Result;

/// Languages the generated content can be written in
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputLanguage {
    Korean,
    English,
    Japanese,
    Spanish,
}

impl OutputLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputLanguage::Korean => "Korean",
            OutputLanguage::English => "English",
            OutputLanguage::Japanese => "Japanese",
            OutputLanguage::Spanish => "Spanish",
        }
    }
}

impl std::fmt::Display for OutputLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures of the generation call
#[derive(thiserror::Error, Debug)]
pub enum SynthesisError {
    #[error("API key rejected (HTTP {status}): {message}")]
    Auth { status: u16, message: String },

    #[error("{0}")]
    Upstream(String),
}

/// Anything that can write derivative content from a transcript
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Run one generation request and return the model's text verbatim
    async fn generate(&self, transcript: &str, api_key: &str, language: OutputLanguage) -> Result<String>;

    /// Model identifier reported in results
    fn model_name(&self) -> String;
}

/// Cut `text` down to its first `max_chars` characters (not bytes)
pub fn truncate_transcript(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Build the instruction prompt around an already truncated transcript
pub fn build_prompt(transcript: &str, language: OutputLanguage) -> String {
    format!(
        r#"Analyze the following YouTube transcript (VTT/JSON format) and create:
1. [Blog Post] Title, Intro, Body, Conclusion.
2. [Twitter Thread] 3-5 tweets.
3. [Fact Check] Key numbers/facts.

Target Language: {language}

[Transcript Data]:
{transcript}
"#
    )
}
