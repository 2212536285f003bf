use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::synthesis::OutputLanguage;

#[derive(Parser)]
#[command(
    name = "caption-forge",
    about = "Caption Forge - Turn YouTube captions into blog posts, threads and fact lists with Gemini",
    version,
    long_about = "Fetches a video's captions through public Invidious proxies (falling back from one instance to the next) and asks Google Gemini to write a blog post, a short thread and a list of key facts in the language of your choice."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use this config file instead of the default locations
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch captions for a video and generate content from them
    Generate {
        /// YouTube URL (watch, youtu.be, embed, shorts, ...)
        #[arg(value_name = "URL")]
        url: String,

        /// Gemini API key (prompted for when omitted on a terminal)
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Output language (defaults to the configured language)
        #[arg(short, long, value_enum)]
        language: Option<OutputLanguage>,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format (defaults to the configured format)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Download the raw captions only
    Fetch {
        /// YouTube URL
        #[arg(value_name = "URL")]
        url: String,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show or initialise the configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,

        /// Write a default config file
        #[arg(long, conflicts_with = "show")]
        init: bool,
    },

    /// List the caption proxies in the order they are tried
    Proxies,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Generated markdown, as returned by the model
    Markdown,
    /// JSON with metadata
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
