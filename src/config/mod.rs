use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;
use crate::synthesis::OutputLanguage;
use crate::utils;

/// Public Invidious instances, in fallback order
pub const DEFAULT_ENDPOINTS: &[&str] = &[
    "https://inv.tux.pizza",
    "https://vid.puffyan.us",
    "https://invidious.projectsegfau.lt",
    "https://inv.us.projectsegfau.lt",
    "https://invidious.fdn.fr",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Caption proxy settings
    pub proxy: ProxyConfig,

    /// Gemini settings
    pub synthesis: SynthesisConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Invidious base URLs, tried in order
    pub endpoints: Vec<String>,

    /// Timeout for the video info request, per instance
    pub info_timeout_secs: u64,

    /// Timeout for the caption download (none by default)
    pub download_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Base URL of the Generative Language API
    pub api_base: String,

    /// Gemini model name
    pub model: String,

    /// Caption characters sent to the model
    pub max_transcript_chars: usize,

    /// Timeout for the generation call (none by default)
    pub request_timeout_secs: Option<u64>,

    /// Output language when none is given on the command line
    pub default_language: OutputLanguage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Show a spinner with status messages
    pub show_progress: bool,

    /// Default output format
    pub default_output_format: OutputFormat,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            endpoints: DEFAULT_ENDPOINTS.iter().map(|e| e.to_string()).collect(),
            info_timeout_secs: 5,
            download_timeout_secs: None,
        }
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.5-flash".to_string(),
            max_transcript_chars: 80_000,
            request_timeout_secs: None,
            default_language: OutputLanguage::Korean,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            default_output_format: OutputFormat::Markdown,
        }
    }
}

impl Config {
    /// Load configuration from an explicit path, the usual locations, or defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load and validate a YAML config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path)
            .context("Failed to read config file")?;

        let config: Config = serde_yaml::from_str(&content)
            .context("Failed to parse config file")?;

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Where the config file is looked up when none is given
    pub fn config_path() -> Option<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir().map(|dir| dir.join("caption-forge").join("config.yaml"))
    }

    /// Default location for `config --init`
    pub fn default_save_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("caption-forge").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.proxy.endpoints.is_empty() {
            anyhow::bail!("At least one proxy endpoint must be configured");
        }

        for endpoint in &self.proxy.endpoints {
            utils::validate_and_normalize_url(endpoint)
                .with_context(|| format!("Invalid proxy endpoint: {}", endpoint))?;
        }

        if self.proxy.info_timeout_secs == 0 {
            anyhow::bail!("proxy.info_timeout_secs must be greater than zero");
        }

        utils::validate_and_normalize_url(&self.synthesis.api_base)
            .context("Invalid synthesis.api_base")?;

        if self.synthesis.model.trim().is_empty() {
            anyhow::bail!("synthesis.model must not be empty");
        }

        if self.synthesis.max_transcript_chars == 0 {
            anyhow::bail!("synthesis.max_transcript_chars must be greater than zero");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Proxy endpoints:");
        for (i, endpoint) in self.proxy.endpoints.iter().enumerate() {
            println!("    {}. {}", i + 1, endpoint);
        }
        println!("  Info timeout: {}s", self.proxy.info_timeout_secs);
        match self.proxy.download_timeout_secs {
            Some(secs) => println!("  Download timeout: {}s", secs),
            None => println!("  Download timeout: none"),
        }
        println!("  Gemini API: {}", self.synthesis.api_base);
        println!("  Model: {}", self.synthesis.model);
        println!("  Max transcript chars: {}", self.synthesis.max_transcript_chars);
        println!("  Default language: {}", self.synthesis.default_language);
        println!("  Default format: {}", self.app.default_output_format);
        println!("  Show progress: {}", self.app.show_progress);
    }
}
