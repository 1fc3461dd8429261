//! Configuration settings for vidsum.

use crate::error::{Result, VidsumError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub processing: ProcessingSettings,
    pub rate_limit: RateLimitSettings,
    pub model: ModelSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory where `<video>_summary.json` artifacts are written and looked up.
    pub output_dir: String,
    /// Log level (trace, debug, info, warn, error) used when no `-v` flag is given.
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            output_dir: "output".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Chunking and summary shaping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingSettings {
    /// Length of each video chunk in seconds.
    pub chunk_seconds: f64,
    /// Hard cap on stored summary length, in characters.
    pub max_summary_chars: usize,
    /// JPEG quality for frames sent to the model (1-100).
    pub jpeg_quality: u8,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            chunk_seconds: 30.0,
            max_summary_chars: 1500,
            jpeg_quality: 80,
        }
    }
}

/// Pacing and backoff settings for remote calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Delay between chunks for the first `step_every` chunks.
    pub base_delay_secs: u64,
    /// Added delay for every further `step_every` chunks.
    pub step_delay_secs: u64,
    /// Number of chunks per pacing tier.
    pub step_every: usize,
    /// Upper bound on the pacing delay.
    pub max_delay_secs: u64,
    /// Wait after a rate-limited call before the single retry.
    pub rate_limit_backoff_secs: u64,
    /// Fixed delay before each chunk attempt when resuming.
    pub resume_delay_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            base_delay_secs: 2,
            step_delay_secs: 2,
            step_every: 10,
            max_delay_secs: 6,
            rate_limit_backoff_secs: 60,
            resume_delay_secs: 3,
        }
    }
}

/// Remote model provider.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    /// Google Gemini `generateContent` REST API.
    #[default]
    Gemini,
}

impl std::fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelProvider::Gemini => write!(f, "gemini"),
        }
    }
}

/// Remote multimodal model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub provider: ModelProvider,
    /// Model name.
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// API base URL.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: ModelProvider::Gemini,
            model: "gemini-1.5-pro".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_secs: crate::http::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ModelSettings {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            Ok(_) => Err(VidsumError::Config(format!("{} is empty", self.api_key_env))),
            Err(_) => Err(VidsumError::Config(format!(
                "{} not set. Set it with: export {}='...'",
                self.api_key_env, self.api_key_env
            ))),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| VidsumError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        let p = &self.processing;
        if !(p.chunk_seconds.is_finite() && p.chunk_seconds > 0.0) {
            return Err(VidsumError::Config(format!(
                "processing.chunk_seconds must be positive, got {}",
                p.chunk_seconds
            )));
        }
        if p.max_summary_chars <= 3 {
            return Err(VidsumError::Config(format!(
                "processing.max_summary_chars must be greater than 3, got {}",
                p.max_summary_chars
            )));
        }
        if !(1..=100).contains(&p.jpeg_quality) {
            return Err(VidsumError::Config(format!(
                "processing.jpeg_quality must be within 1-100, got {}",
                p.jpeg_quality
            )));
        }
        if self.rate_limit.step_every == 0 {
            return Err(VidsumError::Config(
                "rate_limit.step_every must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vidsum")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded output directory path.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.output_dir)
    }
}
