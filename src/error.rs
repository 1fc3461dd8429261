//! Error types for vidsum.

use std::path::PathBuf;
use thiserror::Error;

/// Library-level error type for vidsum operations.
///
/// These are fatal for the run that raised them. Per-chunk inference failures are
/// reported separately through [`crate::inference::InferenceError`] and never end up here.
#[derive(Error, Debug)]
pub enum VidsumError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Video file not found: {}", .0.display())]
    MediaNotFound(PathBuf),

    #[error("Failed to decode media: {0}")]
    Decode(String),

    #[error("Failed to write summary to {}: {source}", path.display())]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Existing summary does not match the current video layout: {0}. \
         Re-run with --force to reprocess from scratch."
    )]
    LayoutMismatch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for vidsum operations.
pub type Result<T> = std::result::Result<T, VidsumError>;
