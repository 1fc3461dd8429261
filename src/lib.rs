//! vidsum - chunked video summarization
//!
//! Splits a video into fixed-length time chunks, samples a few representative frames per
//! chunk, asks a multimodal model for a summary of each and keeps every chunk's outcome in a
//! single JSON file per video. Failed chunks can be re-driven later without redoing the rest.
//!
//! # Architecture
//!
//! - `chunking` - Fixed-length timeline segmentation
//! - `media` - Video probing and frame sampling (ffmpeg)
//! - `inference` - Multimodal model client and summary shaping
//! - `rate_control` - Pacing and rate-limit backoff
//! - `store` - Summary artifact persistence and failure classification
//! - `orchestrator` - Fresh, reuse and resume runs
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use vidsum::config::Settings;
//! use vidsum::orchestrator::{Orchestrator, RunDecision};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let outcome = orchestrator
//!         .process_video(Path::new("talk.mp4"), false, None, |_| RunDecision::Resume)
//!         .await?;
//!     println!("{} chunks in {}", outcome.summary.total_chunk_count, outcome.path.display());
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod inference;
pub mod media;
pub mod orchestrator;
pub mod rate_control;
pub mod store;

pub use error::{Result, VidsumError};
