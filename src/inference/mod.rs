//! Remote chunk summarization.
//!
//! [`VisionModel`] is the single-attempt call to a multimodal provider. [`InferenceClient`]
//! wraps it with the instruction template, JPEG encoding of frames and the summary length cap.
//! Neither retries: the orchestrator owns retry policy.

mod gemini;

pub use gemini::GeminiClient;

use crate::chunking::Chunk;
use crate::config::{Prompts, Settings};
use crate::media::Frame;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

/// Appended to summaries cut at the length cap.
pub const ELLIPSIS: &str = "...";

/// Outcome of a failed inference attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    /// The provider throttled the request (HTTP 429 or equivalent).
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Any other failure: transport, server error, empty response, bad payload.
    #[error("{0}")]
    Other(String),
}

impl InferenceError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, InferenceError::RateLimited(_))
    }
}

/// An inline image attached to a request.
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl InlineImage {
    pub fn jpeg(data: Vec<u8>) -> Self {
        Self {
            mime_type: "image/jpeg".to_string(),
            data,
        }
    }
}

/// Trait for multimodal text generation services.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Provider/model name for logs.
    fn name(&self) -> &str;

    /// Send one instruction with ordered images and return the generated text.
    async fn generate(
        &self,
        instruction: &str,
        images: &[InlineImage],
    ) -> Result<String, InferenceError>;
}

/// Summarizes one chunk per call.
pub struct InferenceClient {
    model: Arc<dyn VisionModel>,
    prompts: Prompts,
    chunk_seconds: f64,
    max_chars: usize,
    jpeg_quality: u8,
}

impl InferenceClient {
    pub fn new(
        model: Arc<dyn VisionModel>,
        prompts: Prompts,
        chunk_seconds: f64,
        max_chars: usize,
        jpeg_quality: u8,
    ) -> Self {
        Self {
            model,
            prompts,
            chunk_seconds,
            max_chars,
            jpeg_quality,
        }
    }

    /// Build a client from settings.
    pub fn from_settings(model: Arc<dyn VisionModel>, prompts: Prompts, settings: &Settings) -> Self {
        Self::new(
            model,
            prompts,
            settings.processing.chunk_seconds,
            settings.processing.max_summary_chars,
            settings.processing.jpeg_quality,
        )
    }

    /// Render the instruction for a chunk.
    pub fn instruction(&self, chunk: &Chunk) -> String {
        let mut vars = HashMap::new();
        vars.insert("chunk_seconds".to_string(), format_seconds(self.chunk_seconds));
        vars.insert("timestamp".to_string(), chunk.timestamp_label());
        vars.insert("duration".to_string(), format!("{:.2}", chunk.duration()));
        vars.insert("max_chars".to_string(), self.max_chars.to_string());

        self.prompts
            .render_with_custom(&self.prompts.summary.instruction, &vars)
    }

    /// Summarize `chunk` from its sampled frames with a single remote call.
    #[instrument(skip(self, frames), fields(chunk = chunk.index, model = self.model.name()))]
    pub async fn summarize(&self, chunk: &Chunk, frames: &[Frame]) -> Result<String, InferenceError> {
        let instruction = self.instruction(chunk);

        let images = frames
            .iter()
            .map(|frame| {
                frame
                    .to_jpeg(self.jpeg_quality)
                    .map(InlineImage::jpeg)
                    .map_err(|e| InferenceError::Other(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let text = self.model.generate(&instruction, &images).await?;
        let summary = truncate_summary(&text, self.max_chars);

        debug!("Chunk {} summary: {} chars", chunk.index, summary.chars().count());
        Ok(summary)
    }
}

/// Cap `text` at `max_chars` characters, replacing the tail with [`ELLIPSIS`] when cut.
pub fn truncate_summary(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Render whole seconds without a fractional part (`30`, not `30.0`).
fn format_seconds(seconds: f64) -> String {
    if seconds.fract() == 0.0 {
        format!("{}", seconds as u64)
    } else {
        format!("{}", seconds)
    }
}
