//! Media access for vidsum.
//!
//! Provides a trait-based interface over the video decoder so the pipeline can run against
//! ffmpeg in production and against in-memory fakes in tests.

mod ffmpeg;
mod sampler;

pub use ffmpeg::FfmpegDecoder;
pub use sampler::{sample_offsets, FrameSampler};

use crate::error::{Result, VidsumError};
use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Properties of a source video, captured once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMeta {
    /// Path as given by the user.
    pub path: PathBuf,
    /// Total duration in seconds.
    pub total_duration: f64,
    /// Frames per second.
    pub frame_rate: f64,
    /// (width, height) in pixels.
    pub frame_size: (u32, u32),
    /// File name including extension.
    pub filename: String,
}

/// File name of `path` without its extension, used to name the summary artifact.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("video")
        .to_string()
}

/// A decoded RGB frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Offset in seconds relative to the chunk start.
    pub offset: f64,
    pub image: RgbImage,
}

impl Frame {
    pub fn new(offset: f64, image: RgbImage) -> Self {
        Self { offset, image }
    }

    /// Encode this frame as JPEG at the given quality (1-100).
    pub fn to_jpeg(&self, quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
            encoder
                .encode_image(&self.image)
                .map_err(|e| VidsumError::Decode(format!("JPEG encoding failed: {}", e)))?;
        }
        Ok(buffer)
    }
}

/// Trait for video decoders.
#[async_trait]
pub trait MediaDecoder: Send + Sync {
    /// Read duration, frame rate and frame size of a video.
    async fn probe(&self, path: &Path) -> Result<VideoMeta>;

    /// Decode a single frame at an absolute position in seconds.
    async fn frame_at(&self, path: &Path, seconds: f64) -> Result<RgbImage>;
}
