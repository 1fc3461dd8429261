//! ffmpeg/ffprobe-backed decoder.
//!
//! Each call spawns and awaits its own process, so no decoder state outlives a call.

use super::{MediaDecoder, VideoMeta};
use crate::error::{Result, VidsumError};
use async_trait::async_trait;
use image::RgbImage;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Decoder that shells out to `ffprobe` and `ffmpeg`.
#[derive(Debug, Clone, Default)]
pub struct FfmpegDecoder;

impl FfmpegDecoder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MediaDecoder for FfmpegDecoder {
    #[instrument(skip(self), fields(path = %path.display()))]
    async fn probe(&self, path: &Path) -> Result<VideoMeta> {
        let result = Command::new("ffprobe")
            .arg("-v").arg("quiet")
            .arg("-print_format").arg("json")
            .arg("-show_format")
            .arg("-show_streams")
            .arg("-select_streams").arg("v:0")
            .arg(path)
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(VidsumError::ToolNotFound("ffprobe".into()));
            }
            Err(e) => return Err(VidsumError::Decode(format!("ffprobe failed: {e}"))),
        };

        if !output.status.success() {
            return Err(VidsumError::Decode(format!(
                "ffprobe could not open {}",
                path.display()
            )));
        }

        let json: serde_json::Value = serde_json::from_slice(&output.stdout)
            .map_err(|_| VidsumError::Decode("Invalid ffprobe output".into()))?;

        let meta = parse_probe(path, &json)?;
        debug!(
            "Probed {:.2}s at {:.2} fps ({}x{})",
            meta.total_duration, meta.frame_rate, meta.frame_size.0, meta.frame_size.1
        );
        Ok(meta)
    }

    async fn frame_at(&self, path: &Path, seconds: f64) -> Result<RgbImage> {
        let result = Command::new("ffmpeg")
            .arg("-ss").arg(format!("{:.3}", seconds))
            .arg("-i").arg(path)
            .arg("-frames:v").arg("1")
            .arg("-f").arg("image2pipe")
            .arg("-vcodec").arg("png")
            .arg("-loglevel").arg("error")
            .arg("-")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(VidsumError::ToolNotFound("ffmpeg".into()));
            }
            Err(e) => return Err(VidsumError::Decode(format!("ffmpeg error: {e}"))),
        };

        if !output.status.success() || output.stdout.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VidsumError::Decode(format!(
                "no frame at {:.3}s: {}",
                seconds,
                stderr.trim()
            )));
        }

        let image = image::load_from_memory(&output.stdout)
            .map_err(|e| VidsumError::Decode(format!("frame at {:.3}s: {}", seconds, e)))?;
        Ok(image.to_rgb8())
    }
}

/// Build [`VideoMeta`] from `ffprobe -print_format json` output.
fn parse_probe(path: &Path, json: &serde_json::Value) -> Result<VideoMeta> {
    let stream = json["streams"]
        .as_array()
        .and_then(|streams| streams.first())
        .ok_or_else(|| VidsumError::Decode(format!("no video stream in {}", path.display())))?;

    let total_duration = json["format"]["duration"]
        .as_str()
        .or_else(|| stream["duration"].as_str())
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| VidsumError::Decode("Could not determine video duration".into()))?;

    let frame_rate = stream["avg_frame_rate"]
        .as_str()
        .and_then(parse_rate)
        .or_else(|| stream["r_frame_rate"].as_str().and_then(parse_rate))
        .unwrap_or(0.0);

    let width = stream["width"].as_u64().unwrap_or(0) as u32;
    let height = stream["height"].as_u64().unwrap_or(0) as u32;

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    Ok(VideoMeta {
        path: path.to_path_buf(),
        total_duration,
        frame_rate,
        frame_size: (width, height),
        filename,
    })
}

/// Parse an ffprobe rational such as `30000/1001`.
fn parse_rate(rate: &str) -> Option<f64> {
    let (num, den) = match rate.split_once('/') {
        Some((n, d)) => (n.parse::<f64>().ok()?, d.parse::<f64>().ok()?),
        None => (rate.parse::<f64>().ok()?, 1.0),
    };
    if den == 0.0 || num == 0.0 {
        return None;
    }
    Some(num / den)
}
