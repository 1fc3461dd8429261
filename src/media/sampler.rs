//! Representative frame selection for a chunk.

use super::{Frame, MediaDecoder};
use crate::chunking::Chunk;
use crate::error::{Result, VidsumError};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Chunks at or below this length get a single frame.
const SHORT_CHUNK_SECONDS: f64 = 0.1;

/// Back-off from the chunk end for the last frame.
const END_MARGIN_SECONDS: f64 = 0.1;

/// Relative offsets to sample within a chunk of `duration` seconds: start, middle, near-end.
pub fn sample_offsets(duration: f64) -> Vec<f64> {
    if duration > SHORT_CHUNK_SECONDS {
        vec![0.0, duration / 2.0, duration - END_MARGIN_SECONDS]
    } else {
        vec![0.0]
    }
}

/// Extracts the frames that represent a chunk.
pub struct FrameSampler {
    decoder: Arc<dyn MediaDecoder>,
}

impl FrameSampler {
    pub fn new(decoder: Arc<dyn MediaDecoder>) -> Self {
        Self { decoder }
    }

    /// Decode frames for `chunk`, in start/mid/near-end order.
    pub async fn sample(&self, video: &Path, chunk: &Chunk) -> Result<Vec<Frame>> {
        let duration = chunk.duration();
        let offsets = sample_offsets(duration);
        let mut frames = Vec::with_capacity(offsets.len());

        for offset in offsets {
            if offset >= duration {
                return Err(VidsumError::Decode(format!(
                    "offset {:.3}s is outside chunk {} ({:.3}s long)",
                    offset, chunk.index, duration
                )));
            }

            let image = self.decoder.frame_at(video, chunk.start_time + offset).await?;
            frames.push(Frame::new(offset, image));
        }

        debug!("Sampled {} frames from chunk {}", frames.len(), chunk.index);
        Ok(frames)
    }
}
