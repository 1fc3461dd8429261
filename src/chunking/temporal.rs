//! Fixed-length temporal segmentation.

use super::Chunk;
use crate::error::{Result, VidsumError};

/// Split `[0, total_duration]` into chunks of `chunk_length` seconds.
///
/// Produces `ceil(total_duration / chunk_length)` chunks; only the last one may be shorter.
/// A zero-length video yields no chunks.
pub fn segment(total_duration: f64, chunk_length: f64) -> Result<Vec<Chunk>> {
    if !(chunk_length.is_finite() && chunk_length > 0.0) {
        return Err(VidsumError::InvalidInput(format!(
            "chunk length must be positive, got {}",
            chunk_length
        )));
    }
    if !(total_duration.is_finite() && total_duration >= 0.0) {
        return Err(VidsumError::InvalidInput(format!(
            "video duration must be non-negative, got {}",
            total_duration
        )));
    }

    let count = (total_duration / chunk_length).ceil() as u32;

    let chunks = (0..count)
        .map(|i| {
            // Multiply rather than accumulate so boundaries never drift.
            let start = i as f64 * chunk_length;
            let end = ((i + 1) as f64 * chunk_length).min(total_duration);
            Chunk::new(i + 1, start, end)
        })
        .collect();

    Ok(chunks)
}
