//! Video timeline chunking.
//!
//! Splits a video's duration into fixed-length, contiguous chunks. Chunk boundaries are a
//! pure function of `(total_duration, chunk_length)`, so a later run over the same media
//! reproduces them exactly.

mod temporal;

pub use temporal::segment;

use serde::{Deserialize, Serialize};

/// A contiguous time range of the source video.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// 1-based position in the video.
    pub index: u32,
    /// Start time in seconds.
    pub start_time: f64,
    /// End time in seconds.
    pub end_time: f64,
}

impl Chunk {
    pub fn new(index: u32, start_time: f64, end_time: f64) -> Self {
        Self {
            index,
            start_time,
            end_time,
        }
    }

    /// Duration of this chunk in seconds.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Display label, e.g. `01:30 - 02:00`.
    pub fn timestamp_label(&self) -> String {
        format!(
            "{} - {}",
            format_clock(self.start_time),
            format_clock(self.end_time)
        )
    }
}

/// Format seconds as MM:SS (minutes are not wrapped into hours).
pub fn format_clock(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{:02}:{:02}", minutes, secs)
}
