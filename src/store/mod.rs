//! Durable per-video run state.
//!
//! A [`RunSummary`] is the single JSON artifact written for a video. It records every chunk's
//! outcome, so a later run can tell which chunks still need work without any other log.

mod json;

pub use json::{artifact_file_name, classify_failed, discover_summaries, ExistingRun, RunStateStore};

use crate::chunking::Chunk;
use crate::media::VideoMeta;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Prefix of every failed chunk's stored summary text.
pub const FAILURE_MARKER: &str = "Error processing chunk";

/// Outcome of summarizing one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    Success(String),
    Failed(String),
}

impl ChunkOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ChunkOutcome::Success(_))
    }

    /// Text stored in the artifact's `summary` field.
    pub fn summary_text(&self) -> String {
        match self {
            ChunkOutcome::Success(text) => text.clone(),
            ChunkOutcome::Failed(reason) => format!("{}: {}", FAILURE_MARKER, reason),
        }
    }

    pub fn status(&self) -> ChunkStatus {
        match self {
            ChunkOutcome::Success(_) => ChunkStatus::Success,
            ChunkOutcome::Failed(_) => ChunkStatus::Failed,
        }
    }
}

/// Explicit per-chunk status stored next to the summary text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStatus {
    Success,
    Failed,
}

/// Stored result for one chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkResult {
    #[serde(rename = "chunk_number")]
    pub chunk_index: u32,
    #[serde(rename = "timestamp")]
    pub timestamp_label: String,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    #[serde(rename = "summary")]
    pub summary_text: String,
    pub summary_length: usize,
    /// Absent in artifacts written before the field existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ChunkStatus>,
}

impl ChunkResult {
    pub fn new(chunk: &Chunk, outcome: &ChunkOutcome) -> Self {
        let mut result = Self {
            chunk_index: chunk.index,
            timestamp_label: chunk.timestamp_label(),
            start_time: chunk.start_time,
            end_time: chunk.end_time,
            duration: chunk.duration(),
            summary_text: String::new(),
            summary_length: 0,
            status: None,
        };
        result.apply(outcome);
        result
    }

    /// Replace the stored outcome.
    pub fn apply(&mut self, outcome: &ChunkOutcome) {
        self.summary_text = outcome.summary_text();
        self.summary_length = self.summary_text.chars().count();
        self.status = Some(outcome.status());
    }

    /// Whether this chunk still needs work.
    ///
    /// Uses the explicit status when present, otherwise looks for [`FAILURE_MARKER`].
    pub fn is_failed(&self) -> bool {
        match self.status {
            Some(status) => status == ChunkStatus::Failed,
            None => self.summary_text.contains(FAILURE_MARKER),
        }
    }
}

/// The persisted summary of one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub video_name: String,
    pub video_path: String,
    pub total_duration: f64,
    #[serde(rename = "fps")]
    pub frame_rate: f64,
    #[serde(rename = "size")]
    pub frame_size: (u32, u32),
    #[serde(rename = "processing_date")]
    pub processing_timestamp: NaiveDateTime,
    #[serde(rename = "total_chunks")]
    pub total_chunk_count: usize,
    #[serde(rename = "chunk_duration")]
    pub chunk_length_seconds: f64,
    pub chunks: Vec<ChunkResult>,
}

impl RunSummary {
    /// Assemble a summary for a finished run. `chunks` are kept in the given order.
    pub fn new(meta: &VideoMeta, chunk_length_seconds: f64, chunks: Vec<ChunkResult>) -> Self {
        Self {
            video_name: meta.filename.clone(),
            video_path: meta.path.to_string_lossy().to_string(),
            total_duration: meta.total_duration,
            frame_rate: meta.frame_rate,
            frame_size: meta.frame_size,
            processing_timestamp: Local::now().naive_local(),
            total_chunk_count: chunks.len(),
            chunk_length_seconds,
            chunks,
        }
    }

    /// Indices of chunks that still need work.
    pub fn failed_chunks(&self) -> BTreeSet<u32> {
        self.chunks
            .iter()
            .filter(|c| c.is_failed())
            .map(|c| c.chunk_index)
            .collect()
    }

    /// True when no chunk is marked failed.
    pub fn is_complete(&self) -> bool {
        !self.chunks.iter().any(ChunkResult::is_failed)
    }

    pub fn chunk_mut(&mut self, index: u32) -> Option<&mut ChunkResult> {
        self.chunks.iter_mut().find(|c| c.chunk_index == index)
    }

    /// Refresh the processing timestamp.
    pub fn touch(&mut self) {
        self.processing_timestamp = Local::now().naive_local();
    }
}
