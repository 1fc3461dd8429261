//! JSON file storage for run summaries.

use super::RunSummary;
use crate::error::{Result, VidsumError};
use crate::media::file_stem;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

const ARTIFACT_SUFFIX: &str = "_summary.json";

/// A previously saved summary found for a video.
#[derive(Debug, Clone)]
pub struct ExistingRun {
    pub summary: RunSummary,
    pub path: PathBuf,
    /// Indices of chunks whose outcome is a failure.
    pub failed: BTreeSet<u32>,
}

impl ExistingRun {
    pub fn new(summary: RunSummary, path: PathBuf) -> Self {
        let failed = classify_failed(&summary);
        Self {
            summary,
            path,
            failed,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Reads and writes `<stem>_summary.json` artifacts in one output directory.
#[derive(Debug, Clone)]
pub struct RunStateStore {
    output_dir: PathBuf,
}

impl RunStateStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Artifact path for a video file.
    pub fn artifact_path(&self, video_path: &Path) -> PathBuf {
        self.output_dir.join(artifact_file_name(video_path))
    }

    /// Load the artifact for `video_path` if one exists and parses.
    ///
    /// An unreadable or corrupt artifact is treated as absent so it never blocks a fresh run.
    #[instrument(skip(self), fields(video = %video_path.display()))]
    pub fn exists_for(&self, video_path: &Path) -> Option<ExistingRun> {
        let path = self.artifact_path(video_path);
        if !path.exists() {
            debug!("No summary at {}", path.display());
            return None;
        }

        match Self::load(&path) {
            Ok(summary) => Some(ExistingRun::new(summary, path)),
            Err(e) => {
                warn!("Ignoring unreadable summary {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Load a summary from `path`.
    pub fn load(path: &Path) -> Result<RunSummary> {
        let content = std::fs::read_to_string(path)?;
        let summary = serde_json::from_str(&content)?;
        Ok(summary)
    }

    /// Write `summary` to `path`, or to the path derived from its video name.
    ///
    /// The whole document is rewritten through a temporary file in the target directory, so
    /// readers never observe a partially written artifact.
    pub fn save(&self, summary: &RunSummary, path: Option<&Path>) -> Result<PathBuf> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => self.artifact_path(Path::new(&summary.video_name)),
        };

        let json = serde_json::to_string_pretty(summary)?;
        write_atomically(&path, json.as_bytes()).map_err(|source| VidsumError::ArtifactWrite {
            path: path.clone(),
            source,
        })?;

        info!("Summary saved to: {}", path.display());
        Ok(path)
    }
}

/// `<stem>_summary.json` for a video path.
pub fn artifact_file_name(video_path: &Path) -> String {
    format!("{}{}", file_stem(video_path), ARTIFACT_SUFFIX)
}

/// Indices of failed chunks, the single source of truth for completeness and resume.
pub fn classify_failed(summary: &RunSummary) -> BTreeSet<u32> {
    summary.failed_chunks()
}

/// All `*_summary.json` files directly inside `dirs`, sorted and de-duplicated.
pub fn discover_summaries(dirs: &[&Path]) -> Vec<PathBuf> {
    let mut found = BTreeSet::new();

    for dir in dirs {
        let Ok(entries) = std::fs::read_dir(dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let is_summary = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(ARTIFACT_SUFFIX));
            if is_summary && path.is_file() {
                found.insert(path.canonicalize().unwrap_or(path));
            }
        }
    }

    found.into_iter().collect()
}

fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
