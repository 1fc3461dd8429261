//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::store::{discover_summaries, RunStateStore};
use anyhow::Result;
use tracing::warn;

/// Run the list command.
pub fn run_list(settings: &Settings) -> Result<()> {
    let output_dir = settings.output_dir();
    let files = discover_summaries(&[output_dir.as_path()]);

    if files.is_empty() {
        Output::info(&format!(
            "No summaries in {} yet. Use 'vidsum summarize <video>' to create one.",
            output_dir.display()
        ));
        return Ok(());
    }

    Output::header(&format!("Summaries ({})", files.len()));
    println!();

    let mut total_chunks = 0;
    let mut total_failed = 0;
    for path in &files {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        match RunStateStore::load(path) {
            Ok(summary) => {
                let failed = summary.failed_chunks().len();
                total_chunks += summary.total_chunk_count;
                total_failed += failed;
                Output::summary_info(
                    &summary.video_name,
                    &file_name,
                    summary.total_chunk_count,
                    failed,
                    summary.total_duration,
                );
            }
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                Output::list_item(&format!("{} (unreadable)", file_name));
            }
        }
    }

    println!();
    Output::kv("Total summaries", &files.len().to_string());
    Output::kv("Total chunks", &total_chunks.to_string());
    Output::kv("Failed chunks", &total_failed.to_string());

    Ok(())
}
