//! View command implementation.

use crate::cli::output::{content_preview, format_duration, format_frame_rate};
use crate::cli::prompt::choose;
use crate::cli::Output;
use crate::config::Settings;
use crate::store::{discover_summaries, RunStateStore, RunSummary};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Characters of each chunk summary shown in the report.
const PREVIEW_CHARS: usize = 300;

/// Run the view command.
pub fn run_view(file: Option<&Path>, settings: &Settings) -> Result<()> {
    let Some(path) = resolve_file(file, settings)? else {
        return Ok(());
    };

    let summary = RunStateStore::load(&path)
        .with_context(|| format!("Failed to read summary {}", path.display()))?;
    print_report(&summary);
    Ok(())
}

/// Pick the summary to show: the given file, the only one found, or the user's choice.
fn resolve_file(file: Option<&Path>, settings: &Settings) -> Result<Option<PathBuf>> {
    if let Some(file) = file {
        return Ok(Some(file.to_path_buf()));
    }

    let output_dir = settings.output_dir();
    let found = discover_summaries(&[output_dir.as_path(), Path::new(".")]);

    match found.len() {
        0 => {
            Output::warning("No summary files found. Run 'vidsum summarize <video>' first.");
            Ok(None)
        }
        1 => Ok(found.into_iter().next()),
        count => {
            Output::header("Multiple summary files found");
            for (i, path) in found.iter().enumerate() {
                println!("  {}. {}", i + 1, path.display());
            }
            println!();

            match choose("Select file number:", count)? {
                Some(i) => Ok(found.into_iter().nth(i)),
                None => {
                    Output::error("Invalid selection");
                    Ok(None)
                }
            }
        }
    }
}

fn print_report(summary: &RunSummary) {
    Output::header("Video Summary Report");
    Output::kv("Video", &summary.video_name);
    Output::kv(
        "Duration",
        &format!(
            "{:.1} seconds ({})",
            summary.total_duration,
            format_duration(summary.total_duration)
        ),
    );
    Output::kv(
        "Resolution",
        &format!("{}x{}", summary.frame_size.0, summary.frame_size.1),
    );
    Output::kv("FPS", &format_frame_rate(summary.frame_rate));
    Output::kv("Total chunks", &summary.total_chunk_count.to_string());
    Output::kv(
        "Processed",
        &summary.processing_timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
    );

    Output::header("Chunk-by-chunk summaries");
    for chunk in &summary.chunks {
        Output::chunk_summary(
            chunk.chunk_index,
            &chunk.timestamp_label,
            chunk.summary_length,
            &content_preview(&chunk.summary_text, PREVIEW_CHARS),
            chunk.is_failed(),
        );
    }

    let failed = summary.failed_chunks();
    println!();
    if failed.is_empty() {
        Output::success("All chunks summarized.");
    } else {
        Output::warning(&format!(
            "Failed chunks: {:?}. Run 'vidsum summarize' on the video again to resume.",
            failed
        ));
    }
}
