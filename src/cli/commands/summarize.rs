//! Summarize command implementation.

use crate::cli::preflight;
use crate::cli::prompt::{ask_decision, default_decision};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::{Orchestrator, ProgressEvent, RunMode, RunOutcome};
use anyhow::Result;
use indicatif::ProgressBar;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Run the summarize command.
pub async fn run_summarize(
    video: &Path,
    force: bool,
    yes: bool,
    output: Option<&Path>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check_summarize(&settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'vidsum doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    Output::info(&format!("Summarizing: {}", video.display()));

    let bar: Arc<Mutex<Option<ProgressBar>>> = Arc::new(Mutex::new(None));
    let sink = bar.clone();
    let orchestrator = Orchestrator::new(settings)?.with_progress(Arc::new(move |event| {
        if let Ok(mut slot) = sink.lock() {
            show_progress(&mut slot, event);
        }
    }));

    let result = orchestrator
        .process_video(video, force, output, |existing| {
            if yes {
                default_decision(existing)
            } else {
                ask_decision(existing)
            }
        })
        .await;

    if let Ok(mut slot) = bar.lock() {
        if let Some(pb) = slot.take() {
            pb.finish_and_clear();
        }
    }

    match result {
        Ok(outcome) => {
            report(&outcome);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to summarize: {}", e));
            Err(e.into())
        }
    }
}

fn show_progress(slot: &mut Option<ProgressBar>, event: ProgressEvent) {
    match event {
        ProgressEvent::Planned { mode, chunks } => {
            let msg = match mode {
                RunMode::Fresh => "summarizing",
                RunMode::Resumed => "re-processing failed chunks",
                RunMode::Reused => return,
            };
            *slot = Some(Output::progress_bar(chunks as u64, msg));
        }
        ProgressEvent::ChunkStarted { index, label } => {
            if let Some(pb) = slot.as_ref() {
                pb.set_message(format!("Chunk {}: {}", index, label));
            }
        }
        ProgressEvent::ChunkFinished { index, success } => {
            if let Some(pb) = slot.as_ref() {
                if !success {
                    pb.println(format!("  chunk {} failed, it can be resumed later", index));
                }
                pb.inc(1);
            }
        }
    }
}

fn report(outcome: &RunOutcome) {
    let failed = outcome.failed_count();
    let total = outcome.summary.total_chunk_count;

    match outcome.mode {
        RunMode::Reused => {
            Output::success("Using existing summary (no API calls needed)");
        }
        RunMode::Fresh | RunMode::Resumed if failed == 0 => {
            Output::success(&format!(
                "Summarized {} chunks of '{}'",
                total, outcome.summary.video_name
            ));
        }
        RunMode::Fresh | RunMode::Resumed => {
            Output::warning(&format!(
                "{} of {} chunks failed. Run the same command again to resume them.",
                failed, total
            ));
        }
    }

    Output::kv("Summary", &outcome.path.display().to_string());
    if outcome.mode != RunMode::Reused {
        Output::kv("Chunks sent", &outcome.attempted.to_string());
    }
}
