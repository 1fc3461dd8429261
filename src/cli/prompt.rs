//! Terminal questions for the existing-summary decision.

use crate::chunking::format_clock;
use crate::cli::Output;
use crate::orchestrator::RunDecision;
use crate::store::ExistingRun;
use console::style;
use std::io::{self, BufRead, Write};

/// Decision for an existing summary when the user is not asked.
pub fn default_decision(existing: &ExistingRun) -> RunDecision {
    if existing.is_complete() {
        RunDecision::Reuse
    } else {
        RunDecision::Resume
    }
}

/// Describe the existing summary and ask whether to reuse or resume it.
///
/// An empty answer or end of input counts as yes. Any other answer than yes means a full
/// reprocess. Unreadable input falls back to [`default_decision`].
pub fn ask_decision(existing: &ExistingRun) -> RunDecision {
    let summary = &existing.summary;

    if existing.is_complete() {
        Output::header("Existing summary found");
        Output::kv("File", &existing.path.display().to_string());
        Output::kv("Processed", &summary.processing_timestamp.format("%Y-%m-%d %H:%M:%S").to_string());
        Output::kv(
            "Duration",
            &format!("{:.1}s ({})", summary.total_duration, format_clock(summary.total_duration)),
        );
        Output::kv("Chunks", &summary.total_chunk_count.to_string());
        println!();
    } else {
        Output::header("Existing summary with failed chunks found");
        Output::kv("File", &existing.path.display().to_string());
        Output::kv("Failed chunks", &format!("{:?}", existing.failed));
        Output::kv("Processed", &summary.processing_timestamp.format("%Y-%m-%d %H:%M:%S").to_string());
        println!();
    }

    let question = if existing.is_complete() {
        "Summary already exists. Use existing?"
    } else {
        "Resume processing failed chunks?"
    };

    let stdin = io::stdin();
    match confirm(question, &mut stdin.lock()) {
        Ok(true) => default_decision(existing),
        Ok(false) => RunDecision::FullReprocess,
        Err(_) => default_decision(existing),
    }
}

/// Prompt for yes/no confirmation.
fn confirm(message: &str, input: &mut impl BufRead) -> io::Result<bool> {
    print!("{} {} ", style("?").cyan(), message);
    print!("{} ", style("[Y/n]").dim());
    io::stdout().flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        println!();
        return Ok(true);
    }
    Ok(is_yes(&answer))
}

/// Enter alone accepts the default, which is yes.
fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "" | "y" | "yes")
}

/// Ask for a 1-based choice among `count` items.
pub fn choose(message: &str, count: usize) -> io::Result<Option<usize>> {
    print!("{} {} ", style("?").cyan(), message);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(parse_choice(&answer, count))
}

fn parse_choice(answer: &str, count: usize) -> Option<usize> {
    answer
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=count).contains(n))
        .map(|n| n - 1)
}
