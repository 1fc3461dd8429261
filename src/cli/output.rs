//! CLI output formatting utilities.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print one line of the summary inventory.
    pub fn summary_info(name: &str, file: &str, chunks: usize, failed: usize, duration: f64) {
        let state = if failed == 0 {
            style("complete".to_string()).green()
        } else {
            style(format!("{} failed", failed)).yellow()
        };
        println!(
            "  {} {} ({}, {} chunks, {}, {})",
            style("*").cyan(),
            style(name).bold(),
            style(file).dim(),
            chunks,
            format_duration(duration),
            state
        );
    }

    /// Print a chunk heading and its summary text.
    pub fn chunk_summary(index: u32, label: &str, chars: usize, text: &str, failed: bool) {
        let marker = if failed {
            style(">>").red()
        } else {
            style(">>").green()
        };
        println!(
            "\n{} {} ({})",
            marker,
            style(format!("Chunk {}", index)).bold(),
            style(label).cyan()
        );
        println!("   {}", style(format!("Summary ({} chars):", chars)).dim());
        println!("   {}", text);
    }

    /// Create a progress bar.
    pub fn progress_bar(len: u64, msg: &str) -> ProgressBar {
        let pb = ProgressBar::new(len);
        if let Ok(bar_style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(bar_style.progress_chars("#>-"));
        }
        pb.set_message(msg.to_string());
        pb
    }
}

/// Format duration in seconds as `1h 2m 3s`, `2m 5s` or `42s`.
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds.max(0.0).round() as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Frame rate with two decimals, e.g. `29.97`.
pub fn format_frame_rate(fps: f64) -> String {
    format!("{:.2}", fps)
}

/// Collapse blank lines and cut to `max_chars` characters with an ellipsis.
pub fn content_preview(content: &str, max_chars: usize) -> String {
    let collapsed = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let cut: String = collapsed.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    }
}
