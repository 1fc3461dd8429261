//! CLI module for vidsum.

pub mod commands;
mod output;
pub mod preflight;
mod prompt;

pub use output::Output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// vidsum - chunked video summarization
///
/// Splits a video into fixed-length chunks, sends a few frames of each chunk to a multimodal
/// model and keeps the per-chunk summaries in a resumable JSON file.
#[derive(Parser, Debug)]
#[command(name = "vidsum")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log level from `-v` flags, or `configured` when none are given.
    pub fn log_level<'a>(&self, configured: &'a str) -> &'a str {
        match self.verbose {
            0 => configured,
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize a video chunk by chunk
    Summarize {
        /// Path to the video file
        video: PathBuf,

        /// Reprocess every chunk even if a summary already exists
        #[arg(short, long)]
        force: bool,

        /// Accept the default answer (reuse or resume) without prompting
        #[arg(short, long)]
        yes: bool,

        /// Write the summary to this file instead of the output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show a readable report of a summary file
    View {
        /// Summary file (discovered automatically when omitted)
        file: Option<PathBuf>,
    },

    /// List summaries in the output directory
    List,

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
