//! vidsum CLI entry point.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vidsum::cli::{commands, Cli, Commands};
use vidsum::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = match &cli.config {
        Some(path) => Settings::expand_path(path),
        None => Settings::default_config_path(),
    };
    let settings = Settings::load_from(Some(&config_path))?;

    // Initialize logging
    let log_level = cli.log_level(&settings.general.log_level);

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("vidsum={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match &cli.command {
        Commands::Summarize {
            video,
            force,
            yes,
            output,
        } => {
            settings.validate()?;
            let video = Settings::expand_path(&video.to_string_lossy());
            let output: Option<PathBuf> = output
                .as_ref()
                .map(|p| Settings::expand_path(&p.to_string_lossy()));
            commands::run_summarize(&video, *force, *yes, output.as_deref(), settings).await?;
        }

        Commands::View { file } => {
            commands::run_view(file.as_deref(), &settings)?;
        }

        Commands::List => {
            commands::run_list(&settings)?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, &config_path)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, &config_path)?;
        }
    }

    Ok(())
}
