//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting a run that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{Result, VidsumError};
use std::process::Command;

/// Summarizing requires an API key, ffmpeg and ffprobe.
pub fn check_summarize(settings: &Settings) -> Result<()> {
    settings.model.api_key()?;
    check_tool("ffmpeg")?;
    check_tool("ffprobe")?;
    Ok(())
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("-version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(VidsumError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(VidsumError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(VidsumError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
