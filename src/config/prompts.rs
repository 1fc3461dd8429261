//! Prompt templates for vidsum.
//!
//! The chunk instruction can be customized by placing a `summary.toml` file in the custom
//! prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub summary: SummaryPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Instruction sent alongside each chunk's frames.
///
/// Available variables: `{{chunk_seconds}}`, `{{timestamp}}`, `{{duration}}`, `{{max_chars}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryPrompts {
    pub instruction: String,
}

impl Default for SummaryPrompts {
    fn default() -> Self {
        Self {
            instruction: r#"Analyze this {{chunk_seconds}}-second video segment and provide a detailed summary in English.

Time range: {{timestamp}}
Chunk duration: {{duration}} seconds

Please provide:
1. Visual description: What is happening in the video? Include objects, people, actions, scenes, text if any
2. Audio analysis: Describe any speech, music, sound effects, or ambient sounds
3. Key events: Main activities or important moments in this segment
4. Context: Overall theme or topic of this segment

Keep the summary detailed but concise (max {{max_chars}} characters).
Focus on the most important visual and audio elements."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let summary_path = custom_path.join("summary.toml");
            if summary_path.exists() {
                let content = std::fs::read_to_string(&summary_path)?;
                prompts.summary = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
