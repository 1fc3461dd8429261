//! Configuration module for vidsum.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, SummaryPrompts};
pub use settings::{
    GeneralSettings, ModelProvider, ModelSettings, ProcessingSettings, PromptSettings,
    RateLimitSettings, Settings,
};
