//! Configuration module for Tolk.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{ChatPrompts, Prompts, RagPrompts, ToolPrompts};
pub use settings::{
    AgentSettings, ChatSettings, EmbeddingSettings, GeneralSettings, ModelSettings,
    PromptSettings, RagSettings, Settings,
};
