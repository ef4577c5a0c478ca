//! Long-lived service handles, built once per process.

use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::Result;
use crate::llm::{ChatModel, OpenAIChatModel};
use crate::vector_store::{SqliteVectorStore, VectorStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Settings, prompts and the model client shared by every agent.
pub struct AgentContext {
    pub settings: Settings,
    pub prompts: Prompts,
    pub model: Arc<dyn ChatModel>,
}

impl AgentContext {
    /// Build the context from settings, optionally overriding the model name.
    ///
    /// Fails immediately if the API credential is missing.
    pub fn from_settings(settings: Settings, model_override: Option<String>) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let model_name = model_override.unwrap_or_else(|| settings.model.name.clone());
        let model = OpenAIChatModel::with_timeout(
            &model_name,
            Duration::from_secs(settings.model.timeout_secs),
        )?
        .with_temperature(settings.model.temperature);

        info!("Using chat model {}", model_name);

        Ok(Self::with_model(settings, prompts, Arc::new(model)))
    }

    /// Create a context with a custom model.
    pub fn with_model(settings: Settings, prompts: Prompts, model: Arc<dyn ChatModel>) -> Self {
        Self {
            settings,
            prompts,
            model,
        }
    }

    /// Embedder configured by `[embedding]`.
    pub fn embedder(&self) -> Result<Arc<dyn Embedder>> {
        Ok(Arc::new(OpenAIEmbedder::with_config(
            &self.settings.embedding.model,
            self.settings.embedding.dimensions as usize,
        )?))
    }

    /// Open the on-disk vector index, creating its directory if absent.
    pub fn vector_store(&self) -> Result<Arc<dyn VectorStore>> {
        std::fs::create_dir_all(self.settings.index_dir())?;
        Ok(Arc::new(SqliteVectorStore::open(
            &self.settings.index_db_path(),
            &self.settings.rag.collection,
        )?))
    }
}
