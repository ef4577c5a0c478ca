//! Similarity search over the ingested document, exposed as a tool.

use crate::embedding::Embedder;
use crate::error::Result;
use crate::tools::{required_str, Tool, ToolSpec};
use crate::vector_store::{SearchResult, VectorStore};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Tool name the model calls.
pub const RETRIEVER_TOOL_NAME: &str = "retriever_tool";

/// Retrieval tool backed by the vector index.
pub struct RetrieverTool {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    top_k: usize,
    document: String,
}

impl RetrieverTool {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        top_k: usize,
        document: &str,
    ) -> Self {
        Self {
            embedder,
            store,
            top_k,
            document: document.to_string(),
        }
    }

    /// Sentinel returned when nothing matches.
    pub fn no_results_message(&self) -> String {
        format!("I found no relevant information in {}.", self.document)
    }

    /// Search the index and format the top matches.
    #[instrument(skip(self))]
    pub async fn retrieve(&self, query: &str) -> Result<String> {
        let embedding = self.embedder.embed(query).await?;
        let results = self.store.search(&embedding, self.top_k).await?;

        debug!("Retrieved {} chunks", results.len());

        if results.is_empty() {
            return Ok(self.no_results_message());
        }

        Ok(format_results(&results))
    }
}

/// Label each match and join with blank lines.
pub fn format_results(results: &[SearchResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| format!("Document {}:\n{}", i + 1, r.document.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[async_trait]
impl Tool for RetrieverTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: RETRIEVER_TOOL_NAME.to_string(),
            description: format!(
                "This tool searches and returns the information from {}.",
                self.document
            ),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What to look up in the document"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, arguments: &serde_json::Value) -> Result<String> {
        let query = required_str(RETRIEVER_TOOL_NAME, arguments, "query")?;
        self.retrieve(query).await
    }
}
