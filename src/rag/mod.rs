//! RAG (Retrieval-Augmented Generation) over an ingested PDF.
//!
//! The model decides when to call the retriever tool; retrieved chunks come
//! back as tool results and the loop continues until it answers.

mod agent;
mod retriever;

pub use agent::RagAgent;
pub use retriever::{format_results, RetrieverTool, RETRIEVER_TOOL_NAME};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::NoopObserver;
    use crate::config::Prompts;
    use crate::embedding::Embedder;
    use crate::error::Result;
    use crate::llm::{ModelReply, ScriptedModel};
    use crate::message::{Role, ToolCallRequest};
    use crate::tools::Tool;
    use crate::vector_store::{Document, MemoryVectorStore, VectorStore};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;

    const TOPICS: [&str; 3] = ["apple", "oil", "rates"];

    /// One dimension per known topic word.
    struct TopicEmbedder;

    #[async_trait]
    impl Embedder for TopicEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let lower = text.to_lowercase();
            Ok(TOPICS
                .iter()
                .map(|t| if lower.contains(t) { 1.0 } else { 0.0 })
                .collect())
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::new();
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            TOPICS.len()
        }
    }

    async fn seeded_store() -> Arc<MemoryVectorStore> {
        let store = Arc::new(MemoryVectorStore::new());
        let embedder = TopicEmbedder;
        let texts = [
            "Apple stock rose 30% in 2024.",
            "Oil prices fell through the year.",
            "Rates stayed high until September.",
        ];
        let mut docs = Vec::new();
        for (i, text) in texts.iter().enumerate() {
            let embedding = embedder.embed(text).await.unwrap();
            docs.push(Document::new("market.pdf".into(), i as i32, text.to_string(), embedding));
        }
        store.reset(TOPICS.len()).await.unwrap();
        store.upsert_batch(&docs).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_no_results_sentinel() {
        let tool = RetrieverTool::new(
            Arc::new(TopicEmbedder),
            Arc::new(MemoryVectorStore::new()),
            5,
            "the market report",
        );

        let result = tool.call(&json!({"query": "apple"})).await.unwrap();
        assert_eq!(result, "I found no relevant information in the market report.");
        assert!(result.contains("no relevant information"));
    }

    #[tokio::test]
    async fn test_labeled_blocks_top_k() {
        let tool = RetrieverTool::new(Arc::new(TopicEmbedder), seeded_store().await, 2, "market.pdf");

        let result = tool.call(&json!({"query": "How did Apple do?"})).await.unwrap();
        assert!(result.starts_with("Document 1:\nApple stock rose 30% in 2024."));
        assert!(result.contains("\n\nDocument 2:\n"));
        assert!(!result.contains("Document 3:"));
    }

    #[tokio::test]
    async fn test_missing_query_is_error() {
        let tool = RetrieverTool::new(Arc::new(TopicEmbedder), seeded_store().await, 2, "market.pdf");
        assert!(tool.call(&json!({"q": "typo"})).await.is_err());
    }

    #[tokio::test]
    async fn test_rag_agent_retrieves_then_answers() {
        let model = Arc::new(ScriptedModel::new(vec![
            ModelReply::tool_calls(vec![ToolCallRequest::new(
                "call_1",
                RETRIEVER_TOOL_NAME,
                json!({"query": "oil prices"}),
            )]),
            ModelReply::text("Oil prices fell through the year (Document 1)."),
        ]));
        let retriever = RetrieverTool::new(Arc::new(TopicEmbedder), seeded_store().await, 1, "market.pdf");
        let agent = RagAgent::new(model.clone(), retriever, &Prompts::default(), "market.pdf", 10).unwrap();

        let run = agent.ask("What happened to oil?", &mut NoopObserver).await.unwrap();

        assert_eq!(run.answer, "Oil prices fell through the year (Document 1).");
        assert_eq!(run.tool_calls.len(), 1);
        assert_eq!(run.tool_calls[0].result, "Document 1:\nOil prices fell through the year.");

        let requests = model.requests();
        assert_eq!(requests[0][0].role, Role::System);
        assert!(requests[0][0].content.contains("market.pdf"));
        assert!(!requests[0][0].content.contains("{{document}}"));
    }
}
