//! Vector store abstraction for Tolk.
//!
//! Provides a trait-based interface for different vector database backends.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::error::{Result, TolkError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A chunk stored in the vector database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID.
    pub id: Uuid,
    /// Name of the source document (e.g. the PDF file name).
    pub source: String,
    /// Order of this chunk in the source.
    pub chunk_index: i32,
    /// Text content of this chunk.
    pub content: String,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// When this document was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document.
    pub fn new(source: String, chunk_index: i32, content: String, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            chunk_index,
            content,
            embedding,
            indexed_at: Utc::now(),
        }
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched document.
    pub document: Document,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Drop all documents and fix the embedding dimensionality for what follows.
    async fn reset(&self, dimensions: usize) -> Result<()>;

    /// Embedding dimensionality recorded for this store, if any.
    async fn dimensions(&self) -> Result<Option<usize>>;

    /// Bulk insert documents.
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize>;

    /// Return the `limit` most similar documents, best first.
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>>;

    /// Get total document count.
    async fn document_count(&self) -> Result<usize>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Fail when a vector does not match the store's dimensionality.
pub(crate) fn check_dimensions(expected: Option<usize>, actual: usize) -> Result<()> {
    match expected {
        Some(dims) if dims != actual => Err(TolkError::VectorStore(format!(
            "Embedding dimension mismatch: index has {}, got {}. Re-ingest to rebuild the index.",
            dims, actual
        ))),
        _ => Ok(()),
    }
}

/// Rank documents by similarity to the query and keep the best `limit`.
pub(crate) fn rank(
    query_embedding: &[f32],
    docs: impl IntoIterator<Item = Document>,
    limit: usize,
) -> Vec<SearchResult> {
    let mut results: Vec<SearchResult> = docs
        .into_iter()
        .map(|doc| {
            let score = cosine_similarity(query_embedding, &doc.embedding);
            SearchResult {
                document: doc,
                score,
            }
        })
        .collect();

    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(limit);
    results
}
