//! In-memory vector store implementation.
//!
//! Useful for testing and small datasets.

use super::{check_dimensions, rank, Document, SearchResult, VectorStore};
use crate::error::{Result, TolkError};
use async_trait::async_trait;
use std::sync::RwLock;

/// In-memory vector store.
pub struct MemoryVectorStore {
    documents: RwLock<Vec<Document>>,
    dimensions: RwLock<Option<usize>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
            dimensions: RwLock::new(None),
        }
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_err<E: std::fmt::Display>(e: E) -> TolkError {
    TolkError::VectorStore(format!("Failed to acquire lock: {}", e))
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn reset(&self, dimensions: usize) -> Result<()> {
        self.documents.write().map_err(lock_err)?.clear();
        *self.dimensions.write().map_err(lock_err)? = Some(dimensions);
        Ok(())
    }

    async fn dimensions(&self) -> Result<Option<usize>> {
        Ok(*self.dimensions.read().map_err(lock_err)?)
    }

    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        let mut dims = self.dimensions.write().map_err(lock_err)?;
        for doc in docs {
            check_dimensions(*dims, doc.embedding.len())?;
            dims.get_or_insert(doc.embedding.len());
        }

        let mut store = self.documents.write().map_err(lock_err)?;
        for doc in docs {
            store.retain(|d| d.id != doc.id);
            store.push(doc.clone());
        }
        Ok(docs.len())
    }

    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        check_dimensions(*self.dimensions.read().map_err(lock_err)?, query_embedding.len())?;

        let docs = self.documents.read().map_err(lock_err)?;
        Ok(rank(query_embedding, docs.iter().cloned(), limit))
    }

    async fn document_count(&self) -> Result<usize> {
        Ok(self.documents.read().map_err(lock_err)?.len())
    }
}
