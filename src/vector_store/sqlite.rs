//! SQLite-based vector store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity. Each
//! store handle is scoped to one named collection; the collection records the
//! embedding dimensionality it was built with.

use super::{check_dimensions, rank, Document, SearchResult, VectorStore};
use crate::error::{Result, TolkError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS collections (
        name TEXT PRIMARY KEY,
        dimensions INTEGER NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS documents (
        id TEXT PRIMARY KEY,
        collection TEXT NOT NULL,
        source TEXT NOT NULL,
        chunk_index INTEGER NOT NULL,
        content TEXT NOT NULL,
        embedding BLOB NOT NULL,
        indexed_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection);
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
    collection: String,
}

impl SqliteVectorStore {
    /// Open (or create) the store at `path`, scoped to `collection`.
    #[instrument(skip_all, fields(collection = collection))]
    pub fn open(path: &Path, collection: &str) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Opened SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
            collection: collection.to_string(),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory(collection: &str) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
            collection: collection.to_string(),
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| TolkError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    fn recorded_dimensions(conn: &Connection, collection: &str) -> Result<Option<usize>> {
        let dims: Option<i64> = conn
            .query_row(
                "SELECT dimensions FROM collections WHERE name = ?1",
                params![collection],
                |row| row.get(0),
            )
            .optional()?;
        Ok(dims.map(|d| d as usize))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self), fields(collection = %self.collection))]
    async fn reset(&self, dimensions: usize) -> Result<()> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        let deleted = tx.execute(
            "DELETE FROM documents WHERE collection = ?1",
            params![self.collection],
        )?;
        tx.execute(
            "INSERT OR REPLACE INTO collections (name, dimensions, created_at) VALUES (?1, ?2, ?3)",
            params![self.collection, dimensions as i64, Utc::now().to_rfc3339()],
        )?;

        tx.commit()?;
        info!("Reset collection {} ({} documents removed, {} dimensions)", self.collection, deleted, dimensions);
        Ok(())
    }

    async fn dimensions(&self) -> Result<Option<usize>> {
        let conn = self.lock()?;
        Self::recorded_dimensions(&conn, &self.collection)
    }

    #[instrument(skip(self, docs), fields(collection = %self.collection, count = docs.len()))]
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        let mut dims = Self::recorded_dimensions(&tx, &self.collection)?;

        for doc in docs {
            check_dimensions(dims, doc.embedding.len())?;
            if dims.is_none() {
                tx.execute(
                    "INSERT INTO collections (name, dimensions, created_at) VALUES (?1, ?2, ?3)",
                    params![self.collection, doc.embedding.len() as i64, Utc::now().to_rfc3339()],
                )?;
                dims = Some(doc.embedding.len());
            }

            tx.execute(
                r#"
                INSERT OR REPLACE INTO documents
                (id, collection, source, chunk_index, content, embedding, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    doc.id.to_string(),
                    self.collection,
                    doc.source,
                    doc.chunk_index,
                    doc.content,
                    Self::embedding_to_bytes(&doc.embedding),
                    doc.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        info!("Batch upserted {} documents", docs.len());
        Ok(docs.len())
    }

    #[instrument(skip(self, query_embedding), fields(collection = %self.collection))]
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        let conn = self.lock()?;

        check_dimensions(
            Self::recorded_dimensions(&conn, &self.collection)?,
            query_embedding.len(),
        )?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, source, chunk_index, content, embedding, indexed_at
            FROM documents
            WHERE collection = ?1
            "#,
        )?;

        let docs = stmt.query_map(params![self.collection], |row| {
            let id_str: String = row.get(0)?;
            let embedding_bytes: Vec<u8> = row.get(4)?;
            let indexed_at_str: String = row.get(5)?;

            Ok(Document {
                id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
                source: row.get(1)?,
                chunk_index: row.get(2)?,
                content: row.get(3)?,
                embedding: Self::bytes_to_embedding(&embedding_bytes),
                indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;

        let docs = docs.collect::<rusqlite::Result<Vec<Document>>>()?;
        let results = rank(query_embedding, docs, limit);

        debug!("Found {} matching documents", results.len());
        Ok(results)
    }

    async fn document_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            params![self.collection],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(index: i32, content: &str, embedding: Vec<f32>) -> Document {
        Document::new("report.pdf".to_string(), index, content.to_string(), embedding)
    }

    #[tokio::test]
    async fn test_sqlite_vector_store() {
        let store = SqliteVectorStore::in_memory("test").unwrap();
        store.reset(3).await.unwrap();

        store
            .upsert_batch(&[
                doc(0, "This is test content", vec![1.0, 0.0, 0.0]),
                doc(1, "Unrelated", vec![0.0, 0.0, 1.0]),
            ])
            .await
            .unwrap();

        assert_eq!(store.document_count().await.unwrap(), 2);

        let results = store.search(&[1.0, 0.0, 0.0], 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0).abs() < 0.001);
        assert_eq!(results[0].document.content, "This is test content");
        assert_eq!(results[0].document.embedding, vec![1.0, 0.0, 0.0]);

        store.reset(3).await.unwrap();
        assert_eq!(store.document_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_dimensions_recorded_on_first_insert() {
        let store = SqliteVectorStore::in_memory("fresh").unwrap();
        assert_eq!(store.dimensions().await.unwrap(), None);

        store.upsert_batch(&[doc(0, "a", vec![0.5, 0.5])]).await.unwrap();
        assert_eq!(store.dimensions().await.unwrap(), Some(2));

        let err = store.upsert_batch(&[doc(1, "b", vec![1.0, 0.0, 0.0])]).await.unwrap_err();
        assert!(err.to_string().contains("dimension mismatch"));
        assert!(store.search(&[1.0], 5).await.is_err());
    }

    #[tokio::test]
    async fn test_corrupt_row_is_an_error() {
        let store = SqliteVectorStore::in_memory("broken").unwrap();
        store.upsert_batch(&[doc(0, "fine", vec![1.0, 0.0])]).await.unwrap();

        store
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO documents (id, collection, source, chunk_index, content, embedding, indexed_at)
                 VALUES ('bad', 'broken', 'report.pdf', 'not a number', 'x', x'', '')",
                [],
            )
            .unwrap();

        let err = store.search(&[1.0, 0.0], 5).await.unwrap_err();
        assert!(matches!(err, TolkError::Database(_)));
    }

    #[tokio::test]
    async fn test_persisted_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index").join("index.db");

        {
            let store = SqliteVectorStore::open(&path, "report").unwrap();
            store.reset(2).await.unwrap();
            store.upsert_batch(&[doc(0, "kept", vec![1.0, 0.0])]).await.unwrap();
        }

        let store = SqliteVectorStore::open(&path, "report").unwrap();
        assert_eq!(store.dimensions().await.unwrap(), Some(2));
        assert_eq!(store.document_count().await.unwrap(), 1);

        let other = SqliteVectorStore::open(&path, "other").unwrap();
        assert_eq!(other.document_count().await.unwrap(), 0);
    }
}
