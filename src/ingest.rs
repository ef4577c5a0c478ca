//! Document ingestion pipeline.
//!
//! Load a PDF, split it into overlapping chunks, embed them and store them in
//! the vector index. Runs once per start; any failure aborts.

use crate::chunking::{Chunker, ChunkingConfig, RecursiveSplitter};
use crate::embedding::Embedder;
use crate::error::{Result, TolkError};
use crate::vector_store::{Document, VectorStore};
use regex::Regex;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Summary of a completed ingestion.
#[derive(Debug, Clone)]
pub struct IngestionReport {
    /// Source name stored with every chunk.
    pub source: String,
    /// Characters of normalized text.
    pub characters: usize,
    /// Chunks embedded and stored.
    pub chunks: usize,
    /// Embedding dimensionality of the index.
    pub dimensions: usize,
}

/// Extract the text of a PDF file.
#[instrument]
pub fn load_pdf(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(TolkError::InvalidInput(format!("PDF not found: {}", path.display())));
    }

    let text = pdf_extract::extract_text(path)
        .map_err(|e| TolkError::Pdf(format!("{}: {}", path.display(), e)))?;

    info!("Extracted {} characters from {}", text.len(), path.display());
    Ok(text)
}

/// Clean up extracted text before splitting.
///
/// Page breaks become paragraph breaks, runs of spaces and tabs collapse to one
/// space, and more than one blank line collapses to a single blank line.
pub fn normalize_text(text: &str) -> String {
    let text = text.replace('\r', "").replace('\u{c}', "\n\n");

    let Ok(spaces) = Regex::new(r"[ \t]+") else {
        return text;
    };
    let Ok(blank_lines) = Regex::new(r"\n[ \t]*(\n[ \t]*)+") else {
        return text;
    };

    let text = spaces.replace_all(&text, " ");
    let text = blank_lines.replace_all(&text, "\n\n");

    text.lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Coordinates chunking, embedding and storage.
pub struct IngestionPipeline {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    chunker: Box<dyn Chunker>,
    config: ChunkingConfig,
}

impl IngestionPipeline {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>, config: ChunkingConfig) -> Self {
        Self {
            embedder,
            store,
            chunker: Box::new(RecursiveSplitter::new()),
            config,
        }
    }

    /// Use a different splitting strategy.
    pub fn with_chunker(mut self, chunker: Box<dyn Chunker>) -> Self {
        self.chunker = chunker;
        self
    }

    /// Ingest a PDF file. The file name becomes the chunk source.
    pub async fn ingest_pdf(&self, path: &Path) -> Result<IngestionReport> {
        let text = load_pdf(path)?;
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        self.ingest_text(&source, &text).await
    }

    /// Replace the index contents with the chunks of `text`.
    #[instrument(skip(self, text), fields(source = source))]
    pub async fn ingest_text(&self, source: &str, text: &str) -> Result<IngestionReport> {
        let text = normalize_text(text);
        let chunks = self.chunker.chunk(&text, &self.config)?;

        if chunks.is_empty() {
            return Err(TolkError::InvalidInput(format!(
                "{} contains no extractable text",
                source
            )));
        }

        info!("Split {} into {} chunks", source, chunks.len());

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(TolkError::Embedding(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let dimensions = embeddings
            .first()
            .map(Vec::len)
            .unwrap_or_else(|| self.embedder.dimensions());

        // Rebuild from scratch so a changed embedding model never mixes dimensions.
        if let Some(previous) = self.store.dimensions().await? {
            if previous != dimensions {
                info!("Index dimensions change from {} to {}", previous, dimensions);
            }
        }
        self.store.reset(dimensions).await?;

        let documents: Vec<Document> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| {
                Document::new(source.to_string(), chunk.order as i32, chunk.content, embedding)
            })
            .collect();

        let stored = self.store.upsert_batch(&documents).await?;
        debug!("Stored {} documents", stored);

        Ok(IngestionReport {
            source: source.to_string(),
            characters: text.chars().count(),
            chunks: stored,
            dimensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::MemoryVectorStore;
    use async_trait::async_trait;

    /// Embeds text as letter frequencies of a, e, i, o.
    struct VowelEmbedder;

    #[async_trait]
    impl Embedder for VowelEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let lower = text.to_lowercase();
            Ok(['a', 'e', 'i', 'o']
                .iter()
                .map(|v| lower.chars().filter(|c| c == v).count() as f32)
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
            4
        }
    }

    #[test]
    fn test_normalize_text() {
        let raw = "Title\u{c}Page  two\t\tstarts\r\n\n\n\nend   ";
        assert_eq!(normalize_text(raw), "Title\n\nPage two starts\n\nend");
    }

    #[test]
    fn test_missing_pdf() {
        let err = load_pdf(Path::new("/no/such/file.pdf")).unwrap_err();
        assert!(matches!(err, TolkError::InvalidInput(_)));
        assert!(err.to_string().contains("PDF not found"));
    }

    #[tokio::test]
    async fn test_ingest_text_replaces_index() {
        let store = Arc::new(MemoryVectorStore::new());
        let pipeline = IngestionPipeline::new(
            Arc::new(VowelEmbedder),
            store.clone(),
            ChunkingConfig::new(40, 10).unwrap(),
        );

        let text = "Apple shares rose sharply.\n\nOil prices fell in October.\n\nInterest rates stayed high.";
        let report = pipeline.ingest_text("market.pdf", text).await.unwrap();

        assert_eq!(report.source, "market.pdf");
        assert_eq!(report.chunks, 3);
        assert_eq!(report.dimensions, 4);
        assert_eq!(store.document_count().await.unwrap(), 3);

        // A second run replaces rather than appends.
        pipeline.ingest_text("market.pdf", "Only one line now.").await.unwrap();
        assert_eq!(store.document_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let pipeline = IngestionPipeline::new(
            Arc::new(VowelEmbedder),
            Arc::new(MemoryVectorStore::new()),
            ChunkingConfig::default(),
        );
        assert!(pipeline.ingest_text("blank.pdf", " \n\u{c} ").await.is_err());
    }

    #[tokio::test]
    async fn test_rebuild_after_dimension_change() {
        let store = Arc::new(MemoryVectorStore::new());
        store.reset(1536).await.unwrap();

        let pipeline = IngestionPipeline::new(
            Arc::new(VowelEmbedder),
            store.clone(),
            ChunkingConfig::default(),
        );
        pipeline.ingest_text("doc.pdf", "Some text.").await.unwrap();

        assert_eq!(store.dimensions().await.unwrap(), Some(4));
    }
}
