//! Pre-flight checks before starting an agent.
//!
//! Validates that the credential and input files are available before any
//! client is built or any document is ingested.

use crate::error::{Result, TolkError};
use std::path::Path;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    /// Chat requires the API key.
    Chat,
    /// Tool calling requires the API key.
    Tools,
    /// RAG requires the API key and the PDF.
    Rag { pdf: &'a Path },
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation<'_>) -> Result<()> {
    crate::openai::api_key()?;

    if let Operation::Rag { pdf } = operation {
        check_file(pdf)?;
    }

    Ok(())
}

/// Check that an input file exists and is a regular file.
fn check_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(TolkError::InvalidInput(format!(
            "PDF not found: {}. Set rag.pdf_path or pass --pdf.",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(TolkError::InvalidInput(format!("{} is not a file", path.display())));
    }
    Ok(())
}
