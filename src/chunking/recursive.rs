//! Recursive character splitting.
//!
//! Tries paragraph breaks first, then line breaks, then spaces, and finally
//! individual characters, merging the pieces back up to the size limit.

use super::{Chunker, ChunkingConfig, TextChunk};
use crate::error::Result;
use std::collections::VecDeque;

/// Separators tried in order, coarsest first.
const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Recursive character splitter.
pub struct RecursiveSplitter {
    separators: Vec<String>,
}

impl RecursiveSplitter {
    pub fn new() -> Self {
        Self::with_separators(DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect())
    }

    /// Use custom separators. An empty string means "split into characters".
    pub fn with_separators(separators: Vec<String>) -> Self {
        Self { separators }
    }

    fn split_text(&self, text: &str, separators: &[String], config: &ChunkingConfig) -> Vec<String> {
        let mut output = Vec::new();

        // First separator present in the text wins; "" always matches.
        let mut separator = separators.last().cloned().unwrap_or_default();
        let mut remaining: &[String] = &[];
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() {
                separator = String::new();
                break;
            }
            if text.contains(sep.as_str()) {
                separator = sep.clone();
                remaining = &separators[i + 1..];
                break;
            }
        }

        let pieces = split_on(text, &separator);

        let mut good: Vec<String> = Vec::new();
        for piece in pieces {
            if char_len(&piece) < config.chunk_size {
                good.push(piece);
                continue;
            }

            if !good.is_empty() {
                output.extend(merge_pieces(&good, &separator, config));
                good.clear();
            }

            if remaining.is_empty() {
                output.push(piece);
            } else {
                output.extend(self.split_text(&piece, remaining, config));
            }
        }

        if !good.is_empty() {
            output.extend(merge_pieces(&good, &separator, config));
        }

        output
    }
}

impl Default for RecursiveSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunker for RecursiveSplitter {
    fn chunk(&self, text: &str, config: &ChunkingConfig) -> Result<Vec<TextChunk>> {
        config.validate()?;

        let chunks = self
            .split_text(text, &self.separators, config)
            .into_iter()
            .enumerate()
            .map(|(order, content)| TextChunk::new(content, order))
            .collect();

        Ok(chunks)
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn split_on(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        text.chars().map(String::from).collect()
    } else {
        text.split(separator)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn join_pieces(pieces: &VecDeque<&str>, separator: &str) -> Option<String> {
    let joined = pieces.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Greedily merge small pieces into chunks of at most `chunk_size` characters,
/// keeping up to `chunk_overlap` characters of the previous chunk's tail.
fn merge_pieces(pieces: &[String], separator: &str, config: &ChunkingConfig) -> Vec<String> {
    let sep_len = char_len(separator);
    let mut chunks = Vec::new();
    let mut current: VecDeque<&str> = VecDeque::new();
    let mut total = 0usize;

    for piece in pieces {
        let len = char_len(piece);
        let joiner = if current.is_empty() { 0 } else { sep_len };

        if total + len + joiner > config.chunk_size && !current.is_empty() {
            if let Some(chunk) = join_pieces(&current, separator) {
                chunks.push(chunk);
            }

            // Drop from the front until the tail fits the overlap and the new piece fits.
            while total > config.chunk_overlap
                || (total > 0
                    && total + len + if current.is_empty() { 0 } else { sep_len } > config.chunk_size)
            {
                let Some(front) = current.pop_front() else {
                    break;
                };
                total -= char_len(front) + if current.is_empty() { 0 } else { sep_len };
            }
        }

        let joiner = if current.is_empty() { 0 } else { sep_len };
        current.push_back(piece.as_str());
        total += len + joiner;
    }

    if let Some(chunk) = join_pieces(&current, separator) {
        chunks.push(chunk);
    }

    chunks
}
