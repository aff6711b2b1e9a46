//! Data models for document retrieval.

use serde::{Deserialize, Serialize};

/// Metadata identifying where a chunk came from in the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Name of the source file (e.g., "AI NOTES.pdf")
    pub filename: String,
    /// 1-based page number within the source document
    pub page_no: u32,
    /// 0-based position of this chunk within the document
    pub chunk_index: u32,
}

/// A bounded, metadata-tagged unit of source text.
///
/// Chunks are immutable once created: the chunker emits them, the index owns
/// them for the lifetime of one document session, and nothing mutates them
/// in between.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// The text content of the chunk
    pub text: String,
    /// Source location of the chunk
    pub metadata: ChunkMetadata,
}

impl Chunk {
    pub fn new(text: String, filename: &str, page_no: u32, chunk_index: u32) -> Self {
        Self {
            text,
            metadata: ChunkMetadata {
                filename: filename.to_string(),
                page_no,
                chunk_index,
            },
        }
    }
}

/// Parameters for word-window chunking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingParams {
    /// Window size in words
    pub chunk_size: usize,
    /// Words shared between consecutive windows
    pub overlap: usize,
}

impl Default for ChunkingParams {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            overlap: 50,
        }
    }
}

impl ChunkingParams {
    /// Window stride, guarded so that `overlap >= chunk_size` can never
    /// produce a zero or negative step.
    pub fn step(&self) -> usize {
        self.chunk_size.saturating_sub(self.overlap).max(1)
    }
}

/// A single retrieval hit, produced per query and ordered by descending
/// relevance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// The matched chunk content
    pub content: String,
    /// Source location of the matched chunk
    pub metadata: ChunkMetadata,
    /// Similarity score (higher is more similar)
    pub score: f32,
}
