//! Exact nearest-neighbor index over chunk embeddings.
//!
//! The index owns an aligned pair of collections: one embedding vector and
//! one chunk per position. That alignment is the core invariant: position
//! `i` in the vector collection always describes position `i` in the chunk
//! collection, and neither collection is ever mutated independently after
//! `build`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::models::Chunk;

const MANIFEST_FILE: &str = "manifest.json";
const EMBEDDINGS_FILE: &str = "embeddings.bin";
const CHUNKS_FILE: &str = "chunks.json";

#[derive(Error, Debug)]
pub enum VectorIndexError {
    #[error("cannot build an index from zero vectors")]
    Empty,

    #[error("invalid query: k must be at least 1")]
    InvalidQuery,

    #[error("chunk count ({chunks}) does not match embedding count ({embeddings})")]
    CountMismatch { chunks: usize, embeddings: usize },

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("corrupt index snapshot: {0}")]
    Corrupt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VectorIndexError>;

/// Similarity metric used to rank neighbors.
///
/// Both metrics rank by cosine similarity; `InnerProduct` L2-normalizes the
/// stored vectors at build time and the query vector at search time, so the
/// two must always produce identical orderings for identical inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Cosine similarity computed directly on raw vectors
    Cosine,
    /// Inner product on L2-normalized vectors
    InnerProduct,
}

impl Default for Metric {
    fn default() -> Self {
        Self::Cosine
    }
}

/// Snapshot descriptor persisted alongside the embedding matrix and chunks.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotManifest {
    metric: Metric,
    dimensions: usize,
    chunk_count: usize,
}

/// A single search hit: insertion index of the chunk plus its score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub score: f32,
}

/// Exact nearest-neighbor search over a fixed batch of chunk embeddings.
///
/// Built once from the full set of vectors, read-only afterwards. Rebuilding
/// for a new document means constructing a new index.
#[derive(Debug)]
pub struct VectorIndex {
    metric: Metric,
    dimensions: usize,
    vectors: Vec<Vec<f32>>,
    chunks: Vec<Chunk>,
}

impl VectorIndex {
    /// Build an index from the full batch of chunks and their embeddings.
    ///
    /// Embeddings and chunks must be index-aligned: `embeddings[i]` is the
    /// vector for `chunks[i]`. An empty batch is rejected so that downstream
    /// queries can distinguish "no data" from "no matches".
    pub fn build(chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>, metric: Metric) -> Result<Self> {
        if embeddings.is_empty() {
            return Err(VectorIndexError::Empty);
        }
        if chunks.len() != embeddings.len() {
            return Err(VectorIndexError::CountMismatch {
                chunks: chunks.len(),
                embeddings: embeddings.len(),
            });
        }

        let dimensions = embeddings[0].len();
        for vector in &embeddings {
            if vector.len() != dimensions {
                return Err(VectorIndexError::DimensionMismatch {
                    expected: dimensions,
                    actual: vector.len(),
                });
            }
        }

        let vectors = match metric {
            Metric::Cosine => embeddings,
            Metric::InnerProduct => embeddings.into_iter().map(l2_normalize).collect(),
        };

        log::info!(
            "built vector index: {} chunks, {} dimensions, metric {:?}",
            chunks.len(),
            dimensions,
            metric
        );

        Ok(Self {
            metric,
            dimensions,
            vectors,
            chunks,
        })
    }

    /// Return the `min(k, len)` nearest neighbors of a query vector.
    ///
    /// Results are ordered by descending similarity; equal scores are broken
    /// by ascending insertion index so the ordering is fully deterministic.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if k == 0 {
            return Err(VectorIndexError::InvalidQuery);
        }
        if query.len() != self.dimensions {
            return Err(VectorIndexError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }

        let mut scored: Vec<Neighbor> = match self.metric {
            Metric::Cosine => self
                .vectors
                .iter()
                .enumerate()
                .map(|(index, vector)| Neighbor {
                    index,
                    score: cosine_similarity(query, vector),
                })
                .collect(),
            Metric::InnerProduct => {
                let query = l2_normalize(query.to_vec());
                self.vectors
                    .iter()
                    .enumerate()
                    .map(|(index, vector)| Neighbor {
                        index,
                        score: dot(&query, vector),
                    })
                    .collect()
            }
        };

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.index.cmp(&b.index))
        });
        scored.truncate(k.min(self.vectors.len()));
        Ok(scored)
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Always false for a successfully built index.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// The indexed chunks, in insertion order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Look up the chunk aligned with a search hit.
    pub fn chunk(&self, index: usize) -> Option<&Chunk> {
        self.chunks.get(index)
    }

    /// Persist the index as three co-located artifacts: a JSON manifest, the
    /// raw embedding matrix (little-endian f32), and the chunk records.
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;

        let manifest = SnapshotManifest {
            metric: self.metric,
            dimensions: self.dimensions,
            chunk_count: self.chunks.len(),
        };
        fs::write(
            dir.join(MANIFEST_FILE),
            serde_json::to_string_pretty(&manifest)?,
        )?;

        let mut matrix = Vec::with_capacity(self.vectors.len() * self.dimensions * 4);
        for vector in &self.vectors {
            for value in vector {
                matrix.extend_from_slice(&value.to_le_bytes());
            }
        }
        fs::write(dir.join(EMBEDDINGS_FILE), matrix)?;

        fs::write(
            dir.join(CHUNKS_FILE),
            serde_json::to_string_pretty(&self.chunks)?,
        )?;

        log::info!("saved index snapshot to {}", dir.display());
        Ok(())
    }

    /// Load a snapshot previously written by [`VectorIndex::save`].
    ///
    /// All three artifacts must be present and mutually consistent (same
    /// chunk count, same dimensions); anything else is a corrupt snapshot
    /// and is surfaced to the caller rather than silently rebuilt.
    pub fn load(dir: &Path) -> Result<Self> {
        for file in [MANIFEST_FILE, EMBEDDINGS_FILE, CHUNKS_FILE] {
            if !dir.join(file).exists() {
                return Err(VectorIndexError::Corrupt(format!(
                    "missing snapshot artifact: {}",
                    file
                )));
            }
        }

        let manifest: SnapshotManifest = serde_json::from_str(
            &fs::read_to_string(dir.join(MANIFEST_FILE))?,
        )
        .map_err(|e| VectorIndexError::Corrupt(format!("unreadable manifest: {}", e)))?;

        let chunks: Vec<Chunk> = serde_json::from_str(&fs::read_to_string(dir.join(CHUNKS_FILE))?)
            .map_err(|e| VectorIndexError::Corrupt(format!("unreadable chunk store: {}", e)))?;

        if chunks.len() != manifest.chunk_count {
            return Err(VectorIndexError::Corrupt(format!(
                "manifest declares {} chunks but chunk store has {}",
                manifest.chunk_count,
                chunks.len()
            )));
        }
        if chunks.is_empty() {
            return Err(VectorIndexError::Corrupt(
                "snapshot contains zero chunks".to_string(),
            ));
        }

        let matrix = fs::read(dir.join(EMBEDDINGS_FILE))?;
        let expected_bytes = manifest.chunk_count * manifest.dimensions * 4;
        if matrix.len() != expected_bytes {
            return Err(VectorIndexError::Corrupt(format!(
                "embedding matrix is {} bytes, expected {}",
                matrix.len(),
                expected_bytes
            )));
        }

        let vectors: Vec<Vec<f32>> = matrix
            .chunks_exact(manifest.dimensions * 4)
            .map(|row| {
                row.chunks_exact(4)
                    .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                    .collect()
            })
            .collect();

        log::info!(
            "loaded index snapshot from {}: {} chunks",
            dir.display(),
            chunks.len()
        );

        // Stored vectors were already normalized at build time when the
        // metric requires it, so no re-normalization here.
        Ok(Self {
            metric: manifest.metric,
            dimensions: manifest.dimensions,
            vectors,
            chunks,
        })
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Scale a vector to unit length. Zero vectors are returned unchanged.
fn l2_normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm = dot(&vector, &vector).sqrt();
    if norm > 0.0 {
        for value in &mut vector {
            *value /= norm;
        }
    }
    vector
}

/// Calculate cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot_product = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;

    for (x, y) in a.iter().zip(b.iter()) {
        dot_product += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denominator = (norm_a * norm_b).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }

    dot_product / denominator
}
