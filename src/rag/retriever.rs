//! Query-to-results bridge over the vector index.
//!
//! The retriever is a pure read path: it embeds a query string, asks the
//! index for neighbors, and materializes content + metadata + score records.
//! It never mutates the index.

use thiserror::Error;

use crate::ai::{EmbedError, Embedder};

use super::index::{VectorIndex, VectorIndexError};
use super::models::{Chunk, RetrievalResult};

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("failed to embed query: {0}")]
    Embed(#[from] EmbedError),

    #[error("index error: {0}")]
    Index(#[from] VectorIndexError),
}

pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Secondary retrieval strategy consulted when similarity search finds
/// nothing. Implementations rank by whatever signal they like (lexical
/// overlap, BM25, ...); the contract is only that results come back in
/// descending relevance order.
pub trait FallbackSearch {
    fn search(&self, query: &str, chunks: &[Chunk], k: usize) -> Vec<RetrievalResult>;
}

/// Default fallback: no secondary strategy, empty result set.
///
/// Callers must treat "no relevant documents found" as a valid outcome, so
/// the no-op implementation returns an empty vec rather than erroring.
pub struct NoFallback;

impl FallbackSearch for NoFallback {
    fn search(&self, _query: &str, _chunks: &[Chunk], _k: usize) -> Vec<RetrievalResult> {
        Vec::new()
    }
}

/// Ranked retrieval over a built index.
pub struct Retriever<'a> {
    index: &'a VectorIndex,
    embedder: &'a dyn Embedder,
    fallback: Box<dyn FallbackSearch + 'a>,
}

impl<'a> Retriever<'a> {
    pub fn new(index: &'a VectorIndex, embedder: &'a dyn Embedder) -> Self {
        Self {
            index,
            embedder,
            fallback: Box::new(NoFallback),
        }
    }

    /// Replace the secondary search strategy.
    pub fn with_fallback(mut self, fallback: Box<dyn FallbackSearch + 'a>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Retrieve the top `k` chunks for a query string, best match first.
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievalResult>> {
        let query_vector = self.embedder.embed(query)?;
        let neighbors = self.index.search(&query_vector, k)?;

        let results: Vec<RetrievalResult> = neighbors
            .into_iter()
            .filter_map(|hit| {
                self.index.chunk(hit.index).map(|chunk| RetrievalResult {
                    content: chunk.text.clone(),
                    metadata: chunk.metadata.clone(),
                    score: hit.score,
                })
            })
            .collect();

        if results.is_empty() {
            log::debug!("similarity search returned nothing, trying fallback");
            return Ok(self.fallback.search(query, self.index.chunks(), k));
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::test_support::BagOfWordsEmbedder;
    use crate::rag::index::Metric;

    fn build_index(texts: &[&str], embedder: &BagOfWordsEmbedder) -> VectorIndex {
        let chunks: Vec<Chunk> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| Chunk::new(t.to_string(), "doc.pdf", i as u32 + 1, i as u32))
            .collect();
        let vectors = chunks
            .iter()
            .map(|c| embedder.embed(&c.text).unwrap())
            .collect();
        VectorIndex::build(chunks, vectors, Metric::Cosine).unwrap()
    }

    #[test]
    fn test_retrieve_materializes_content_and_metadata() {
        let embedder = BagOfWordsEmbedder::default();
        let index = build_index(
            &[
                "CRUD stands for Create Read Update Delete.",
                "Indexes speed up queries.",
            ],
            &embedder,
        );
        let retriever = Retriever::new(&index, &embedder);

        let results = retriever.retrieve("What is CRUD?", 1).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metadata.page_no, 1);
        assert!(results[0].content.contains("CRUD"));
    }

    #[test]
    fn test_results_come_back_in_rank_order() {
        let embedder = BagOfWordsEmbedder::default();
        let index = build_index(
            &[
                "databases store rows in tables",
                "gardening requires patience and soil",
                "relational databases use tables and indexes",
            ],
            &embedder,
        );
        let retriever = Retriever::new(&index, &embedder);

        let results = retriever.retrieve("database tables", 3).unwrap();
        assert_eq!(results.len(), 3);
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert_ne!(results[0].metadata.page_no, 2);
    }

    #[test]
    fn test_default_fallback_returns_empty_not_error() {
        let embedder = BagOfWordsEmbedder::default();
        let index = build_index(&["some text"], &embedder);
        let none = NoFallback.search("anything", index.chunks(), 5);
        assert!(none.is_empty());
    }

    #[test]
    fn test_custom_fallback_ranks_its_own_results() {
        struct FirstChunkFallback;
        impl FallbackSearch for FirstChunkFallback {
            fn search(&self, _query: &str, chunks: &[Chunk], _k: usize) -> Vec<RetrievalResult> {
                vec![RetrievalResult {
                    content: chunks[0].text.clone(),
                    metadata: chunks[0].metadata.clone(),
                    score: 0.0,
                }]
            }
        }

        let embedder = BagOfWordsEmbedder::default();
        let index = build_index(&["some text", "other text"], &embedder);
        let echoed = FirstChunkFallback.search("anything", index.chunks(), 5);
        assert_eq!(echoed.len(), 1);
        assert_eq!(echoed[0].metadata.page_no, 1);
    }
}
