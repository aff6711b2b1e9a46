//! RAG (Retrieval-Augmented Generation) module: chunking, vector indexing,
//! and ranked retrieval over a single document session.

pub mod chunker;
pub mod index;
pub mod models;
pub mod retriever;

pub use chunker::{chunk_pages, chunk_text};
pub use index::{Metric, Neighbor, VectorIndex, VectorIndexError};
pub use models::{Chunk, ChunkMetadata, ChunkingParams, RetrievalResult};
pub use retriever::{FallbackSearch, NoFallback, RetrievalError, Retriever};
