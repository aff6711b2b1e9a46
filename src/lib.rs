//! Studium: document study assistant core.
//!
//! Ingests an OCR'd or text-extracted document, chunks it into overlapping
//! word windows, indexes the chunks by embedding similarity, answers
//! natural-language queries over the retrieved context, and assembles a
//! structured study artifact (summary, answered query, generated MCQs).

pub mod ai;
pub mod config;
pub mod ocr;
pub mod rag;
pub mod study;

pub use ai::{Embedder, GenerativeModel};
pub use config::StudyConfig;
pub use rag::{Retriever, VectorIndex};
pub use study::{StudyArtifact, StudyPipeline};
