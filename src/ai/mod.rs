//! External model collaborators: embedding and text generation.
//!
//! The pipeline core treats both models as opaque functions: text in,
//! vector or text out. Concrete instances are constructed once from
//! configuration and injected; nothing in the core reaches for ambient
//! globals.

mod gemini;

use thiserror::Error;

pub use gemini::{GeminiClient, GeminiEmbedder};

#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("embedding backend unavailable: {0}")]
    Unavailable(String),

    #[error("embedding backend returned {got} vectors for {expected} inputs")]
    CountMismatch { expected: usize, got: usize },
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("generation backend unavailable: {0}")]
    Unavailable(String),
}

/// Maps text to a fixed-length numeric vector.
///
/// The output dimension is constant for a given embedder instance.
pub trait Embedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    /// Embed many texts, preserving input order.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Maps a prompt to generated text.
///
/// Implementations may carry conversational state, but callers never depend
/// on anything beyond the current prompt's explicit context.
pub trait GenerativeModel {
    fn ask(&self, prompt: &str) -> Result<String, GenerationError>;
}
