//! Study pipeline: orchestration and the structured output artifact.

pub mod models;
pub mod pipeline;

pub use models::{ArtifactError, StudyArtifact, UserQuery};
pub use pipeline::{PipelineError, StudyOptions, StudyPipeline};
