//! The structured study artifact.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The user's question and the model's context-grounded answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserQuery {
    pub query: String,
    pub answer: String,
}

/// Final output of a pipeline run.
///
/// The key order and nesting (`summariser`, then `user_query` with `query`
/// and `answer`, then `mcqs`) are part of the contract for consumers of the
/// persisted file, so the field declaration order here is load-bearing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyArtifact {
    pub summariser: String,
    pub user_query: UserQuery,
    pub mcqs: String,
}

impl StudyArtifact {
    pub fn new(summariser: String, query: String, answer: String, mcqs: String) -> Self {
        Self {
            summariser,
            user_query: UserQuery { query, answer },
            mcqs,
        }
    }

    pub fn to_json(&self) -> Result<String, ArtifactError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the artifact to disk.
    ///
    /// Serialization happens before the file is touched, so a failed run
    /// never leaves a partially-assembled artifact behind.
    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("saved study artifact to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_key_order_and_nesting() {
        let artifact = StudyArtifact::new(
            "summary text".to_string(),
            "Q".to_string(),
            "A".to_string(),
            "M".to_string(),
        );
        let json = serde_json::to_string(&artifact).unwrap();
        assert_eq!(
            json,
            r#"{"summariser":"summary text","user_query":{"query":"Q","answer":"A"},"mcqs":"M"}"#
        );
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        let artifact = StudyArtifact::new(
            "s".to_string(),
            "q".to_string(),
            "a".to_string(),
            "m".to_string(),
        );
        artifact.save(&path).unwrap();

        let loaded: StudyArtifact =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, artifact);
    }
}
