//! Study pipeline configuration.
//!
//! Everything the pipeline needs is carried in one explicit [`StudyConfig`]
//! value, loaded from an optional TOML file with environment-variable
//! override for the API key. Collaborator instances are constructed from
//! this value and injected; there is no ambient global configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rag::{ChunkingParams, Metric};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing API key: set GEMINI_API_KEY or add api_key to the config file")]
    MissingApiKey,

    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    /// Gemini API key; the GEMINI_API_KEY environment variable wins over this
    pub api_key: Option<String>,
    /// Model used for answering, summarizing, and MCQ generation
    pub generation_model: String,
    /// Model used for chunk and query embeddings
    pub embedding_model: String,
    /// Word-window chunking parameters
    pub chunking: ChunkingParams,
    /// Similarity metric for the vector index
    pub metric: Metric,
    /// Results retrieved per query
    pub top_k: usize,
    /// Chunks summarized in the summary phase
    pub max_pages: usize,
    /// Chunks joined into the MCQ generation context
    pub mcq_context_chunks: usize,
    /// Number of multiple-choice questions to generate
    pub num_mcqs: usize,
    /// Directory for index snapshots (defaults to the platform data dir)
    pub index_dir: Option<PathBuf>,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            generation_model: "gemini-1.5-flash".to_string(),
            embedding_model: "text-embedding-004".to_string(),
            chunking: ChunkingParams::default(),
            metric: Metric::default(),
            top_k: 5,
            max_pages: 5,
            mcq_context_chunks: 10,
            num_mcqs: 5,
            index_dir: None,
        }
    }
}

impl StudyConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist; without one, the default location is
    /// used if present and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                p.to_path_buf()
            }
            None => {
                let default = Self::default_config_path();
                match default {
                    Some(p) if p.exists() => p,
                    _ => return Ok(Self::default()),
                }
            }
        };

        let content = std::fs::read_to_string(&path)?;
        let config: StudyConfig = toml::from_str(&content)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Default config file location: `<config dir>/studium/studium.toml`.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("studium").join("studium.toml"))
    }

    /// Resolve the API key, preferring the environment over the file.
    pub fn require_api_key(&self) -> Result<String> {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    /// Directory where index snapshots are saved.
    pub fn resolve_index_dir(&self) -> PathBuf {
        self.index_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("studium")
                .join("index")
        })
    }
}
