//! Gemini HTTP adapters for the embedding and generation collaborators.
//!
//! Blocking clients over the Generative Language API. Transport failures,
//! non-success statuses, and malformed payloads all surface as the
//! collaborator-unavailable error for the calling phase; retry policy, if
//! any, belongs here and not in the pipeline core (none is implemented).

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{EmbedError, Embedder, GenerationError, GenerativeModel};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Text generation via the Gemini generateContent endpoint.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GenerationError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            model,
        })
    }
}

impl GenerativeModel for GeminiClient {
    fn ask(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            API_BASE, self.model, self.api_key
        );
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .map_err(|e| GenerationError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GenerationError::Unavailable(format!(
                "generateContent returned {}: {}",
                status, body
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| GenerationError::Unavailable(e.to_string()))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| GenerationError::Unavailable("response contained no candidates".into()))
    }
}

/// Embeddings via the Gemini embedContent endpoints.
pub struct GeminiEmbedder {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiEmbedder {
    pub fn new(api_key: String, model: String) -> Result<Self, EmbedError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EmbedError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    fn embed_request(&self, text: &str) -> EmbedContentRequest {
        EmbedContentRequest {
            model: format!("models/{}", self.model),
            content: Content {
                parts: vec![Part {
                    text: text.to_string(),
                }],
            },
        }
    }
}

impl Embedder for GeminiEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let url = format!(
            "{}/models/{}:embedContent?key={}",
            API_BASE, self.model, self.api_key
        );
        let response = self
            .client
            .post(&url)
            .json(&self.embed_request(text))
            .send()
            .map_err(|e| EmbedError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(EmbedError::Unavailable(format!(
                "embedContent returned {}: {}",
                status, body
            )));
        }

        let parsed: EmbedContentResponse = response
            .json()
            .map_err(|e| EmbedError::Unavailable(e.to_string()))?;
        Ok(parsed.embedding.values)
    }

    /// One batchEmbedContents call; the API preserves request order.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/models/{}:batchEmbedContents?key={}",
            API_BASE, self.model, self.api_key
        );
        let request = BatchEmbedRequest {
            requests: texts.iter().map(|t| self.embed_request(t)).collect(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .map_err(|e| EmbedError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(EmbedError::Unavailable(format!(
                "batchEmbedContents returned {}: {}",
                status, body
            )));
        }

        let parsed: BatchEmbedResponse = response
            .json()
            .map_err(|e| EmbedError::Unavailable(e.to_string()))?;

        if parsed.embeddings.len() != texts.len() {
            return Err(EmbedError::CountMismatch {
                expected: texts.len(),
                got: parsed.embeddings.len(),
            });
        }

        Ok(parsed.embeddings.into_iter().map(|e| e.values).collect())
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Serialize)]
struct EmbedContentRequest {
    model: String,
    content: Content,
}

#[derive(Deserialize)]
struct EmbedContentResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Serialize)]
struct BatchEmbedRequest {
    requests: Vec<EmbedContentRequest>,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<EmbeddingValues>,
}
