use crate::error::{EmbedderError, Result};
use crate::EmbeddingProvider;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_DIMENSION: usize = 1536;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct OpenAiEmbedderConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub dimension: usize,
    pub timeout: Duration,
}

impl OpenAiEmbedderConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            dimension: DEFAULT_DIMENSION,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build a configuration from the process environment.
    ///
    /// `SEMDEX_API_KEY` (falling back to `OPENAI_API_KEY`) is required;
    /// `SEMDEX_API_BASE`, `SEMDEX_EMBEDDING_MODEL` and `SEMDEX_DIMENSION`
    /// override the defaults.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("SEMDEX_API_KEY")
            .or_else(|_| env::var("OPENAI_API_KEY"))
            .map_err(|_| EmbedderError::MissingApiKey)?;

        let mut config = Self::new(api_key);
        if let Ok(base) = env::var("SEMDEX_API_BASE") {
            config.api_base = base;
        }
        if let Ok(model) = env::var("SEMDEX_EMBEDDING_MODEL") {
            config.model = model;
        }
        if let Ok(raw) = env::var("SEMDEX_DIMENSION") {
            config.dimension = raw.parse().map_err(|_| {
                EmbedderError::Provider(format!("Invalid SEMDEX_DIMENSION '{raw}'"))
            })?;
        }
        Ok(config)
    }
}

/// OpenAI-compatible embeddings client (`POST {api_base}/embeddings`).
pub struct OpenAiEmbedder {
    client: Client,
    config: OpenAiEmbedderConfig,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Deserialize)]
struct EmbeddingRow {
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    pub fn new(config: OpenAiEmbedderConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.config.api_base.trim_end_matches('/'))
    }

    fn first_vector(&self, response: EmbeddingsResponse) -> Result<Vec<f32>> {
        let vector = response
            .data
            .into_iter()
            .next()
            .map(|row| row.embedding)
            .ok_or_else(|| {
                EmbedderError::Provider("embeddings response contained no data".to_string())
            })?;

        if vector.len() != self.config.dimension {
            return Err(EmbedderError::InvalidDimension {
                expected: self.config.dimension,
                actual: vector.len(),
            });
        }
        Ok(vector)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        log::debug!(
            "Embedding {} chars with model '{}'",
            text.len(),
            self.config.model
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&EmbeddingsRequest {
                model: &self.config.model,
                input: text,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbedderError::Provider(format!(
                "embeddings request failed with {status}: {}",
                truncate(&body, 200)
            )));
        }

        let parsed: EmbeddingsResponse = response.json().await?;
        self.first_vector(parsed)
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((offset, _)) => &text[..offset],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn embedder(dimension: usize) -> OpenAiEmbedder {
        let mut config = OpenAiEmbedderConfig::new("test-key");
        config.dimension = dimension;
        OpenAiEmbedder::new(config).unwrap()
    }

    #[test]
    fn endpoint_handles_trailing_slash() {
        let mut config = OpenAiEmbedderConfig::new("test-key");
        config.api_base = "http://localhost:8080/v1/".to_string();
        let embedder = OpenAiEmbedder::new(config).unwrap();
        assert_eq!(embedder.endpoint(), "http://localhost:8080/v1/embeddings");
    }

    #[test]
    fn response_parsing_extracts_the_first_vector() {
        let raw = r#"{"object":"list","data":[{"object":"embedding","index":0,"embedding":[0.1,0.2,0.3]}],"model":"text-embedding-3-small"}"#;
        let parsed: EmbeddingsResponse = serde_json::from_str(raw).unwrap();
        let vector = embedder(3).first_vector(parsed).unwrap();
        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn wrong_width_vector_is_rejected() {
        let raw = r#"{"data":[{"embedding":[0.1,0.2,0.3]}]}"#;
        let parsed: EmbeddingsResponse = serde_json::from_str(raw).unwrap();
        let err = embedder(1536).first_vector(parsed).unwrap_err();
        assert!(matches!(
            err,
            EmbedderError::InvalidDimension {
                expected: 1536,
                actual: 3
            }
        ));
    }

    #[test]
    fn empty_data_is_a_provider_error() {
        let raw = r#"{"data":[]}"#;
        let parsed: EmbeddingsResponse = serde_json::from_str(raw).unwrap();
        let err = embedder(3).first_vector(parsed).unwrap_err();
        assert!(matches!(err, EmbedderError::Provider(_)));
    }
}
