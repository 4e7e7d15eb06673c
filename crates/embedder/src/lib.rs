//! # Semdex Embedder
//!
//! Embedding provider interface: maps a text string to a fixed-width float
//! vector via an external service.
//!
//! The store never talks to a provider directly; the maintenance protocol
//! and the query engine receive an [`EmbeddingProvider`] as an explicit
//! construction-time dependency. Two backends ship:
//!
//! - [`OpenAiEmbedder`]: OpenAI-compatible HTTP API (the deployment path)
//! - [`StubEmbedder`]: deterministic hash-seeded vectors for offline runs
//!   and tests, selected with `SEMDEX_EMBEDDING_MODE=stub`

mod error;
mod openai;
mod stub;

pub use error::{EmbedderError, Result};
pub use openai::{OpenAiEmbedder, OpenAiEmbedderConfig, DEFAULT_DIMENSION, DEFAULT_MODEL};
pub use stub::StubEmbedder;

use async_trait::async_trait;

/// External embedding service: text in, fixed-width vector out.
///
/// Calls may fail (network, auth, quota) and may be slow; failures surface
/// to the caller and are never retried internally. Embedding an empty
/// string is allowed.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one text. A successful result always has exactly
    /// [`dimension`](Self::dimension) elements.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Fixed vector width for this deployment.
    fn dimension(&self) -> usize;
}

/// Which provider backend the process uses.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EmbeddingMode {
    Http,
    Stub,
}

impl EmbeddingMode {
    /// Resolve from `SEMDEX_EMBEDDING_MODE` (default `http`).
    pub fn from_env() -> Result<Self> {
        let raw = std::env::var("SEMDEX_EMBEDDING_MODE")
            .unwrap_or_else(|_| "http".to_string())
            .to_ascii_lowercase();
        match raw.as_str() {
            "http" => Ok(Self::Http),
            "stub" => Ok(Self::Stub),
            other => Err(EmbedderError::Provider(format!(
                "Unsupported SEMDEX_EMBEDDING_MODE '{other}' (expected 'http' or 'stub')"
            ))),
        }
    }
}
