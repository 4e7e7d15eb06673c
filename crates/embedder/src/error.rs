use thiserror::Error;

pub type Result<T> = std::result::Result<T, EmbedderError>;

#[derive(Error, Debug)]
pub enum EmbedderError {
    #[error("Embedding provider error: {0}")]
    Provider(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Missing API key: set OPENAI_API_KEY or SEMDEX_API_KEY")]
    MissingApiKey,
}
