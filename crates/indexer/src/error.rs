use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Embedder error: {0}")]
    Embedder(#[from] semdex_embedder::EmbedderError),

    #[error("Vector store error: {0}")]
    VectorStore(#[from] semdex_vector_store::VectorStoreError),

    #[error("Invalid data directory: {0}")]
    InvalidPath(String),
}
