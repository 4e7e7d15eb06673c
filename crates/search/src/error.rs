use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Embedder error: {0}")]
    Embedder(#[from] semdex_embedder::EmbedderError),

    #[error("Vector store error: {0}")]
    VectorStore(#[from] semdex_vector_store::VectorStoreError),
}
