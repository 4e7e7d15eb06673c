//! # Semdex Indexer
//!
//! Document indexing for semantic similarity search.
//!
//! ## Pipeline
//!
//! ```text
//! Data directory
//!     │
//!     ├──> Document Loader (.json files)
//!     │      └─> (identity, text) pairs
//!     │
//!     └──> Maintenance Protocol (embed → upsert, one identity at a time)
//!            └─> Embedding Store (records + similarity index)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use semdex_embedder::StubEmbedder;
//! use semdex_indexer::DocumentIndexer;
//! use semdex_vector_store::EmbeddingStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let embedder = Arc::new(StubEmbedder::new(1536));
//!     let store = EmbeddingStore::open("index.json", 1536).await?;
//!
//!     let mut indexer = DocumentIndexer::new(store, embedder)?;
//!     let stats = indexer.index_directory("./data").await?;
//!
//!     println!("Indexed {} documents", stats.documents());
//!     Ok(())
//! }
//! ```

mod error;
mod indexer;
mod loader;
mod stats;

pub use error::{IndexerError, Result};
pub use indexer::DocumentIndexer;
pub use loader::{DocumentLoader, SourceDocument, CANDIDATE_FIELDS};
pub use stats::{IndexFailure, IndexStats};
