//! # Semdex Vector Store
//!
//! Durable storage and similarity search for document embeddings.
//!
//! ## Architecture
//!
//! ```text
//! (identity, vector)
//!     │
//!     ├──> Record Store
//!     │      └─> identity → VectorRecord (natural key, surrogate id)
//!     │
//!     └──> Similarity Index
//!            └─> surrogate id → vector (exact nearest-neighbor queries)
//! ```
//!
//! The [`RecordStore`] owns the identity-to-vector mapping and is the source
//! of truth. The [`SimilarityIndex`] is a derived projection of it, keyed by
//! surrogate id. The [`EmbeddingStore`] facade keeps the two consistent:
//! every upsert writes the record store first and replaces the index entry
//! second, and loading a persisted store rebuilds the index from the records.
//!
//! ## Example
//!
//! ```no_run
//! use semdex_vector_store::EmbeddingStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut store = EmbeddingStore::open("index.json", 1536).await?;
//!
//!     let id = store.upsert("docs/pizza.json", vec![0.0; 1536])?;
//!     let hits = store.query(&vec![0.0; 1536], 10)?;
//!
//!     for (hit_id, distance) in hits {
//!         let record = store.record_by_id(hit_id).unwrap();
//!         println!("{}: {:.4}", record.identity, distance);
//!     }
//!     # let _ = id;
//!
//!     store.save().await?;
//!     Ok(())
//! }
//! ```

mod error;
mod record_store;
mod similarity_index;
mod store;
mod types;

pub use error::{Result, VectorStoreError};
pub use record_store::RecordStore;
pub use similarity_index::{squared_l2, SimilarityIndex};
pub use store::{EmbeddingStore, STORE_SCHEMA_VERSION};
pub use types::{RecordId, VectorRecord};
