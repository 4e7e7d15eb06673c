//! # Semdex Search
//!
//! Query engine over an embedding store: embeds a query string and returns
//! the identities of the most similar stored documents, ascending by
//! distance.

mod engine;
mod error;

pub use engine::{SearchEngine, SearchHit};
pub use error::{Result, SearchError};
