use crate::error::Result;
use semdex_embedder::EmbeddingProvider;
use semdex_vector_store::EmbeddingStore;
use serde::Serialize;
use std::sync::Arc;

/// One ranked result: a document identity and its distance from the query
/// (non-negative, smaller = more similar).
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub identity: String,
    pub distance: f32,
}

/// Query engine: embeds a query string and ranks stored documents by
/// distance.
///
/// Reads only; the store and the provider are construction-time
/// dependencies.
pub struct SearchEngine<'a> {
    store: &'a EmbeddingStore,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl<'a> SearchEngine<'a> {
    pub fn new(store: &'a EmbeddingStore, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { store, embedder }
    }

    /// Return up to `limit` identities, ascending by distance to the query.
    ///
    /// A provider or storage failure aborts the whole query; there is no
    /// partial result when the query embedding cannot be computed. A hit
    /// whose surrogate id resolves to no record (index inconsistency) is
    /// dropped with an integrity warning instead of failing the query.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        log::debug!("Searching for '{query}' (limit: {limit})");

        let vector = self.embedder.embed(query).await?;
        let hits = self.store.query(&vector, limit)?;

        let mut results = Vec::with_capacity(hits.len());
        for (id, distance) in hits {
            match self.store.record_by_id(id) {
                Some(record) => results.push(SearchHit {
                    identity: record.identity.clone(),
                    distance,
                }),
                None => log::warn!(
                    "Integrity warning: index references missing record {id}; dropping hit"
                ),
            }
        }

        log::debug!("Found {} results", results.len());
        Ok(results)
    }
}
