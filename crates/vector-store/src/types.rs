use serde::{Deserialize, Serialize};

/// Surrogate key joining a [`VectorRecord`](crate::VectorRecord) with its
/// similarity-index entry. Assigned once at creation, never reused.
pub type RecordId = u64;

/// One document's current embedding.
///
/// `identity` is the natural key (unique across the store); `id` is the
/// surrogate key used by the similarity index. The vector is replaced in
/// place on re-indexing; `id`, `identity` and `created_at_ms` never change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: RecordId,
    pub identity: String,
    pub vector: Vec<f32>,
    pub created_at_ms: u64,
}
