use crate::error::{Result, VectorStoreError};
use crate::types::RecordId;

/// Exact nearest-neighbor index over the stored vectors.
///
/// Entries are kept in insertion order and queries sort stably by distance,
/// so equal distances resolve to the earlier-inserted entry. Updates go
/// through [`replace`](Self::replace) as delete-plus-insert, never in-place
/// mutation, which keeps the contract portable to index backends without
/// partial update support.
#[derive(Debug)]
pub struct SimilarityIndex {
    dimension: usize,
    entries: Vec<IndexEntry>,
}

#[derive(Debug, Clone)]
struct IndexEntry {
    id: RecordId,
    vector: Vec<f32>,
}

impl SimilarityIndex {
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Remove any existing entry for `id`, then insert a fresh one.
    ///
    /// Idempotent in effect: replacing twice with the same arguments leaves
    /// the index in the same observable state.
    pub fn replace(&mut self, id: RecordId, vector: &[f32]) -> Result<()> {
        self.check_dimension(vector)?;
        self.remove(id);
        self.entries.push(IndexEntry {
            id,
            vector: vector.to_vec(),
        });
        Ok(())
    }

    /// Remove the entry for `id`; no-op when absent.
    pub fn remove(&mut self, id: RecordId) {
        self.entries.retain(|entry| entry.id != id);
    }

    /// Return up to `k` entries by ascending squared L2 distance to `query`.
    pub fn query(&self, query: &[f32], k: usize) -> Result<Vec<(RecordId, f32)>> {
        self.check_dimension(query)?;

        let mut scored: Vec<(RecordId, f32)> = self
            .entries
            .iter()
            .map(|entry| (entry.id, squared_l2(query, &entry.vector)))
            .collect();

        // Stable sort: insertion order breaks distance ties.
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        Ok(scored)
    }

    /// Number of entries in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Surrogate ids currently present, in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.entries.iter().map(|entry| entry.id)
    }

    /// Vector stored for `id`, if present.
    #[must_use]
    pub fn vector(&self, id: RecordId) -> Option<&[f32]> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.vector.as_slice())
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(VectorStoreError::InvalidDimension {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

/// Squared Euclidean distance between two vectors of equal length.
///
/// Zero for an exact match; larger means less similar.
#[must_use]
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
