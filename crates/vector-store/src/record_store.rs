use crate::error::{Result, VectorStoreError};
use crate::types::{RecordId, VectorRecord};
use std::collections::{BTreeMap, HashMap};
use std::time::{SystemTime, UNIX_EPOCH};

/// Mapping from document identity to its current embedding vector.
///
/// The identity string is the natural key: at most one record exists per
/// identity. Surrogate ids are assigned monotonically at creation, stay
/// stable across vector updates, and are never reused, so the id space
/// tolerates gaps.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: BTreeMap<String, VectorRecord>,
    identities: HashMap<RecordId, String>,
    next_id: RecordId,
}

impl RecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_next_id(next_id: RecordId) -> Self {
        Self {
            next_id,
            ..Self::default()
        }
    }

    /// Exact lookup by the unique identity key.
    #[must_use]
    pub fn get(&self, identity: &str) -> Option<&VectorRecord> {
        self.records.get(identity)
    }

    /// Reverse lookup by surrogate id.
    #[must_use]
    pub fn get_by_id(&self, id: RecordId) -> Option<&VectorRecord> {
        let identity = self.identities.get(&id)?;
        self.records.get(identity)
    }

    /// Insert-if-absent, else replace the vector in place.
    ///
    /// Returns the record's surrogate id. An existing record keeps its id
    /// and creation timestamp; only the vector changes. The existence check
    /// and the write happen under the same `&mut self`, so no interleaving
    /// can produce two records for one identity.
    pub fn upsert(&mut self, identity: &str, vector: Vec<f32>) -> Result<RecordId> {
        if let Some(record) = self.records.get_mut(identity) {
            record.vector = vector;
            return Ok(record.id);
        }

        let id = self.next_id;
        if self.identities.contains_key(&id) {
            return Err(VectorStoreError::ConstraintViolation(format!(
                "surrogate id {id} is already assigned"
            )));
        }
        self.next_id += 1;
        self.identities.insert(id, identity.to_string());
        self.records.insert(
            identity.to_string(),
            VectorRecord {
                id,
                identity: identity.to_string(),
                vector,
                created_at_ms: unix_time_ms(),
            },
        );
        Ok(id)
    }

    /// Re-insert a persisted record, keeping its original id and timestamp.
    pub(crate) fn restore(&mut self, record: VectorRecord) -> Result<()> {
        if self.records.contains_key(&record.identity) {
            return Err(VectorStoreError::ConstraintViolation(format!(
                "duplicate identity '{}' in persisted store",
                record.identity
            )));
        }
        if self.identities.contains_key(&record.id) {
            return Err(VectorStoreError::ConstraintViolation(format!(
                "duplicate surrogate id {} in persisted store",
                record.id
            )));
        }
        self.next_id = self.next_id.max(record.id + 1);
        self.identities.insert(record.id, record.identity.clone());
        self.records.insert(record.identity.clone(), record);
        Ok(())
    }

    /// Total number of records.
    #[must_use]
    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VectorRecord> {
        self.records.values()
    }

    pub(crate) const fn next_id(&self) -> RecordId {
        self.next_id
    }
}

fn unix_time_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn upsert_assigns_monotonic_ids() {
        let mut store = RecordStore::new();
        let a = store.upsert("a", vec![1.0]).unwrap();
        let b = store.upsert("b", vec![2.0]).unwrap();
        let c = store.upsert("c", vec![3.0]).unwrap();

        assert_eq!((a, b, c), (0, 1, 2));
        assert_eq!(store.count(), 3);
    }

    #[test]
    fn upsert_replaces_vector_in_place() {
        let mut store = RecordStore::new();
        let first = store.upsert("a", vec![1.0, 0.0]).unwrap();
        let created_at = store.get("a").unwrap().created_at_ms;

        let second = store.upsert("a", vec![0.0, 1.0]).unwrap();

        assert_eq!(first, second);
        assert_eq!(store.count(), 1);
        let record = store.get("a").unwrap();
        assert_eq!(record.vector, vec![0.0, 1.0]);
        assert_eq!(record.created_at_ms, created_at);
    }

    #[test]
    fn reverse_lookup_resolves_surrogate_ids() {
        let mut store = RecordStore::new();
        let a = store.upsert("a", vec![1.0]).unwrap();
        let b = store.upsert("b", vec![2.0]).unwrap();

        assert_eq!(store.get_by_id(a).unwrap().identity, "a");
        assert_eq!(store.get_by_id(b).unwrap().identity, "b");
        assert!(store.get_by_id(99).is_none());
    }

    #[test]
    fn ids_are_not_reused_after_updates() {
        let mut store = RecordStore::new();
        store.upsert("a", vec![1.0]).unwrap();
        store.upsert("b", vec![2.0]).unwrap();
        store.upsert("a", vec![3.0]).unwrap();

        let c = store.upsert("c", vec![4.0]).unwrap();
        assert_eq!(c, 2);
    }

    #[test]
    fn restore_rejects_duplicate_identity_and_id() {
        let mut store = RecordStore::new();
        let record = VectorRecord {
            id: 7,
            identity: "a".to_string(),
            vector: vec![1.0],
            created_at_ms: 0,
        };
        store.restore(record.clone()).unwrap();

        assert!(matches!(
            store.restore(record.clone()),
            Err(VectorStoreError::ConstraintViolation(_))
        ));

        let mut same_id = record;
        same_id.identity = "b".to_string();
        assert!(matches!(
            store.restore(same_id),
            Err(VectorStoreError::ConstraintViolation(_))
        ));

        // The counter moved past the restored id.
        let next = store.upsert("c", vec![2.0]).unwrap();
        assert_eq!(next, 8);
    }
}
