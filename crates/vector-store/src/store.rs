use crate::error::{Result, VectorStoreError};
use crate::record_store::RecordStore;
use crate::similarity_index::SimilarityIndex;
use crate::types::{RecordId, VectorRecord};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const STORE_SCHEMA_VERSION: u32 = 1;

/// Combined record store and similarity index with JSON persistence.
///
/// All mutation goes through [`upsert`](Self::upsert), which writes the
/// record store before replacing the index entry. The record store is the
/// source of truth: only it is persisted, and [`load`](Self::load)
/// regenerates the index from the records.
#[derive(Debug)]
pub struct EmbeddingStore {
    records: RecordStore,
    index: SimilarityIndex,
    path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedStore {
    schema_version: u32,
    dimension: usize,
    next_id: RecordId,
    records: Vec<VectorRecord>,
}

impl EmbeddingStore {
    /// Create an empty store that will persist to `path`.
    #[must_use]
    pub fn new(path: impl AsRef<Path>, dimension: usize) -> Self {
        Self {
            records: RecordStore::new(),
            index: SimilarityIndex::new(dimension),
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load the store at `path`, or create an empty one when the file does
    /// not exist yet. A persisted dimension differing from `dimension` is an
    /// error: stored vectors are not re-normalizable after the fact.
    pub async fn open(path: impl AsRef<Path>, dimension: usize) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new(path, dimension));
        }

        let store = Self::load(path).await?;
        if store.dimension() != dimension {
            return Err(VectorStoreError::InvalidDimension {
                expected: store.dimension(),
                actual: dimension,
            });
        }
        Ok(store)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let persisted: PersistedStore = serde_json::from_slice(&bytes)?;
        if persisted.schema_version != STORE_SCHEMA_VERSION {
            return Err(VectorStoreError::Corrupt(format!(
                "unsupported store schema_version {} (expected {STORE_SCHEMA_VERSION})",
                persisted.schema_version
            )));
        }

        let mut records = RecordStore::with_next_id(persisted.next_id);
        let mut index = SimilarityIndex::new(persisted.dimension);

        // Rebuild the index from the records, oldest surrogate id first, so
        // tie-breaking stays deterministic across restarts.
        let mut loaded = persisted.records;
        loaded.sort_by_key(|record| record.id);
        for record in loaded {
            if record.id >= persisted.next_id {
                return Err(VectorStoreError::Corrupt(format!(
                    "record id {} is not below the persisted id counter {}",
                    record.id, persisted.next_id
                )));
            }
            index.replace(record.id, &record.vector)?;
            records.restore(record)?;
        }

        log::info!(
            "Loaded {} records (dimension {}) from {}",
            records.count(),
            index.dimension(),
            path.display()
        );

        Ok(Self {
            records,
            index,
            path: path.to_path_buf(),
        })
    }

    /// Persist the record store to disk via a temp-file rename.
    pub async fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let persisted = PersistedStore {
            schema_version: STORE_SCHEMA_VERSION,
            dimension: self.index.dimension(),
            next_id: self.records.next_id(),
            records: self.records.iter().cloned().collect(),
        };
        let bytes = serde_json::to_vec_pretty(&persisted)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        log::debug!(
            "Saved {} records to {}",
            self.records.count(),
            self.path.display()
        );
        Ok(())
    }

    /// Upsert one identity's vector into both structures.
    ///
    /// The record store is written first; the index entry is deleted and
    /// recreated afterwards. A dimension mismatch fails before either
    /// structure is touched, so a record is never partially written.
    pub fn upsert(&mut self, identity: &str, vector: Vec<f32>) -> Result<RecordId> {
        if vector.len() != self.index.dimension() {
            return Err(VectorStoreError::InvalidDimension {
                expected: self.index.dimension(),
                actual: vector.len(),
            });
        }

        let id = self.records.upsert(identity, vector)?;
        let stored = self.records.get_by_id(id).ok_or_else(|| {
            VectorStoreError::ConstraintViolation(format!("record {id} vanished during upsert"))
        })?;
        self.index.replace(id, &stored.vector)?;
        Ok(id)
    }

    /// Nearest-neighbor query over the index; see [`SimilarityIndex::query`].
    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<(RecordId, f32)>> {
        self.index.query(vector, k)
    }

    #[must_use]
    pub fn record(&self, identity: &str) -> Option<&VectorRecord> {
        self.records.get(identity)
    }

    #[must_use]
    pub fn record_by_id(&self, id: RecordId) -> Option<&VectorRecord> {
        self.records.get_by_id(id)
    }

    /// Total number of indexed documents.
    #[must_use]
    pub fn count(&self) -> usize {
        self.records.count()
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> impl Iterator<Item = &VectorRecord> {
        self.records.iter()
    }

    /// Read-only view of the similarity index.
    #[must_use]
    pub fn index(&self) -> &SimilarityIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn assert_projection_invariant(store: &EmbeddingStore) {
        let record_ids: BTreeSet<RecordId> = store.records().map(|r| r.id).collect();
        let index_ids: BTreeSet<RecordId> = store.index().ids().collect();
        assert_eq!(record_ids, index_ids);

        for record in store.records() {
            assert_eq!(store.index().vector(record.id), Some(record.vector.as_slice()));
        }
    }

    #[test]
    fn upsert_keeps_record_store_and_index_consistent() {
        let mut store = EmbeddingStore::new("unused.json", 2);
        store.upsert("a", vec![1.0, 0.0]).unwrap();
        store.upsert("b", vec![0.0, 1.0]).unwrap();
        assert_projection_invariant(&store);

        store.upsert("a", vec![0.5, 0.5]).unwrap();
        assert_projection_invariant(&store);
        assert_eq!(store.count(), 2);
        assert_eq!(store.index().len(), 2);
    }

    #[test]
    fn reindexing_one_document_updates_in_place() {
        let mut store = EmbeddingStore::new("unused.json", 2);
        store.upsert("a", vec![1.0, 0.0]).unwrap();
        let b = store.upsert("b", vec![0.0, 1.0]).unwrap();
        store.upsert("c", vec![1.0, 1.0]).unwrap();

        let new_b = vec![-1.0, -1.0];
        let b_again = store.upsert("b", new_b.clone()).unwrap();

        assert_eq!(b, b_again);
        assert_eq!(store.count(), 3);
        assert_eq!(store.record("b").unwrap().vector, new_b);

        let hits = store.query(&new_b, 1).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, b);
        assert!(hits[0].1.abs() < 1e-6);
    }

    #[test]
    fn upsert_is_idempotent() {
        let mut store = EmbeddingStore::new("unused.json", 2);
        let first = store.upsert("a", vec![1.0, 0.0]).unwrap();
        let second = store.upsert("a", vec![1.0, 0.0]).unwrap();

        assert_eq!(first, second);
        assert_eq!(store.count(), 1);
        assert_eq!(store.index().len(), 1);
        assert_projection_invariant(&store);
    }

    #[test]
    fn query_beyond_store_size_returns_everything_ordered() {
        let mut store = EmbeddingStore::new("unused.json", 2);
        store.upsert("a", vec![1.0, 0.0]).unwrap();
        store.upsert("b", vec![0.0, 1.0]).unwrap();
        store.upsert("c", vec![0.7, 0.7]).unwrap();

        let hits = store.query(&[1.0, 0.0], 10).unwrap();
        assert_eq!(hits.len(), 3);

        let ids: BTreeSet<RecordId> = hits.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids.len(), 3);
        for pair in hits.windows(2) {
            assert!(pair[0].1 <= pair[1].1);
        }
    }

    #[test]
    fn oversized_vector_is_rejected_before_any_write() {
        let mut store = EmbeddingStore::new("unused.json", 2);
        let err = store.upsert("a", vec![1.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, VectorStoreError::InvalidDimension { .. }));
        assert_eq!(store.count(), 0);
        assert_eq!(store.index().len(), 0);
    }

    #[tokio::test]
    async fn save_and_load_rebuild_an_equivalent_index() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("index.json");

        let mut store = EmbeddingStore::new(&path, 2);
        store.upsert("a", vec![1.0, 0.0]).unwrap();
        let b = store.upsert("b", vec![0.0, 1.0]).unwrap();
        store.upsert("b", vec![0.2, 0.8]).unwrap();
        store.save().await.unwrap();

        let mut loaded = EmbeddingStore::load(&path).await.unwrap();
        assert_eq!(loaded.count(), 2);
        assert_eq!(loaded.dimension(), 2);
        assert_projection_invariant(&loaded);
        assert_eq!(loaded.record("b").unwrap().id, b);
        assert_eq!(loaded.record("b").unwrap().vector, vec![0.2, 0.8]);

        // The id counter survives the round trip: fresh identities keep
        // extending the sequence instead of reusing ids.
        let c = loaded.upsert("c", vec![1.0, 1.0]).unwrap();
        assert_eq!(c, 2);
    }

    #[tokio::test]
    async fn open_rejects_a_conflicting_dimension() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("index.json");

        let mut store = EmbeddingStore::new(&path, 3);
        store.upsert("a", vec![1.0, 0.0, 0.0]).unwrap();
        store.save().await.unwrap();

        let err = EmbeddingStore::open(&path, 4).await.unwrap_err();
        assert!(matches!(
            err,
            VectorStoreError::InvalidDimension {
                expected: 3,
                actual: 4
            }
        ));
    }

    #[tokio::test]
    async fn load_rejects_unknown_schema_version() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("index.json");
        tokio::fs::write(
            &path,
            r#"{"schema_version":99,"dimension":2,"next_id":0,"records":[]}"#,
        )
        .await
        .unwrap();

        let err = EmbeddingStore::load(&path).await.unwrap_err();
        assert!(matches!(err, VectorStoreError::Corrupt(_)));
    }

    #[tokio::test]
    async fn open_creates_an_empty_store_when_missing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("index.json");

        let store = EmbeddingStore::open(&path, 4).await.unwrap();
        assert_eq!(store.count(), 0);
        assert_eq!(store.dimension(), 4);
    }
}
