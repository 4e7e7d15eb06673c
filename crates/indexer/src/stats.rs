use serde::{Deserialize, Serialize};

/// Statistics for one maintenance run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStats {
    /// Identities successfully embedded and upserted, in processing order
    pub indexed: Vec<String>,

    /// Per-identity failures; the rest of the batch continued
    pub failures: Vec<IndexFailure>,

    /// Time taken in milliseconds
    pub time_ms: u64,
}

/// One identity that could not be indexed, with enough context to retry
/// just that item later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexFailure {
    pub identity: String,
    pub error: String,
}

impl IndexStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successfully indexed documents.
    #[must_use]
    pub fn documents(&self) -> usize {
        self.indexed.len()
    }

    pub fn add_document(&mut self, identity: impl Into<String>) {
        self.indexed.push(identity.into());
    }

    pub fn add_failure(&mut self, identity: impl Into<String>, error: impl ToString) {
        self.failures.push(IndexFailure {
            identity: identity.into(),
            error: error.to_string(),
        });
    }
}
