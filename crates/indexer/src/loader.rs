use crate::error::{IndexerError, Result};
use ignore::WalkBuilder;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Embeddable-text candidates, in priority order.
pub const CANDIDATE_FIELDS: [&str; 4] = ["summary", "description", "title", "name"];

/// One loadable document: a stable identity plus the text to embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub identity: String,
    pub text: String,
}

/// Loader for structured JSON documents in a data directory.
pub struct DocumentLoader {
    root: PathBuf,
}

impl DocumentLoader {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Collect `(identity, text)` pairs for every `.json` file under the
    /// data directory, sorted by identity for a reproducible batch order.
    ///
    /// Unreadable or unparseable files are logged and skipped; they never
    /// abort the batch.
    pub fn load(&self) -> Result<Vec<SourceDocument>> {
        if !self.root.is_dir() {
            return Err(IndexerError::InvalidPath(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }

        let mut documents = Vec::new();
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true);

        for result in builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("Failed to read entry: {err}");
                    continue;
                }
            };
            let Some(file_type) = entry.file_type() else {
                continue;
            };
            if !file_type.is_file() {
                continue;
            }

            let path = entry.path();
            if !is_json_file(path) {
                continue;
            }

            let raw = match std::fs::read_to_string(path) {
                Ok(raw) => raw,
                Err(err) => {
                    log::warn!("Skipping unreadable file {}: {err}", path.display());
                    continue;
                }
            };
            let value: Value = match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(err) => {
                    log::warn!("Skipping invalid JSON {}: {err}", path.display());
                    continue;
                }
            };

            documents.push(SourceDocument {
                identity: self.identity_for(path),
                text: embeddable_text(&value).to_string(),
            });
        }

        documents.sort_by(|a, b| a.identity.cmp(&b.identity));
        log::info!(
            "Found {} documents in {}",
            documents.len(),
            self.root.display()
        );
        Ok(documents)
    }

    /// Identity is the path relative to the data root, with forward
    /// slashes, so a corpus yields the same keys on every platform.
    fn identity_for(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative.to_string_lossy().replace('\\', "/")
    }
}

fn is_json_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// First present string field among the candidates, defaulting to the empty
/// string. Presence wins over truthiness: an empty `summary` is still
/// selected ahead of a populated `description`.
fn embeddable_text(value: &Value) -> &str {
    CANDIDATE_FIELDS
        .iter()
        .find_map(|field| value.get(field).and_then(Value::as_str))
        .unwrap_or("")
}
