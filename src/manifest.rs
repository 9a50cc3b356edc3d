use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use tokio::fs;

use crate::error::SyncError;

/// The persisted logical-name → public-URL map, stored as a single JSON
/// object (`images.json`). This file is the tool's only memory between runs:
/// once a logical name has an entry it is never uploaded again, even if the
/// local bytes changed. Deleting the entry (or the file) forces a re-upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, String>,
}

impl Manifest {
    /// Loads the manifest, tolerating a missing or damaged file.
    ///
    /// A malformed file, or entries whose value is not a string, are logged
    /// and dropped rather than aborting the run; the affected names will
    /// simply be uploaded again.
    pub async fn load(path: &Path) -> Self {
        let raw = match fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "could not read manifest, starting empty");
                return Self::default();
            }
        };

        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "manifest is not valid JSON, starting empty");
                return Self::default();
            }
        };

        let Some(object) = value.as_object() else {
            tracing::warn!(path = %path.display(), "manifest is not a JSON object, starting empty");
            return Self::default();
        };

        let mut entries = BTreeMap::new();
        for (name, url) in object {
            match url.as_str() {
                Some(url) => {
                    entries.insert(name.clone(), url.to_string());
                }
                None => {
                    tracing::warn!(name, "dropping manifest entry with non-string URL");
                }
            }
        }
        Self { entries }
    }

    /// Overwrites the manifest file with the full map, pretty-printed.
    pub async fn save(&self, path: &Path) -> Result<(), SyncError> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(path, json).await?;
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: String, url: String) {
        self.entries.insert(name, url);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
