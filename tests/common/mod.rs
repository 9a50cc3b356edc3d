use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image_sync::{ObjectStore, StorageConfig, SyncError};

pub fn test_config() -> StorageConfig {
    StorageConfig::new(
        "https://minio.example.com",
        "test-access".into(),
        "test-secret".into(),
        "photos".into(),
    )
    .unwrap()
}

#[derive(Debug, Clone)]
pub struct RecordedPut {
    pub object_name: String,
    pub content_type: String,
    pub len: usize,
}

/// An in-memory [`ObjectStore`] that records every put and can be told to
/// always fail files with a given logical name.
#[derive(Clone, Default)]
pub struct RecordingStore {
    puts: Arc<Mutex<Vec<RecordedPut>>>,
    failing_stems: Arc<Mutex<Vec<String>>>,
}

/// Strips the 36-character UUID prefix and the dash from an object name.
pub fn remote_suffix(object_name: &str) -> &str {
    &object_name[37..]
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every upload of a file whose stem equals `stem` will fail.
    pub fn fail_always(&self, stem: &str) {
        self.failing_stems.lock().unwrap().push(stem.to_string());
    }

    pub fn puts(&self) -> Vec<RecordedPut> {
        self.puts.lock().unwrap().clone()
    }

    /// Number of put attempts recorded for files with the given stem.
    pub fn attempts_for(&self, stem: &str) -> usize {
        let prefix = format!("{}.", stem);
        self.puts()
            .iter()
            .filter(|p| remote_suffix(&p.object_name).starts_with(&prefix))
            .count()
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn put_object(
        &self,
        object_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), SyncError> {
        self.puts.lock().unwrap().push(RecordedPut {
            object_name: object_name.to_string(),
            content_type: content_type.to_string(),
            len: bytes.len(),
        });

        let suffix = remote_suffix(object_name);
        let failing = self
            .failing_stems
            .lock()
            .unwrap()
            .iter()
            .any(|stem| suffix.starts_with(&format!("{}.", stem)));
        if failing {
            return Err(SyncError::StorageError {
                message: format!("injected failure for {}", object_name),
            });
        }
        Ok(())
    }
}
