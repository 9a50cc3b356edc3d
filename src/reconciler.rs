use std::path::Path;

use tokio::fs;
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::error::SyncError;
use crate::manifest::Manifest;
use crate::retry::{exponential_backoff, retry_with_backoff, MAX_ATTEMPTS};
use crate::store::{public_url, ObjectStore};

/// File extensions (case-insensitive) recognized as images during discovery.
/// Anything else in the folder is silently ignored.
pub const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "gif", "webp", "svg", "bmp"];

/// The outcome of one freshly uploaded file.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    /// Filename stem; the identity key in the manifest.
    pub name: String,
    /// Public URL of the uploaded object.
    pub url: String,
    /// The unique remote object name the bytes were stored under.
    pub object_name: String,
    pub original_filename: String,
}

/// A file whose upload attempts were all exhausted.
#[derive(Debug, Clone)]
pub struct FailedUpload {
    pub filename: String,
    /// Message of the last attempt's error.
    pub error: String,
}

/// Counts and per-file failures for one reconciler run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Recognized image files in the folder.
    pub total: usize,
    /// Files whose logical name was already in the manifest.
    pub skipped: usize,
    /// Files uploaded by this run.
    pub uploaded: usize,
    pub failures: Vec<FailedUpload>,
    /// Set when the merged manifest could not be written back. The uploads
    /// themselves already happened; re-running will upload those files again
    /// under fresh object names.
    pub manifest_error: Option<String>,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

pub fn logical_name(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
        .to_string()
}

fn is_image_file(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Builds the remote object name: `{uuid}-{stem}{extension}`.
///
/// The fresh UUID makes every upload independently addressable, so repeated
/// runs after a lost manifest never overwrite an existing object.
fn make_object_name(filename: &str) -> String {
    let stem = logical_name(filename);
    match Path::new(filename).extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}-{}.{}", Uuid::new_v4(), stem, ext),
        None => format!("{}-{}", Uuid::new_v4(), stem),
    }
}

/// Content type from the file extension only; no content sniffing.
fn content_type_for(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .to_string()
}

/// Compares the image folder against the manifest and uploads whatever is
/// missing, one file at a time.
pub struct Reconciler<'a, S: ObjectStore> {
    store: &'a S,
    config: &'a StorageConfig,
}

impl<'a, S: ObjectStore> Reconciler<'a, S> {
    pub fn new(store: &'a S, config: &'a StorageConfig) -> Self {
        Self { store, config }
    }

    /// Runs one reconciliation pass.
    ///
    /// Files whose logical name is already in the manifest are skipped before
    /// any read, so they cost nothing beyond the directory listing. Each
    /// remaining file gets its own retry budget; a file that exhausts it is
    /// recorded and the batch moves on.
    pub async fn run(
        &self,
        images_dir: &Path,
        manifest_path: &Path,
    ) -> Result<RunSummary, SyncError> {
        if fs::metadata(images_dir).await.is_err() {
            return Err(SyncError::MissingImagesDir(images_dir.to_path_buf()));
        }

        let manifest = Manifest::load(manifest_path).await;
        if !manifest.is_empty() {
            tracing::info!(count = manifest.len(), "found already uploaded images in manifest");
        }

        let candidates = list_image_files(images_dir).await?;
        let mut summary = RunSummary {
            total: candidates.len(),
            ..Default::default()
        };

        if candidates.is_empty() {
            tracing::info!(dir = %images_dir.display(), "no image files found");
            return Ok(summary);
        }

        let to_upload: Vec<&String> = candidates
            .iter()
            .filter(|f| !manifest.contains(&logical_name(f)))
            .collect();
        summary.skipped = summary.total - to_upload.len();

        tracing::info!(
            total = summary.total,
            already_uploaded = summary.skipped,
            to_upload = to_upload.len(),
            "reconciled local images against manifest"
        );

        if to_upload.is_empty() {
            tracing::info!("all images are already uploaded");
            return Ok(summary);
        }

        for filename in &to_upload {
            tracing::debug!(filename = %filename, "queued for upload");
        }

        let mut merged = manifest.clone();
        for filename in to_upload {
            match self.upload_one(images_dir, filename).await {
                Ok(outcome) => {
                    merged.insert(outcome.name, outcome.url);
                    summary.uploaded += 1;
                }
                Err(err) => {
                    tracing::error!(filename = %filename, error = %err, "giving up on file");
                    summary.failures.push(FailedUpload {
                        filename: filename.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }

        if let Err(err) = merged.save(manifest_path).await {
            tracing::error!(path = %manifest_path.display(), error = %err, "failed to save manifest");
            summary.manifest_error = Some(err.to_string());
        } else {
            tracing::info!(path = %manifest_path.display(), "manifest saved");
        }

        Ok(summary)
    }

    async fn upload_one(
        &self,
        images_dir: &Path,
        filename: &str,
    ) -> Result<UploadOutcome, SyncError> {
        let name = logical_name(filename);
        let bytes = fs::read(images_dir.join(filename)).await?;
        let object_name = make_object_name(filename);
        let content_type = content_type_for(filename);

        let object = object_name.as_str();
        let mime = content_type.as_str();
        retry_with_backoff(MAX_ATTEMPTS, exponential_backoff, |attempt| {
            let bytes = bytes.clone();
            async move {
                tracing::info!(
                    attempt,
                    max = MAX_ATTEMPTS,
                    filename,
                    object,
                    "uploading"
                );
                self.store.put_object(object, bytes, mime).await
            }
        })
        .await?;

        let url = public_url(self.config, &object_name);
        tracing::info!(filename, url = %url, "successfully uploaded");

        Ok(UploadOutcome {
            name,
            url,
            object_name,
            original_filename: filename.to_string(),
        })
    }
}

/// Lists recognized image files in directory order; no sorting is applied.
async fn list_image_files(dir: &Path) -> Result<Vec<String>, SyncError> {
    let mut entries = fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if let Some(name) = entry.file_name().to_str() {
            if is_image_file(name) {
                files.push(name.to_string());
            }
        }
    }
    Ok(files)
}
