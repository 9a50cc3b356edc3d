//! Image upload utilities for a MinIO-backed site.
//!
//! The main piece is the upload reconciler: it compares the local `images/`
//! folder against the persisted `images.json` manifest, uploads whatever is
//! missing with a bounded retry budget, and writes the merged manifest back.
//! Runs are idempotent per logical name (filename stem) and one file's
//! failure never aborts the batch.
//!
//! Alongside it live two small JSON endpoints: a listing of local PNGs and a
//! proxied random image search against Wikimedia Commons.

pub mod api;
pub mod config;
pub mod error;
pub mod manifest;
pub mod reconciler;
pub mod retry;
pub mod store;

pub use config::StorageConfig;
pub use error::SyncError;
pub use manifest::Manifest;
pub use reconciler::{FailedUpload, Reconciler, RunSummary, UploadOutcome};
pub use store::{ObjectStore, S3Store};
