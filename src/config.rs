use std::env;

use url::Url;

use crate::error::SyncError;

/// Connection parameters for the object-storage service.
///
/// Constructed once at process start from the environment and passed by
/// reference into the reconciler. All four values are required; construction
/// fails fast when any is absent.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    endpoint: Url,
    /// The endpoint exactly as configured, with any trailing slash removed.
    /// Public URLs are built from this string.
    endpoint_raw: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
}

fn required(name: &'static str) -> Result<String, SyncError> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(SyncError::MissingEnv(name)),
    }
}

impl StorageConfig {
    /// Reads `MINIO_ENDPOINT`, `MINIO_ACCESS_KEY`, `MINIO_SECRET_KEY` and
    /// `MINIO_BUCKET` from the process environment.
    pub fn from_env() -> Result<Self, SyncError> {
        Self::new(
            &required("MINIO_ENDPOINT")?,
            required("MINIO_ACCESS_KEY")?,
            required("MINIO_SECRET_KEY")?,
            required("MINIO_BUCKET")?,
        )
    }

    pub fn new(
        endpoint: &str,
        access_key: String,
        secret_key: String,
        bucket: String,
    ) -> Result<Self, SyncError> {
        let parsed = Url::parse(endpoint)?;
        Ok(Self {
            endpoint: parsed,
            endpoint_raw: endpoint.trim_end_matches('/').to_string(),
            access_key,
            secret_key,
            bucket,
        })
    }

    /// The endpoint as configured, without a trailing slash.
    pub fn endpoint(&self) -> &str {
        &self.endpoint_raw
    }

    /// Whether the endpoint uses TLS, derived from the URL scheme.
    pub fn use_ssl(&self) -> bool {
        self.endpoint.scheme() == "https"
    }

    pub fn host(&self) -> &str {
        self.endpoint.host_str().unwrap_or_default()
    }

    /// The explicit port from the endpoint URL, or the scheme default
    /// (443 for https, 80 otherwise).
    pub fn port(&self) -> u16 {
        self.endpoint
            .port()
            .unwrap_or(if self.use_ssl() { 443 } else { 80 })
    }
}
