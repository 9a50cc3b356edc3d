#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Missing required environment variable {0}. Please set it in the environment or a .env file.")]
    MissingEnv(&'static str),
    #[error("Images folder not found at {}", .0.display())]
    MissingImagesDir(std::path::PathBuf),
    #[error("Network request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Upload failed: {message}")]
    StorageError { message: String },
    #[error("Failed to parse manifest: {0}")]
    ManifestParseFailed(#[from] serde_json::Error),
    #[error("URL parsing failed: {0}")]
    UrlParseFailed(#[from] url::ParseError),
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
