//! One-shot CLI that uploads the images in `./images` to a MinIO bucket and
//! records their public URLs in `./images.json`.
//!
//! Connection parameters come from the environment (or a `.env` file):
//! `MINIO_ENDPOINT`, `MINIO_ACCESS_KEY`, `MINIO_SECRET_KEY`, `MINIO_BUCKET`.
//!
//! Exits 0 on completion, including "nothing to do" and partial upload
//! failures; exits 1 when configuration is missing, the images folder is
//! absent, or a fatal error occurs. Failed files can be retried by simply
//! running the tool again.

use std::path::Path;
use std::process::ExitCode;

use image_sync::reconciler::Reconciler;
use image_sync::store::S3Store;
use image_sync::StorageConfig;

const IMAGES_DIR: &str = "images";
const MANIFEST_FILE: &str = "images.json";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    println!("=== MinIO Image Uploader ===\n");

    let config = match StorageConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            eprintln!(
                "Required: MINIO_ENDPOINT, MINIO_ACCESS_KEY, MINIO_SECRET_KEY, MINIO_BUCKET"
            );
            return ExitCode::FAILURE;
        }
    };

    let store = S3Store::new(&config);
    let reconciler = Reconciler::new(&store, &config);

    let summary = match reconciler
        .run(Path::new(IMAGES_DIR), Path::new(MANIFEST_FILE))
        .await
    {
        Ok(summary) => summary,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    println!("\n=== Upload Summary ===");
    println!("Total images: {}", summary.total);
    println!("Successfully uploaded: {}", summary.uploaded);
    println!("Already uploaded (skipped): {}", summary.skipped);
    println!("Failed: {}", summary.failed());

    if let Some(err) = &summary.manifest_error {
        eprintln!("\nFailed to save {}: {}", MANIFEST_FILE, err);
    }

    if !summary.failures.is_empty() {
        println!("\nFailed uploads:");
        for failure in &summary.failures {
            println!("  - {}: {}", failure.filename, failure.error);
        }
        println!("\nTo retry failed uploads, simply run the tool again.");
    }

    println!("\nDone!");
    ExitCode::SUCCESS
}
