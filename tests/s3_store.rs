use image_sync::store::{public_url, ObjectStore, S3Store};
use image_sync::{Manifest, Reconciler, StorageConfig, SyncError};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> StorageConfig {
    StorageConfig::new(
        &server.uri(),
        "test-access".into(),
        "test-secret".into(),
        "photos".into(),
    )
    .unwrap()
}

#[tokio::test]
async fn put_object_sends_one_signed_put_with_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/photos/u-cat.png"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let store = S3Store::new(&config_for(&server));
    store
        .put_object("u-cat.png", b"png bytes".to_vec(), "image/png")
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.body, b"png bytes");
    assert_eq!(
        request.headers.get("content-type").unwrap(),
        "image/png"
    );
    assert_eq!(request.headers.get("content-length").unwrap(), "9");
}

#[tokio::test]
async fn server_error_surfaces_as_storage_error_without_sdk_retries() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = S3Store::new(&config_for(&server));
    let result = store
        .put_object("u-cat.png", b"png bytes".to_vec(), "image/png")
        .await;

    assert!(matches!(result, Err(SyncError::StorageError { .. })));
    // The retry budget belongs to the reconciler; the SDK must not add its own.
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn reconciler_uploads_through_a_real_bucket_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/photos/[0-9a-f-]{36}-cat\.jpg$"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let images = dir.path().join("images");
    std::fs::create_dir(&images).unwrap();
    std::fs::write(images.join("cat.jpg"), b"jpeg bytes").unwrap();
    let manifest_path = dir.path().join("images.json");

    let config = config_for(&server);
    let store = S3Store::new(&config);
    let summary = Reconciler::new(&store, &config)
        .run(&images, &manifest_path)
        .await
        .unwrap();

    assert_eq!(summary.uploaded, 1);
    assert_eq!(summary.failed(), 0);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let object_name = requests[0].url.path().trim_start_matches("/photos/").to_string();

    let manifest = Manifest::load(&manifest_path).await;
    assert_eq!(
        manifest.get("cat"),
        Some(public_url(&config, &object_name).as_str())
    );
}
