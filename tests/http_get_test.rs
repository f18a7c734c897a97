use extlib::net::http_get;
use extlib::ExtError;
use httpmock::prelude::*;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn test_download_binary_body() {
    let server = MockServer::start();
    let body: Vec<u8> = (0..=255u8).cycle().take(64 * 1024).collect();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/files/blob.bin");
        then.status(200)
            .header("Content-Type", "application/octet-stream")
            .body(body.clone());
    });

    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path().join("blob.bin");
    let saved = http_get(&server.url("/files/blob.bin"), Some(&dest), Duration::from_secs(5))
        .await
        .unwrap();

    api_mock.assert();
    assert_eq!(saved, dest);
    assert_eq!(std::fs::read(&dest).unwrap(), body);
}

#[tokio::test]
async fn test_server_error_is_reported_with_severity() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/broken");
        then.status(500);
    });

    let temp_dir = TempDir::new().unwrap();
    let dest = temp_dir.path().join("broken");
    let err = http_get(&server.url("/broken"), Some(&dest), Duration::from_secs(5))
        .await
        .unwrap_err();

    match &err {
        ExtError::HttpStatus { status, url } => {
            assert_eq!(*status, 500);
            assert!(url.ends_with("/broken"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(
        err.severity(),
        extlib::utils::error::ErrorSeverity::Medium
    );
    assert!(!dest.exists());
}
