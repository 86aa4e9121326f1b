//! HTTP download tests against a mock archive

use granule_sync::adapters::destination::{HttpDownloader, Transfer, TransferTarget};
use granule_sync::adapters::earthdata::EarthdataSession;
use granule_sync::config::{secret_string, EarthdataConfig};
use granule_sync::domain::TransferError;
use std::time::Duration;
use tempfile::TempDir;

fn downloader(username: Option<&str>, password: Option<&str>) -> HttpDownloader {
    let config = EarthdataConfig {
        username: username.map(str::to_string),
        password: password.map(|p| secret_string(p.to_string())),
    };
    let session = EarthdataSession::new(&config, None, Duration::from_secs(5)).unwrap();
    HttpDownloader::new(session)
}

#[tokio::test]
async fn test_download_writes_file() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/data/g1.nc")
        .with_status(200)
        .with_body("granule bytes")
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("g1.nc");
    let url = format!("{}/data/g1.nc", server.url());

    let bytes = downloader(None, None)
        .transfer(&url, &TransferTarget::Local(path.clone()))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(bytes, 13);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "granule bytes");
    assert!(!dir.path().join("g1.nc.part").exists());
}

#[tokio::test]
async fn test_download_sends_basic_auth() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/data/g1.nc")
        .match_header("authorization", "Basic dXNlcjpwYXNz")
        .with_status(200)
        .with_body("ok")
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let url = format!("{}/data/g1.nc", server.url());

    downloader(Some("user"), Some("pass"))
        .transfer(&url, &TransferTarget::Local(dir.path().join("g1.nc")))
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_http_error_leaves_no_file() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/data/missing.nc")
        .with_status(404)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.nc");
    let url = format!("{}/data/missing.nc", server.url());

    let err = downloader(None, None)
        .transfer(&url, &TransferTarget::Local(path.clone()))
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::HttpStatus { status: 404, .. }));
    assert_eq!(err.cause_kind(), "http_status");
    assert!(!path.exists());
    assert!(!dir.path().join("missing.nc.part").exists());
}

#[tokio::test]
async fn test_unwritable_target_is_write_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/data/g1.nc")
        .with_status(200)
        .with_body("granule bytes")
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no-such-dir").join("g1.nc");
    let url = format!("{}/data/g1.nc", server.url());

    let err = downloader(None, None)
        .transfer(&url, &TransferTarget::Local(path))
        .await
        .unwrap_err();

    assert_eq!(err.cause_kind(), "write");
}

#[tokio::test]
async fn test_object_target_is_rejected() {
    let target = TransferTarget::Object {
        bucket: "bucket".to_string(),
        key: "g1.nc".to_string(),
    };

    let err = downloader(None, None)
        .transfer("https://archive.example.com/g1.nc", &target)
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::Write { .. }));
}
