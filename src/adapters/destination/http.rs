//! HTTP download to local files

use super::traits::{Transfer, TransferTarget};
use crate::adapters::earthdata::EarthdataSession;
use crate::domain::TransferError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Downloads granules into local files
///
/// The body is streamed to `<target>.part` and renamed into place once it
/// is complete, so an interrupted download never leaves a truncated file
/// under the final name.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    session: EarthdataSession,
}

impl HttpDownloader {
    pub fn new(session: EarthdataSession) -> Self {
        Self { session }
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

/// Fetch `url` and return the response once its status is successful
pub(crate) async fn fetch(
    session: &EarthdataSession,
    url: &str,
) -> Result<reqwest::Response, TransferError> {
    let resp = session
        .get(url)
        .send()
        .await
        .map_err(|e| TransferError::from_request(url, &e))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(TransferError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(resp)
}

/// Stream a successful response body into `path`, returning the byte count
pub(crate) async fn stream_to_file(
    mut resp: reqwest::Response,
    url: &str,
    path: &Path,
) -> Result<u64, TransferError> {
    let write_err = |e: std::io::Error| TransferError::Write {
        target: path.display().to_string(),
        message: e.to_string(),
    };

    let mut file = tokio::fs::File::create(path).await.map_err(write_err)?;
    let mut bytes = 0u64;

    while let Some(chunk) = resp
        .chunk()
        .await
        .map_err(|e| TransferError::from_request(url, &e))?
    {
        file.write_all(&chunk).await.map_err(write_err)?;
        bytes += chunk.len() as u64;
    }

    file.flush().await.map_err(write_err)?;
    file.sync_all().await.map_err(write_err)?;
    Ok(bytes)
}

#[async_trait]
impl Transfer for HttpDownloader {
    async fn transfer(&self, url: &str, target: &TransferTarget) -> Result<u64, TransferError> {
        let path = target.local_path().ok_or_else(|| TransferError::Write {
            target: target.to_string(),
            message: "HTTP downloads can only be written to local files".to_string(),
        })?;

        let resp = fetch(&self.session, url).await?;
        let part = partial_path(path);

        match stream_to_file(resp, url, &part).await {
            Ok(bytes) => {
                tokio::fs::rename(&part, path)
                    .await
                    .map_err(|e| TransferError::Write {
                        target: path.display().to_string(),
                        message: e.to_string(),
                    })?;
                Ok(bytes)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&part).await;
                Err(e)
            }
        }
    }
}
