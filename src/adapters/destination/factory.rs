//! Destination factory
//!
//! This module builds the checkpoint store, target mapping and transfer
//! backend that match the configured destination.

use super::http::HttpDownloader;
use super::local::LocalDirectory;
use super::traits::{CheckpointStore, Destination, Transfer};
use crate::adapters::earthdata::EarthdataSession;
use crate::config::{DestinationKind, OutputConfig};
use crate::domain::{Result, SyncError};
use std::sync::Arc;

/// The three faces of a configured destination
#[derive(Clone)]
pub struct DestinationHandles {
    pub store: Arc<dyn CheckpointStore + Send + Sync>,
    pub destination: Arc<dyn Destination + Send + Sync>,
    pub transfer: Arc<dyn Transfer + Send + Sync>,
}

/// Create the destination backends for the configuration
///
/// # Errors
///
/// Returns an error if the destination cannot be initialized, or if S3 is
/// requested in a build without the `s3` feature.
pub async fn create_destination(
    config: &OutputConfig,
    session: EarthdataSession,
) -> Result<DestinationHandles> {
    match config.destination {
        DestinationKind::Local => {
            tracing::info!(path = %config.path, "Using local destination");
            let local = Arc::new(LocalDirectory::new(&config.path));
            Ok(DestinationHandles {
                store: local.clone(),
                destination: local,
                transfer: Arc::new(HttpDownloader::new(session)),
            })
        }
        DestinationKind::S3 => create_s3(config, session).await,
    }
}

#[cfg(feature = "s3")]
async fn create_s3(config: &OutputConfig, session: EarthdataSession) -> Result<DestinationHandles> {
    use super::s3::{S3Bucket, S3Uploader};

    let bucket = Arc::new(S3Bucket::connect(&config.path, &config.prefix).await?);
    tracing::info!(location = %Destination::location(bucket.as_ref()), "Using S3 destination");
    let uploader = S3Uploader::new(session, bucket.client());
    Ok(DestinationHandles {
        store: bucket.clone(),
        destination: bucket,
        transfer: Arc::new(uploader),
    })
}

#[cfg(not(feature = "s3"))]
async fn create_s3(
    _config: &OutputConfig,
    _session: EarthdataSession,
) -> Result<DestinationHandles> {
    Err(SyncError::Configuration(
        "S3 destinations require granule-sync to be built with the 's3' feature".to_string(),
    ))
}

/// Reject destinations that cannot be used in this build
pub fn check_destination_supported(kind: DestinationKind) -> Result<()> {
    if kind == DestinationKind::S3 && !cfg!(feature = "s3") {
        return Err(SyncError::Configuration(
            "S3 destinations require granule-sync to be built with the 's3' feature".to_string(),
        ));
    }
    Ok(())
}
