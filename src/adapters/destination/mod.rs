//! Destination adapters
//!
//! A destination stores the checkpoint and receives transferred granules:
//! a local directory (downloaded over HTTP) or, with the `s3` feature, an
//! S3 bucket.

pub mod factory;
pub mod http;
pub mod local;
#[cfg(feature = "s3")]
pub mod s3;
pub mod traits;

pub use factory::{check_destination_supported, create_destination, DestinationHandles};
pub use http::HttpDownloader;
pub use local::LocalDirectory;
pub use traits::{CheckpointStore, Destination, Transfer, TransferTarget, CHECKPOINT_NAME};
