//! Domain error types
//!
//! This module defines the error hierarchy for granule-sync. Errors fall into
//! four groups that drive how a run reacts:
//!
//! - configuration errors abort the run before any network call
//! - discovery errors ([`SearchError`]) abort the run and hold the checkpoint
//! - per-item transfer errors ([`TransferError`]) are aggregated, never raised
//! - checkpoint write errors are reported as warnings
//!
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main granule-sync error type
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Input validation errors (bounding box, dates, layout flags)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A catalog record lacks the attribute the selected layout needs
    #[error("Granule '{native_id}' has no {attribute}; it is required by the {layout} output layout")]
    MissingAttribute {
        native_id: String,
        attribute: &'static str,
        layout: &'static str,
    },

    /// Catalog search errors
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Transfer errors (download or upload of a single granule)
    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    /// Output path resolution errors
    #[error("Output path error: {0}")]
    OutputPath(String),

    /// Checkpoint state errors
    #[error("Checkpoint error: {0}")]
    State(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl SyncError {
    /// Whether this error belongs to the configuration class
    ///
    /// Configuration errors are raised before any transfer happens and map
    /// to exit code 2 at the CLI.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SyncError::Configuration(_)
                | SyncError::Validation(_)
                | SyncError::MissingAttribute { .. }
        )
    }

    /// Whether this error came from the catalog search call
    pub fn is_discovery(&self) -> bool {
        matches!(self, SyncError::Search(_))
    }
}

/// Catalog search errors
///
/// Errors that occur while querying the CMR granule search endpoint.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Failed to reach the search endpoint
    #[error("Failed to connect to catalog: {0}")]
    ConnectionFailed(String),

    /// Request timed out
    #[error("Search request timed out: {0}")]
    Timeout(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Invalid search response: {0}")]
    InvalidResponse(String),
}

impl SearchError {
    /// Whether the failed request is worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SearchError::ConnectionFailed(_)
                | SearchError::Timeout(_)
                | SearchError::ServerError { .. }
        )
    }
}

/// Transfer errors for a single granule
///
/// Object-storage uploads distinguish connection resets and HTTP status
/// failures from other causes for logging, but every variant is recorded as
/// the same per-item failure by the orchestrator.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Connection reset by the remote host while streaming
    #[error("Connection reset while fetching {url}: {message}")]
    ConnectionReset { url: String, message: String },

    /// Source returned a non-success status
    #[error("HTTP {status} while fetching {url}")]
    HttpStatus { url: String, status: u16 },

    /// Request timed out
    #[error("Timed out fetching {url}")]
    Timeout { url: String },

    /// Other network failure
    #[error("Request for {url} failed: {message}")]
    Request { url: String, message: String },

    /// Writing the destination failed
    #[error("Failed to write {target}: {message}")]
    Write { target: String, message: String },

    /// Object storage rejected the upload
    #[error("Object storage upload to {target} failed: {message}")]
    Storage { target: String, message: String },
}

impl TransferError {
    /// Short label for the failure cause, used as a structured log field
    pub fn cause_kind(&self) -> &'static str {
        match self {
            TransferError::ConnectionReset { .. } => "connection_reset",
            TransferError::HttpStatus { .. } => "http_status",
            TransferError::Timeout { .. } => "timeout",
            TransferError::Request { .. } => "request",
            TransferError::Write { .. } => "write",
            TransferError::Storage { .. } => "storage",
        }
    }

    /// Classify a reqwest error raised while fetching `url`
    pub fn from_request(url: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return TransferError::Timeout {
                url: url.to_string(),
            };
        }
        if let Some(status) = err.status() {
            return TransferError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            };
        }
        if is_connection_reset(err) {
            return TransferError::ConnectionReset {
                url: url.to_string(),
                message: err.to_string(),
            };
        }
        TransferError::Request {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

/// Walk the error source chain looking for an I/O connection reset
fn is_connection_reset(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::ConnectionReset {
                return true;
            }
        }
        source = e.source();
    }
    false
}

// Conversion from std::io::Error
impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::Configuration(format!("TOML parse error: {err}"))
    }
}
