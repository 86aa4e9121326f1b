//! Logging and observability
//!
//! Structured logging through `tracing`, with console output and optional
//! rotating JSON log files.
//!
//! # Example
//!
//! ```no_run
//! use granule_sync::logging::init_logging;
//! use granule_sync::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log a successful transfer
///
/// # Example
///
/// ```no_run
/// use granule_sync::log_transfer_success;
/// use std::time::Duration;
///
/// log_transfer_success!("https://host/g1.nc", "/data/g1.nc", 1024u64, Duration::from_millis(250));
/// ```
#[macro_export]
macro_rules! log_transfer_success {
    ($url:expr, $target:expr, $bytes:expr, $duration:expr) => {
        tracing::info!(
            url = %$url,
            target = %$target,
            bytes = $bytes,
            duration_ms = $duration.as_millis() as u64,
            "SUCCESS: {}",
            $url
        );
    };
}

/// Log a failed transfer
///
/// # Example
///
/// ```no_run
/// use granule_sync::log_transfer_failure;
///
/// log_transfer_failure!("https://host/g1.nc", "http_status", "HTTP 404");
/// ```
#[macro_export]
macro_rules! log_transfer_failure {
    ($url:expr, $cause_kind:expr, $error:expr) => {
        tracing::error!(
            url = %$url,
            cause = $cause_kind,
            error = %$error,
            "FAILURE: {}",
            $url
        );
    };
}

/// Log an error with context
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    #[test]
    fn test_macros_expand_without_subscriber() {
        log_transfer_success!("https://host/g1.nc", "/tmp/g1.nc", 10u64, Duration::from_millis(5));
        log_transfer_failure!("https://host/g2.nc", "timeout", "timed out");
        log_error_with_context!("boom", "testing");
    }
}
