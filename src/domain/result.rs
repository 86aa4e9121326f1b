//! Result type alias for granule-sync

use super::errors::SyncError;

/// Result type alias for granule-sync operations
///
/// # Examples
///
/// ```
/// use granule_sync::domain::result::Result;
/// use granule_sync::domain::errors::SyncError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(SyncError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, SyncError>;
