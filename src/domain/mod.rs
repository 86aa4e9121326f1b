//! Domain models and types for granule-sync.
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`CollectionShortName`], [`ProviderId`], [`NativeId`])
//! - **Transfer candidates** ([`Candidate`], [`LinkKind`])
//! - **Error types** ([`SyncError`], [`SearchError`], [`TransferError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, SyncError>`]:
//!
//! ```rust
//! use granule_sync::domain::{CollectionShortName, Result, SyncError};
//!
//! fn example() -> Result<CollectionShortName> {
//!     CollectionShortName::new("MUR25-JPL-L4-GLOB-v04.2").map_err(SyncError::Validation)
//! }
//! ```

pub mod errors;
pub mod granule;
pub mod ids;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{SearchError, SyncError, TransferError};
pub use granule::{url_basename, Candidate, LinkKind};
pub use ids::{CollectionShortName, NativeId, ProviderId};
pub use result::Result;
