//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod init;
pub mod status;
pub mod sync;
pub mod validate;

use crate::config::{load_config_or_default, SyncConfig};
use crate::domain::Result;
use std::path::Path;

/// Load the configuration file if one was given, defaults otherwise
pub(crate) fn load_optional(config_path: Option<&str>) -> Result<SyncConfig> {
    load_config_or_default(config_path.map(Path::new))
}
