//! Configuration schema types
//!
//! Every section has defaults so a run can be configured entirely from the
//! command line; the file only needs the values that differ.

use crate::config::SecretString;
use crate::core::layout::LayoutKind;
use crate::core::search::query::{parse_timestamp, BoundingBox};
use crate::domain::ids::CollectionShortName;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Where transferred granules and the checkpoint live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DestinationKind {
    /// Local directory
    #[default]
    Local,
    /// S3 bucket
    S3,
}

/// Main granule-sync configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SyncConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// What to search for
    #[serde(default)]
    pub search: SearchConfig,

    /// Catalog endpoint settings
    #[serde(default)]
    pub cmr: CmrConfig,

    /// Earthdata Login credentials
    #[serde(default)]
    pub earthdata: EarthdataConfig,

    /// Destination and directory layout
    #[serde(default)]
    pub output: OutputConfig,

    /// Transfer behaviour
    #[serde(default)]
    pub transfer: TransferConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SyncConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value found
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.search.validate()?;
        self.cmr.validate()?;
        self.output.validate()?;
        self.transfer.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Resolve targets without transferring or committing the checkpoint
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Search parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Collection short name
    #[serde(default)]
    pub collection: String,

    /// Catalog provider
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Bounding box as "W,S,E,N"
    #[serde(default = "default_bounding_box")]
    pub bounding_box: String,

    /// Explicit temporal range start (`YYYY-MM-DDTHH:MM:SSZ`)
    #[serde(default)]
    pub start_date: Option<String>,

    /// Explicit temporal range end (`YYYY-MM-DDTHH:MM:SSZ`)
    #[serde(default)]
    pub end_date: Option<String>,

    /// How far back the first run looks, in minutes
    #[serde(default = "default_minutes")]
    pub minutes: i64,

    /// File extensions to transfer; empty means the default list
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl SearchConfig {
    fn validate(&self) -> Result<(), String> {
        if self.collection.trim().is_empty() {
            return Err("search.collection cannot be empty".to_string());
        }
        CollectionShortName::from_str(&self.collection)?;

        if self.provider.trim().is_empty() {
            return Err("search.provider cannot be empty".to_string());
        }

        BoundingBox::from_str(&self.bounding_box).map_err(|e| e.to_string())?;

        let start = self
            .start_date
            .as_deref()
            .map(|s| parse_timestamp(s, "start-date"))
            .transpose()
            .map_err(|e| e.to_string())?;
        let end = self
            .end_date
            .as_deref()
            .map(|s| parse_timestamp(s, "end-date"))
            .transpose()
            .map_err(|e| e.to_string())?;
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(format!(
                    "search.start_date {} is after search.end_date {}",
                    start.format("%Y-%m-%dT%H:%M:%SZ"),
                    end.format("%Y-%m-%dT%H:%M:%SZ")
                ));
            }
        }

        if self.minutes <= 0 || self.minutes > MAX_MINUTES {
            return Err(format!(
                "search.minutes must be a positive integer no larger than {MAX_MINUTES}, got {}",
                self.minutes
            ));
        }

        if self.extensions.iter().any(|e| e.trim().is_empty()) {
            return Err("search.extensions cannot contain empty entries".to_string());
        }

        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            collection: String::new(),
            provider: default_provider(),
            bounding_box: default_bounding_box(),
            start_date: None,
            end_date: None,
            minutes: default_minutes(),
            extensions: default_extensions(),
        }
    }
}

/// Retry configuration for the search call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// CMR search endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmrConfig {
    /// Granule search URL returning UMM JSON
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// Results per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Maximum number of pages fetched per run
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Optional bearer token sent to CMR and with downloads
    #[serde(default)]
    pub token: Option<SecretString>,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl CmrConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.search_url.starts_with("http://") && !self.search_url.starts_with("https://") {
            return Err("cmr.search_url must start with http:// or https://".to_string());
        }

        if !(1..=2000).contains(&self.page_size) {
            return Err(format!(
                "cmr.page_size must be between 1 and 2000, got {}",
                self.page_size
            ));
        }

        if self.max_pages == 0 {
            return Err("cmr.max_pages must be at least 1".to_string());
        }

        if self.timeout_seconds == 0 {
            return Err("cmr.timeout_seconds must be greater than 0".to_string());
        }

        if self.retry.max_retries == 0 {
            return Err("cmr.retry.max_retries must be at least 1".to_string());
        }

        Ok(())
    }
}

impl Default for CmrConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            timeout_seconds: default_timeout_seconds(),
            token: None,
            retry: RetryConfig::default(),
        }
    }
}

/// Earthdata Login credentials
///
/// Sent as HTTP basic credentials on downloads. Both fields are optional;
/// public granules download without them.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EarthdataConfig {
    /// Earthdata username
    #[serde(default)]
    pub username: Option<String>,

    /// Earthdata password
    #[serde(default)]
    pub password: Option<SecretString>,
}

/// Destination and directory layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Local directory or S3 bucket
    #[serde(default)]
    pub destination: DestinationKind,

    /// Directory path (local) or bucket name, optionally `s3://`-prefixed (s3)
    #[serde(default)]
    pub path: String,

    /// Key prefix inside the bucket (s3 only)
    #[serde(default)]
    pub prefix: String,

    /// Directory layout
    #[serde(default)]
    pub layout: LayoutKind,

    /// Hours added to granule start times before deriving date directories
    #[serde(default)]
    pub offset_hours: i64,

    /// Commands run on every downloaded file, with the file path appended
    #[serde(default)]
    pub process_commands: Vec<String>,
}

impl OutputConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.trim().is_empty() {
            return Err("output.path cannot be empty".to_string());
        }

        if self.offset_hours.abs() > MAX_OFFSET_HOURS {
            return Err(format!(
                "output.offset_hours must be within +/-{MAX_OFFSET_HOURS}, got {}",
                self.offset_hours
            ));
        }

        for command in &self.process_commands {
            match shell_words::split(command) {
                Ok(words) if !words.is_empty() => {}
                Ok(_) => return Err("output.process_commands cannot contain empty commands".to_string()),
                Err(e) => {
                    return Err(format!(
                        "output.process_commands entry '{command}' cannot be parsed: {e}"
                    ))
                }
            }
        }

        Ok(())
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            destination: DestinationKind::Local,
            path: String::new(),
            prefix: String::new(),
            layout: LayoutKind::Flat,
            offset_hours: 0,
            process_commands: Vec::new(),
        }
    }
}

/// Transfer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Per-file timeout in seconds
    #[serde(default = "default_transfer_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Number of transfers in flight at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl TransferConfig {
    fn validate(&self) -> Result<(), String> {
        if self.timeout_seconds == 0 {
            return Err("transfer.timeout_seconds must be greater than 0".to_string());
        }
        if self.concurrency == 0 || self.concurrency > 32 {
            return Err(format!(
                "transfer.concurrency must be between 1 and 32, got {}",
                self.concurrency
            ));
        }
        Ok(())
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_transfer_timeout_seconds(),
            concurrency: default_concurrency(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write JSON logs to rotating files
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation policy (daily or hourly)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

/// One year of hours
const MAX_OFFSET_HOURS: i64 = 24 * 366;

/// A century of minutes
const MAX_MINUTES: i64 = 60 * 24 * 366 * 100;

/// Extensions transferred when none are configured
pub const DEFAULT_EXTENSIONS: [&str; 3] = [".nc", ".h5", ".zip"];

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_provider() -> String {
    "POCLOUD".to_string()
}

fn default_bounding_box() -> String {
    "-180,-90,180,90".to_string()
}

fn default_minutes() -> i64 {
    60
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

fn default_search_url() -> String {
    "https://cmr.earthdata.nasa.gov/search/granules.umm_json".to_string()
}

fn default_page_size() -> usize {
    2000
}

fn default_max_pages() -> usize {
    1
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_transfer_timeout_seconds() -> u64 {
    600
}

fn default_concurrency() -> usize {
    1
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> SyncConfig {
        let mut config = SyncConfig::default();
        config.search.collection = "MUR25-JPL-L4-GLOB-v04.2".to_string();
        config.output.path = "/tmp/granules".to_string();
        config
    }

    #[test]
    fn test_default_values() {
        let config = SyncConfig::default();
        assert_eq!(config.application.log_level, "info");
        assert_eq!(config.search.provider, "POCLOUD");
        assert_eq!(config.search.bounding_box, "-180,-90,180,90");
        assert_eq!(config.search.minutes, 60);
        assert_eq!(config.search.extensions, vec![".nc", ".h5", ".zip"]);
        assert_eq!(config.cmr.page_size, 2000);
        assert_eq!(config.cmr.max_pages, 1);
        assert_eq!(config.output.layout, LayoutKind::Flat);
        assert_eq!(config.output.destination, DestinationKind::Local);
        assert_eq!(config.transfer.concurrency, 1);
        assert!(!config.logging.local_enabled);
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_missing_collection_rejected() {
        let mut config = valid_config();
        config.search.collection = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.contains("search.collection"));
    }

    #[test]
    fn test_bad_bounding_box_rejected() {
        let mut config = valid_config();
        config.search.bounding_box = "-180,-90,180".to_string();
        assert!(config.validate().is_err());

        config.search.bounding_box = "-180,-90,180,north".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_dates_rejected() {
        let mut config = valid_config();
        config.search.start_date = Some("2021-01-14".to_string());
        assert!(config.validate().is_err());

        config.search.start_date = Some("2021-02-01T00:00:00Z".to_string());
        config.search.end_date = Some("2021-01-01T00:00:00Z".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.contains("after"));
    }

    #[test]
    fn test_minutes_must_be_positive() {
        let mut config = valid_config();
        config.search.minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_page_size_bounds() {
        let mut config = valid_config();
        config.cmr.page_size = 0;
        assert!(config.validate().is_err());
        config.cmr.page_size = 2001;
        assert!(config.validate().is_err());
        config.cmr.page_size = 2000;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_output_path_required() {
        let mut config = valid_config();
        config.output.path = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_process_command_must_parse() {
        let mut config = valid_config();
        config.output.process_commands = vec!["gzip -9".to_string()];
        assert!(config.validate().is_ok());

        config.output.process_commands = vec!["echo 'unterminated".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = valid_config();
        config.application.log_level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_layout_deserialization() {
        let output: OutputConfig = toml::from_str(
            r#"
path = "/data"
layout = "year_doy"
offset_hours = -5
"#,
        )
        .unwrap();
        assert_eq!(output.layout, LayoutKind::YearDayOfYear);
        assert_eq!(output.offset_hours, -5);
    }
}
