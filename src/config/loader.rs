//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{DestinationKind, SyncConfig};
use super::secret::secret_string;
use crate::core::layout::LayoutKind;
use crate::domain::errors::SyncError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads and validates configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into SyncConfig
/// 4. Applies environment variable overrides (GRANULE_SYNC_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a referenced
/// environment variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use granule_sync::config::loader::load_config;
///
/// let config = load_config("granule-sync.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SyncConfig> {
    let config = read_config(path)?;
    validate_config(&config)?;
    Ok(config)
}

/// Loads configuration without validating it
///
/// Used by the CLI, which layers command-line flags over the file before
/// validating. With no path the defaults are used; environment overrides
/// are applied either way.
pub fn load_config_or_default(path: Option<&Path>) -> Result<SyncConfig> {
    match path {
        Some(path) => read_config(path),
        None => {
            let mut config = SyncConfig::default();
            apply_env_overrides(&mut config)?;
            Ok(config)
        }
    }
}

/// Validates a fully assembled configuration
pub fn validate_config(config: &SyncConfig) -> Result<()> {
    config
        .validate()
        .map_err(|e| SyncError::Configuration(format!("Configuration validation failed: {e}")))
}

fn read_config(path: impl AsRef<Path>) -> Result<SyncConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SyncError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SyncError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: SyncConfig = toml::from_str(&contents)
        .map_err(|e| SyncError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| SyncError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        // Comments are copied as-is
        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(SyncError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        SyncError::Configuration(format!("Environment variable {name} has invalid value '{value}'"))
    })
}

/// Applies environment variable overrides using the GRANULE_SYNC_* prefix
///
/// Environment variables follow the pattern `GRANULE_SYNC_<SECTION>_<KEY>`,
/// for example `GRANULE_SYNC_SEARCH_COLLECTION` or
/// `GRANULE_SYNC_EARTHDATA_PASSWORD`.
fn apply_env_overrides(config: &mut SyncConfig) -> Result<()> {
    const P: &str = "GRANULE_SYNC";
    let var = |key: &str| std::env::var(format!("{P}_{key}")).ok();

    // Application overrides
    if let Some(val) = var("APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = var("APPLICATION_DRY_RUN") {
        config.application.dry_run = parse_env("GRANULE_SYNC_APPLICATION_DRY_RUN", &val)?;
    }

    // Search overrides
    if let Some(val) = var("SEARCH_COLLECTION") {
        config.search.collection = val;
    }
    if let Some(val) = var("SEARCH_PROVIDER") {
        config.search.provider = val;
    }
    if let Some(val) = var("SEARCH_BOUNDING_BOX") {
        config.search.bounding_box = val;
    }
    if let Some(val) = var("SEARCH_START_DATE") {
        config.search.start_date = Some(val);
    }
    if let Some(val) = var("SEARCH_END_DATE") {
        config.search.end_date = Some(val);
    }
    if let Some(val) = var("SEARCH_MINUTES") {
        config.search.minutes = parse_env("GRANULE_SYNC_SEARCH_MINUTES", &val)?;
    }
    if let Some(val) = var("SEARCH_EXTENSIONS") {
        config.search.extensions = val
            .split(',')
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
    }

    // CMR overrides
    if let Some(val) = var("CMR_SEARCH_URL") {
        config.cmr.search_url = val;
    }
    if let Some(val) = var("CMR_PAGE_SIZE") {
        config.cmr.page_size = parse_env("GRANULE_SYNC_CMR_PAGE_SIZE", &val)?;
    }
    if let Some(val) = var("CMR_MAX_PAGES") {
        config.cmr.max_pages = parse_env("GRANULE_SYNC_CMR_MAX_PAGES", &val)?;
    }
    if let Some(val) = var("CMR_TOKEN") {
        config.cmr.token = Some(secret_string(val));
    }

    // Earthdata overrides
    if let Some(val) = var("EARTHDATA_USERNAME") {
        config.earthdata.username = Some(val);
    }
    if let Some(val) = var("EARTHDATA_PASSWORD") {
        config.earthdata.password = Some(secret_string(val));
    }

    // Output overrides
    if let Some(val) = var("OUTPUT_DESTINATION") {
        config.output.destination = match val.to_lowercase().as_str() {
            "local" => DestinationKind::Local,
            "s3" => DestinationKind::S3,
            other => {
                return Err(SyncError::Configuration(format!(
                    "GRANULE_SYNC_OUTPUT_DESTINATION must be 'local' or 's3', got '{other}'"
                )))
            }
        };
    }
    if let Some(val) = var("OUTPUT_PATH") {
        config.output.path = val;
    }
    if let Some(val) = var("OUTPUT_PREFIX") {
        config.output.prefix = val;
    }
    if let Some(val) = var("OUTPUT_LAYOUT") {
        config.output.layout = val.parse::<LayoutKind>().map_err(SyncError::Configuration)?;
    }
    if let Some(val) = var("OUTPUT_OFFSET_HOURS") {
        config.output.offset_hours = parse_env("GRANULE_SYNC_OUTPUT_OFFSET_HOURS", &val)?;
    }

    // Transfer overrides
    if let Some(val) = var("TRANSFER_TIMEOUT_SECONDS") {
        config.transfer.timeout_seconds = parse_env("GRANULE_SYNC_TRANSFER_TIMEOUT_SECONDS", &val)?;
    }
    if let Some(val) = var("TRANSFER_CONCURRENCY") {
        config.transfer.concurrency = parse_env("GRANULE_SYNC_TRANSFER_CONCURRENCY", &val)?;
    }

    // Logging overrides
    if let Some(val) = var("LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_env("GRANULE_SYNC_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = var("LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = var("LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("GS_LOADER_TEST_VAR", "test_value");
        let input = "password = \"${GS_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result.trim_end(), "password = \"test_value\"");
        std::env::remove_var("GS_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("GS_LOADER_MISSING_VAR");
        let input = "password = \"${GS_LOADER_MISSING_VAR}\"";
        let result = substitute_env_vars(input);
        assert!(result.is_err());
    }

    #[test]
    fn test_substitute_skips_comments() {
        std::env::remove_var("GS_LOADER_COMMENTED");
        let input = "# token = \"${GS_LOADER_COMMENTED}\"\nminutes = 5";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${GS_LOADER_COMMENTED}"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-granule-sync.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[search]
collection = "JASON_CS_S6A_L2_ALT_LR_RED_OST_NRT_F"
bounding_box = "-10,-10,10,10"
minutes = 30

[cmr]
token = "edl-token"

[output]
path = "/tmp/granules"
layout = "cycle"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.search.collection, "JASON_CS_S6A_L2_ALT_LR_RED_OST_NRT_F");
        assert_eq!(config.search.minutes, 30);
        assert_eq!(config.output.layout, LayoutKind::Cycle);
        assert_eq!(
            config.cmr.token.as_ref().unwrap().expose_secret().as_ref(),
            "edl-token"
        );
    }

    #[test]
    fn test_load_config_invalid_fails_validation() {
        let toml_content = r#"
[search]
collection = "MUR25-JPL-L4-GLOB-v04.2"
bounding_box = "1,2,3"

[output]
path = "/tmp/granules"
"#;
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let err = load_config(temp_file.path()).unwrap_err();
        assert!(err.is_configuration());
    }
}
