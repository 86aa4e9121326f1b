//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables hold ENV_MUTEX to avoid
//! interference between tests.

use granule_sync::config::{load_config, load_config_or_default, DestinationKind};
use granule_sync::core::layout::LayoutKind;
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    std::env::remove_var("GRANULE_SYNC_APPLICATION_LOG_LEVEL");
    std::env::remove_var("GRANULE_SYNC_SEARCH_MINUTES");
    std::env::remove_var("GRANULE_SYNC_SEARCH_EXTENSIONS");
    std::env::remove_var("GRANULE_SYNC_OUTPUT_LAYOUT");
    std::env::remove_var("GRANULE_SYNC_OUTPUT_PATH");
    std::env::remove_var("GRANULE_SYNC_TRANSFER_CONCURRENCY");
    std::env::remove_var("TEST_EARTHDATA_PASSWORD");
}

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[application]
log_level = "debug"
dry_run = true

[search]
collection = "JASON_CS_S6A_L2_ALT_LR_STD_OST_NRT_F"
provider = "POCLOUD"
bounding_box = "-10,-20,30,40"
start_date = "2021-01-01T00:00:00Z"
end_date = "2021-02-01T00:00:00Z"
minutes = 120
extensions = [".nc", ".bin"]

[cmr]
search_url = "https://cmr.uat.earthdata.nasa.gov/search/granules.umm_json"
page_size = 500
max_pages = 3
timeout_seconds = 30

[cmr.retry]
max_retries = 5
initial_delay_ms = 200
max_delay_ms = 5000
backoff_multiplier = 3.0

[earthdata]
username = "edl_user"
password = "edl_pass"

[output]
destination = "s3"
path = "s3://my-bucket/s6"
prefix = "nrt"
layout = "cycle"
offset_hours = 3
process_commands = ["gzip -k"]

[transfer]
timeout_seconds = 120
concurrency = 4

[logging]
local_enabled = false
local_path = "/tmp/granule-sync"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "debug");
    assert!(config.application.dry_run);
    assert_eq!(config.search.collection, "JASON_CS_S6A_L2_ALT_LR_STD_OST_NRT_F");
    assert_eq!(config.search.bounding_box, "-10,-20,30,40");
    assert_eq!(config.search.minutes, 120);
    assert_eq!(config.search.extensions, vec![".nc", ".bin"]);
    assert_eq!(config.cmr.page_size, 500);
    assert_eq!(config.cmr.max_pages, 3);
    assert_eq!(config.cmr.retry.max_retries, 5);
    assert_eq!(config.earthdata.username.as_deref(), Some("edl_user"));
    assert_eq!(
        config.earthdata.password.as_ref().unwrap().expose_secret().as_ref(),
        "edl_pass"
    );
    assert_eq!(config.output.destination, DestinationKind::S3);
    assert_eq!(config.output.layout, LayoutKind::Cycle);
    assert_eq!(config.output.offset_hours, 3);
    assert_eq!(config.transfer.concurrency, 4);
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_load_minimal_config_with_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[search]
collection = "MUR25-JPL-L4-GLOB-v04.2"

[output]
path = "/data/mur25"
"#,
    );

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.search.provider, "POCLOUD");
    assert_eq!(config.search.bounding_box, "-180,-90,180,90");
    assert_eq!(config.search.minutes, 60);
    assert_eq!(config.search.extensions, vec![".nc", ".h5", ".zip"]);
    assert!(config.search.start_date.is_none());
    assert_eq!(config.cmr.page_size, 2000);
    assert_eq!(config.cmr.max_pages, 1);
    assert_eq!(config.output.destination, DestinationKind::Local);
    assert_eq!(config.output.layout, LayoutKind::Flat);
    assert_eq!(config.transfer.concurrency, 1);
    assert!(!config.application.dry_run);
    assert!(config.earthdata.username.is_none());
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TEST_EARTHDATA_PASSWORD", "from-env");

    let file = write_config(
        r#"
[search]
collection = "MUR25-JPL-L4-GLOB-v04.2"

[earthdata]
username = "edl_user"
password = "${TEST_EARTHDATA_PASSWORD}"

[output]
# path = "${NOT_SET_BUT_COMMENTED}"
path = "/data/mur25"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(
        config.earthdata.password.as_ref().unwrap().expose_secret().as_ref(),
        "from-env"
    );

    cleanup_env_vars();
}

#[test]
fn test_missing_env_var_is_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[search]
collection = "MUR25-JPL-L4-GLOB-v04.2"

[earthdata]
password = "${TEST_EARTHDATA_PASSWORD}"

[output]
path = "/data/mur25"
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("TEST_EARTHDATA_PASSWORD"));
}

#[test]
fn test_env_var_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    std::env::set_var("GRANULE_SYNC_APPLICATION_LOG_LEVEL", "warn");
    std::env::set_var("GRANULE_SYNC_SEARCH_MINUTES", "15");
    std::env::set_var("GRANULE_SYNC_SEARCH_EXTENSIONS", ".nc, .h5");
    std::env::set_var("GRANULE_SYNC_OUTPUT_LAYOUT", "year_month_day");
    std::env::set_var("GRANULE_SYNC_TRANSFER_CONCURRENCY", "8");

    let file = write_config(
        r#"
[application]
log_level = "info"

[search]
collection = "MUR25-JPL-L4-GLOB-v04.2"
minutes = 60

[output]
path = "/data/mur25"
layout = "flat"
"#,
    );

    let config = load_config(file.path());
    cleanup_env_vars();
    let config = config.unwrap();

    assert_eq!(config.application.log_level, "warn");
    assert_eq!(config.search.minutes, 15);
    assert_eq!(config.search.extensions, vec![".nc", ".h5"]);
    assert_eq!(config.output.layout, LayoutKind::YearMonthDay);
    assert_eq!(config.transfer.concurrency, 8);
}

#[test]
fn test_defaults_without_file_use_env() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("GRANULE_SYNC_OUTPUT_PATH", "/data/from-env");

    let config = load_config_or_default(None);
    cleanup_env_vars();
    let config = config.unwrap();

    assert_eq!(config.output.path, "/data/from-env");
    // Not validated: the collection is still unset
    assert!(config.search.collection.is_empty());
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_config_validation() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let cases = [
        // bad bounding box
        r#"
[search]
collection = "MUR25-JPL-L4-GLOB-v04.2"
bounding_box = "0,0,10"
[output]
path = "/data"
"#,
        // start after end
        r#"
[search]
collection = "MUR25-JPL-L4-GLOB-v04.2"
start_date = "2021-02-01T00:00:00Z"
end_date = "2021-01-01T00:00:00Z"
[output]
path = "/data"
"#,
        // non-positive minutes
        r#"
[search]
collection = "MUR25-JPL-L4-GLOB-v04.2"
minutes = 0
[output]
path = "/data"
"#,
        // unknown layout
        r#"
[search]
collection = "MUR25-JPL-L4-GLOB-v04.2"
[output]
path = "/data"
layout = "weekly"
"#,
        // missing output path
        r#"
[search]
collection = "MUR25-JPL-L4-GLOB-v04.2"
"#,
    ];

    for content in cases {
        let file = write_config(content);
        assert!(
            load_config(file.path()).is_err(),
            "expected config to be rejected:\n{content}"
        );
    }
}
