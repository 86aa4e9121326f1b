//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for granule-sync using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Granule Sync - incremental CMR granule subscriber
#[derive(Parser, Debug)]
#[command(name = "granule-sync")]
#[command(version, about, long_about = None)]
#[command(author = "Granule Sync Contributors")]
pub struct Cli {
    /// Path to configuration file (defaults plus flags are used without one)
    #[arg(short = 'C', long, env = "GRANULE_SYNC_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "GRANULE_SYNC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log level from `--log-level`, `sync --verbose`, or the configured
    /// `application.log_level`
    pub fn effective_log_level<'a>(&'a self, configured: &'a str) -> &'a str {
        if let Some(level) = self.log_level.as_deref() {
            return level;
        }
        match &self.command {
            Commands::Sync(args) if args.verbose => "debug",
            _ => configured,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sync new granules to the destination
    Sync(commands::sync::SyncArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show the destination checkpoint
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_sync() {
        let cli = Cli::parse_from(["granule-sync", "sync"]);
        assert!(cli.config.is_none());
        assert!(matches!(cli.command, Commands::Sync(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["granule-sync", "--config", "custom.toml", "sync"]);
        assert_eq!(cli.config.as_deref(), Some("custom.toml"));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["granule-sync", "--log-level", "warn", "sync", "--verbose"]);
        assert_eq!(cli.effective_log_level("error"), "warn");
    }

    #[test]
    fn test_verbose_maps_to_debug() {
        let cli = Cli::parse_from(["granule-sync", "sync", "--verbose"]);
        assert_eq!(cli.effective_log_level("info"), "debug");
    }

    #[test]
    fn test_configured_level_is_the_fallback() {
        let cli = Cli::parse_from(["granule-sync", "status"]);
        assert_eq!(cli.effective_log_level("warn"), "warn");

        let cli = Cli::parse_from(["granule-sync", "sync"]);
        assert_eq!(cli.effective_log_level("error"), "error");
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["granule-sync", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["granule-sync", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
