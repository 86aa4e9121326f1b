//! Post-processing hooks run after each successful local transfer

use crate::domain::{Result, SyncError};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

/// A step run on every file written to a local destination
///
/// Hook failures are reported to the caller, which logs them; they never
/// turn a successful transfer into a failure.
#[async_trait]
pub trait PostProcessHook: Send + Sync {
    /// Run the hook on `path`
    async fn invoke(&self, path: &Path) -> Result<()>;

    /// Short description for logs
    fn describe(&self) -> String;
}

/// Runs an external command with the file path appended as its last argument
#[derive(Debug, Clone)]
pub struct CommandHook {
    program: String,
    args: Vec<String>,
}

impl CommandHook {
    /// Parse a shell-style command line
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the line has unbalanced quotes or no
    /// words.
    pub fn parse(command: &str) -> Result<Self> {
        let mut words = shell_words::split(command).map_err(|e| {
            SyncError::Configuration(format!("Invalid process command '{command}': {e}"))
        })?;

        if words.is_empty() {
            return Err(SyncError::Configuration(
                "Process command must not be empty".to_string(),
            ));
        }

        let program = words.remove(0);
        Ok(Self {
            program,
            args: words,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

#[async_trait]
impl PostProcessHook for CommandHook {
    async fn invoke(&self, path: &Path) -> Result<()> {
        tracing::debug!(command = %self.describe(), path = %path.display(), "Running process command");

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .output()
            .await
            .map_err(|e| SyncError::Other(format!("Failed to start '{}': {e}", self.program)))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(SyncError::Other(format!(
                "'{}' exited with {}: {}",
                self.describe(),
                output.status,
                stderr.trim()
            )))
        }
    }

    fn describe(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Parse every configured process command
pub fn parse_hooks(commands: &[String]) -> Result<Vec<CommandHook>> {
    commands.iter().map(|c| CommandHook::parse(c)).collect()
}
