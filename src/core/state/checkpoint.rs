//! Checkpoint timestamp for incremental synchronization
//!
//! A checkpoint records when the last fully successful run searched the
//! catalog. The next run asks only for granules updated since then.

use crate::domain::{Result, SyncError};
use chrono::{DateTime, Duration, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Textual layout of checkpoints and search timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parse a `YYYY-MM-DDTHH:MM:SSZ` timestamp, returning `None` on mismatch
pub fn parse_utc(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Format a timestamp as `YYYY-MM-DDTHH:MM:SSZ`
pub fn format_utc(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Start time of the last committed run, with whole-second precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Checkpoint(DateTime<Utc>);

impl Checkpoint {
    /// Create a checkpoint, truncating to whole seconds
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self(timestamp.trunc_subsecs(0))
    }

    /// The default used on a first run: `now` minus `minutes`
    pub fn window_default(now: DateTime<Utc>, minutes: i64) -> Self {
        Self::new(now - Duration::minutes(minutes))
    }

    /// Parse the persisted form
    ///
    /// Surrounding whitespace is ignored. Anything else that does not match
    /// `YYYY-MM-DDTHH:MM:SSZ` is a state error.
    pub fn parse(text: &str) -> Result<Self> {
        parse_utc(text).map(Self).ok_or_else(|| {
            SyncError::State(format!(
                "Checkpoint '{}' is not a timestamp of the form YYYY-MM-DDTHH:MM:SSZ",
                text.trim()
            ))
        })
    }

    /// The checkpoint instant
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.0
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_utc(&self.0))
    }
}
