//! Transfer candidates extracted from catalog search results

use super::ids::NativeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification of a related link on a granule record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// Primary data file (`GET DATA`)
    Data,
    /// Extended metadata sidecar (`EXTENDED METADATA`)
    Metadata,
}

/// One discoverable remote file pending filtering and transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Download URL
    pub url: String,

    /// Native id of the granule record the link belongs to
    pub native_id: NativeId,

    /// Granule start time, present when a time-based layout is active
    pub start_time: Option<DateTime<Utc>>,

    /// Cycle number, present when the cycle layout is active
    pub cycle: Option<String>,

    /// Data or metadata link
    pub kind: LinkKind,
}

impl Candidate {
    /// Create a candidate with no layout attributes
    pub fn new(url: impl Into<String>, native_id: NativeId, kind: LinkKind) -> Self {
        Self {
            url: url.into(),
            native_id,
            start_time: None,
            cycle: None,
            kind,
        }
    }

    /// Set the start time
    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// Set the cycle number
    pub fn with_cycle(mut self, cycle: impl Into<String>) -> Self {
        self.cycle = Some(cycle.into());
        self
    }

    /// Final path segment of the URL, ignoring any query string
    pub fn file_name(&self) -> &str {
        url_basename(&self.url)
    }
}

/// Final path segment of a URL, ignoring query string and fragment
///
/// A URL ending in `/` has an empty final segment.
pub fn url_basename(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let path = &url[..end];
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}
