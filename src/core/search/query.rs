//! Granule search query construction
//!
//! Inputs are validated here, before any network call is made.

use crate::config::SecretString;
use crate::core::state::{format_utc, parse_utc, Checkpoint};
use crate::domain::ids::{CollectionShortName, ProviderId};
use crate::domain::{Result, SyncError};
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use std::fmt;
use std::str::FromStr;

/// Start of a temporal range when only an end is given
pub const TEMPORAL_SENTINEL: &str = "1900-01-01T00:00:00Z";

/// Catalog sort order, newest start date first
pub const SORT_KEY: &str = "-start_date";

/// Parse a `YYYY-MM-DDTHH:MM:SSZ` timestamp supplied by the user
///
/// `field` names the option in the error message.
pub fn parse_timestamp(text: &str, field: &str) -> Result<DateTime<Utc>> {
    parse_utc(text).ok_or_else(|| {
        SyncError::Validation(format!(
            "Error parsing '--{field}' date: {text}. Format must be like 2021-01-14T00:00:00Z"
        ))
    })
}

/// Spatial filter as West, South, East, North
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    /// The whole globe
    pub const GLOBAL: BoundingBox = BoundingBox {
        west: -180.0,
        south: -90.0,
        east: 180.0,
        north: 90.0,
    };
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::GLOBAL
    }
}

impl FromStr for BoundingBox {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            SyncError::Validation(format!(
                "Error parsing '--bounds': {s}. Format is W Longitude,S Latitude,E Longitude,N Latitude without spaces"
            ))
        };

        let values = s
            .split(',')
            .map(|part| part.trim().parse::<f64>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>>>()?;

        match values.as_slice() {
            [west, south, east, north] if values.iter().all(|v| v.is_finite()) => Ok(Self {
                west: *west,
                south: *south,
                east: *east,
                north: *north,
            }),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.west, self.south, self.east, self.north)
    }
}

/// Which granules a run asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchWindow {
    /// Granules whose temporal extent overlaps `[start, end]`
    Temporal {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// Granules added or updated since the checkpoint
    UpdatedSince(Checkpoint),
}

impl SearchWindow {
    /// Choose the window for a run
    ///
    /// Any explicit bound selects temporal mode: a missing end becomes
    /// `now` and a missing start becomes the 1900 sentinel. With no bounds
    /// the checkpoint is used.
    pub fn select(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        checkpoint: Checkpoint,
    ) -> Self {
        match (start, end) {
            (None, None) => SearchWindow::UpdatedSince(checkpoint),
            (start, end) => SearchWindow::Temporal {
                start: start.unwrap_or_else(sentinel),
                end: end.unwrap_or(now),
            },
        }
    }

    /// Whether an explicit temporal range is in use
    pub fn is_temporal(&self) -> bool {
        matches!(self, SearchWindow::Temporal { .. })
    }

    /// The query parameter this window contributes
    pub fn to_param(&self) -> (&'static str, String) {
        match self {
            SearchWindow::Temporal { start, end } => {
                ("temporal", format!("{},{}", format_utc(start), format_utc(end)))
            }
            SearchWindow::UpdatedSince(checkpoint) => ("updated_since", checkpoint.to_string()),
        }
    }
}

impl fmt::Display for SearchWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchWindow::Temporal { start, end } => {
                write!(f, "temporal {} to {}", format_utc(start), format_utc(end))
            }
            SearchWindow::UpdatedSince(checkpoint) => write!(f, "updated since {checkpoint}"),
        }
    }
}

fn sentinel() -> DateTime<Utc> {
    parse_utc(TEMPORAL_SENTINEL).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// A fully validated granule search
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub collection: CollectionShortName,
    pub provider: ProviderId,
    pub page_size: usize,
    pub bounding_box: BoundingBox,
    pub window: SearchWindow,
    pub token: Option<SecretString>,
}

impl SearchQuery {
    /// Build the query parameter list sent to `granules.umm_json`
    ///
    /// The pagination cursor is not a parameter; CMR takes it in the
    /// `CMR-Search-After` request header.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page_size", self.page_size.to_string()),
            ("sort_key", SORT_KEY.to_string()),
            ("provider", self.provider.to_string()),
            ("ShortName", self.collection.to_string()),
            ("bounding_box", self.bounding_box.to_string()),
        ];

        params.push(self.window.to_param());

        if let Some(token) = &self.token {
            params.push(("token", token.expose_secret().to_string()));
        }

        params
    }
}
