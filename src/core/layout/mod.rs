//! Output path resolution
//!
//! A [`LayoutKind`] is chosen once per run. The [`OutputResolver`] then maps
//! each download URL to a [`RelativeTarget`] below the destination root,
//! using the per-granule start times or cycle numbers collected during
//! extraction.
//!
//! # Example
//!
//! ```rust
//! use granule_sync::core::layout::{AttributeTables, LayoutKind, OutputResolver};
//!
//! let resolver = OutputResolver::new(LayoutKind::Flat, 0, AttributeTables::default());
//! let target = resolver.resolve("https://archive.example.com/data/g1.nc").unwrap();
//! assert_eq!(target.to_string(), "g1.nc");
//! ```

pub mod cycle;
pub mod temporal;

use crate::domain::ids::strip_extension;
use crate::domain::{url_basename, Result, SyncError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Directory layout below the destination root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    /// `root/<file>`
    #[default]
    Flat,
    /// `root/YYYY/DDD/<file>`
    #[serde(rename = "year_doy")]
    YearDayOfYear,
    /// `root/YYYY/MM/DD/<file>`
    YearMonthDay,
    /// `root/YYYY/<file>`
    Year,
    /// `root/cNNNN/<file>`
    Cycle,
}

/// Granule attribute a layout depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredAttribute {
    None,
    StartTime,
    Cycle,
}

impl LayoutKind {
    /// Configuration name of the layout
    pub fn name(&self) -> &'static str {
        match self {
            LayoutKind::Flat => "flat",
            LayoutKind::YearDayOfYear => "year_doy",
            LayoutKind::YearMonthDay => "year_month_day",
            LayoutKind::Year => "year",
            LayoutKind::Cycle => "cycle",
        }
    }

    /// Granule attribute the layout needs from every catalog record
    pub fn required_attribute(&self) -> RequiredAttribute {
        match self {
            LayoutKind::Flat => RequiredAttribute::None,
            LayoutKind::YearDayOfYear | LayoutKind::YearMonthDay | LayoutKind::Year => {
                RequiredAttribute::StartTime
            }
            LayoutKind::Cycle => RequiredAttribute::Cycle,
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayoutKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "flat" => Ok(LayoutKind::Flat),
            "year_doy" => Ok(LayoutKind::YearDayOfYear),
            "year_month_day" => Ok(LayoutKind::YearMonthDay),
            "year" => Ok(LayoutKind::Year),
            "cycle" => Ok(LayoutKind::Cycle),
            other => Err(format!(
                "Unknown layout '{other}'. Must be one of: flat, year_doy, year_month_day, year, cycle"
            )),
        }
    }
}

/// Layout selection flags from the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutFlags {
    pub cycle: bool,
    pub year_doy: bool,
    pub year_month_day: bool,
    pub year: bool,
}

impl LayoutFlags {
    /// The layout the flags select, if any
    ///
    /// # Errors
    ///
    /// Setting more than one flag is a validation error.
    pub fn select(&self) -> Result<Option<LayoutKind>> {
        let set: Vec<(&str, LayoutKind)> = [
            (self.cycle, "--dc", LayoutKind::Cycle),
            (self.year_doy, "--dydoy", LayoutKind::YearDayOfYear),
            (self.year_month_day, "--dymd", LayoutKind::YearMonthDay),
            (self.year, "--dy", LayoutKind::Year),
        ]
        .into_iter()
        .filter(|(on, _, _)| *on)
        .map(|(_, flag, kind)| (flag, kind))
        .collect();

        match set.as_slice() {
            [] => Ok(None),
            [(_, kind)] => Ok(Some(*kind)),
            many => Err(SyncError::Validation(format!(
                "Only one output layout may be selected, got {}",
                many.iter().map(|(flag, _)| *flag).collect::<Vec<_>>().join(", ")
            ))),
        }
    }
}

/// Per-granule attributes collected from the catalog records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeTables {
    /// Start times keyed by native id
    pub start_times: HashMap<String, DateTime<Utc>>,
    /// Cycle numbers keyed by native id without its extension
    pub cycles: HashMap<String, String>,
}

impl AttributeTables {
    /// Record a start time; the first record for a native id wins
    pub fn insert_start_time(&mut self, native_id: &str, start: DateTime<Utc>) {
        self.start_times.entry(native_id.to_string()).or_insert(start);
    }

    /// Record a cycle; the first record for an id stem wins
    pub fn insert_cycle(&mut self, native_id: &str, cycle: String) {
        self.cycles
            .entry(strip_extension(native_id).to_string())
            .or_insert(cycle);
    }

    /// Start time for a file name
    ///
    /// Tries the name without its extension first, then the full name,
    /// since some catalog records keep the extension in the native id.
    pub fn start_time_for(&self, file_name: &str) -> Option<DateTime<Utc>> {
        self.start_times
            .get(strip_extension(file_name))
            .or_else(|| self.start_times.get(file_name))
            .copied()
    }

    /// Cycle for a file name, matched on the name without its extension only
    pub fn cycle_for(&self, file_name: &str) -> Option<&str> {
        self.cycles.get(strip_extension(file_name)).map(String::as_str)
    }
}

/// A destination path relative to the destination root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeTarget {
    /// Directory components, outermost first
    pub dirs: Vec<String>,
    /// File name
    pub file_name: String,
}

impl RelativeTarget {
    /// All path components including the file name
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.dirs
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.file_name.as_str()))
    }
}

impl fmt::Display for RelativeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.components().collect();
        f.write_str(&joined.join("/"))
    }
}

/// Maps download URLs to destination paths for one run
#[derive(Debug, Clone)]
pub struct OutputResolver {
    kind: LayoutKind,
    offset_hours: i64,
    tables: AttributeTables,
}

impl OutputResolver {
    pub fn new(kind: LayoutKind, offset_hours: i64, tables: AttributeTables) -> Self {
        Self {
            kind,
            offset_hours,
            tables,
        }
    }

    pub fn kind(&self) -> LayoutKind {
        self.kind
    }

    /// Resolve the relative target for a URL
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::OutputPath`] when the URL has no file name or the
    /// layout attribute cannot be found for it.
    pub fn resolve(&self, url: &str) -> Result<RelativeTarget> {
        let file_name = url_basename(url);
        if file_name.is_empty() || file_name == "." || file_name == ".." {
            return Err(SyncError::OutputPath(format!(
                "URL '{url}' does not end in a file name"
            )));
        }

        let dirs = match self.kind.required_attribute() {
            RequiredAttribute::None => Vec::new(),
            RequiredAttribute::StartTime => {
                let start = self.tables.start_time_for(file_name).ok_or_else(|| {
                    SyncError::OutputPath(format!(
                        "No granule start time matches '{file_name}'"
                    ))
                })?;
                temporal::directories(self.kind, temporal::shifted(start, self.offset_hours))
            }
            RequiredAttribute::Cycle => {
                let cycle = self.tables.cycle_for(file_name).ok_or_else(|| {
                    SyncError::OutputPath(format!("No granule cycle matches '{file_name}'"))
                })?;
                vec![cycle::directory(cycle)]
            }
        };

        Ok(RelativeTarget {
            dirs,
            file_name: file_name.to_string(),
        })
    }
}
