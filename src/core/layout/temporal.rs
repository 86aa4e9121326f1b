//! Date-based directory layouts

use super::LayoutKind;
use chrono::{DateTime, Datelike, Duration, Utc};

/// Apply the configured hour offset to a granule start time
pub fn shifted(start: DateTime<Utc>, offset_hours: i64) -> DateTime<Utc> {
    if offset_hours == 0 {
        return start;
    }
    start + Duration::hours(offset_hours)
}

/// Directory components for a date-based layout
///
/// Returns an empty list for layouts that are not date-based.
pub fn directories(kind: LayoutKind, time: DateTime<Utc>) -> Vec<String> {
    let year = format!("{:04}", time.year());
    match kind {
        LayoutKind::YearDayOfYear => vec![year, format!("{:03}", time.ordinal())],
        LayoutKind::YearMonthDay => vec![
            year,
            format!("{:02}", time.month()),
            format!("{:02}", time.day()),
        ],
        LayoutKind::Year => vec![year],
        LayoutKind::Flat | LayoutKind::Cycle => Vec::new(),
    }
}
