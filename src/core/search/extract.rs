//! Flatten catalog search results into transfer candidates

use crate::adapters::cmr::models::{GranuleRecord, SearchResults};
use crate::core::layout::{AttributeTables, LayoutKind, RequiredAttribute};
use crate::domain::{Candidate, LinkKind, NativeId, Result, SyncError};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Candidates of one run together with the attributes the layout needs
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Data links of every record, then metadata links of every record
    pub candidates: Vec<Candidate>,
    /// Lookup tables for the output resolver
    pub tables: AttributeTables,
}

impl Extraction {
    /// Number of data links
    pub fn data_count(&self) -> usize {
        self.candidates
            .iter()
            .filter(|c| c.kind == LinkKind::Data)
            .count()
    }
}

/// Parse a UMM `BeginningDateTime`
///
/// Accepts RFC 3339 with or without fractional seconds, and the same
/// without a zone designator, read as UTC.
pub fn parse_start_time(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Extract transfer candidates from search results
///
/// Data links keep catalog order and come first; metadata links of the
/// whole batch follow, also in catalog order. When `layout` needs a start
/// time or a cycle, every record must provide it.
///
/// # Errors
///
/// Returns [`SyncError::MissingAttribute`] when a record lacks the field the
/// layout needs, or [`SyncError::Validation`] when its start time cannot be
/// parsed.
pub fn extract_candidates(
    results: &SearchResults,
    layout: LayoutKind,
    page_size: usize,
) -> Result<Extraction> {
    let mut tables = AttributeTables::default();
    let mut data = Vec::new();
    let mut metadata = Vec::new();

    for record in &results.items {
        let native_id = NativeId::new(record.meta.native_id.as_str());
        let (start_time, cycle) = record_attributes(record, layout)?;

        if let Some(start) = start_time {
            tables.insert_start_time(native_id.as_str(), start);
        }
        if let Some(cycle) = &cycle {
            tables.insert_cycle(native_id.as_str(), cycle.clone());
        }

        for link in &record.umm.related_urls {
            let kind = if link.is_data() {
                LinkKind::Data
            } else if link.is_metadata() {
                LinkKind::Metadata
            } else {
                continue;
            };

            let mut candidate = Candidate::new(link.url.as_str(), native_id.clone(), kind);
            if let Some(start) = start_time {
                candidate = candidate.with_start_time(start);
            }
            if let Some(cycle) = &cycle {
                candidate = candidate.with_cycle(cycle.as_str());
            }

            match kind {
                LinkKind::Data => data.push(candidate),
                LinkKind::Metadata => metadata.push(candidate),
            }
        }
    }

    data.extend(metadata);

    if page_size > 0 && data.len() >= page_size {
        tracing::warn!(
            page_size,
            urls = data.len(),
            "Only the most recent {page_size} granules will be transferred; \
             narrow the time period or spatial region of the search to retrieve all granules"
        );
    }

    tracing::debug!(
        records = results.items.len(),
        candidates = data.len(),
        layout = %layout,
        "Extracted transfer candidates"
    );

    Ok(Extraction {
        candidates: data,
        tables,
    })
}

fn record_attributes(
    record: &GranuleRecord,
    layout: LayoutKind,
) -> Result<(Option<DateTime<Utc>>, Option<String>)> {
    match layout.required_attribute() {
        RequiredAttribute::None => Ok((None, None)),
        RequiredAttribute::StartTime => {
            let text = record
                .beginning_date_time()
                .ok_or_else(|| SyncError::MissingAttribute {
                    native_id: record.meta.native_id.clone(),
                    attribute: "start time (TemporalExtent.RangeDateTime.BeginningDateTime)",
                    layout: layout.name(),
                })?;
            let start = parse_start_time(text).ok_or_else(|| {
                SyncError::Validation(format!(
                    "Granule '{}' has an unparseable start time '{}'",
                    record.meta.native_id, text
                ))
            })?;
            Ok((Some(start), None))
        }
        RequiredAttribute::Cycle => {
            let cycle = record.cycle().ok_or_else(|| SyncError::MissingAttribute {
                native_id: record.meta.native_id.clone(),
                attribute: "cycle number (SpatialExtent.HorizontalSpatialDomain.Track.Cycle)",
                layout: layout.name(),
            })?;
            Ok((None, Some(cycle)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn results(items: serde_json::Value) -> SearchResults {
        serde_json::from_value(json!({ "hits": 2, "items": items })).unwrap()
    }

    fn two_records() -> SearchResults {
        results(json!([
            {
                "meta": {"native-id": "g1"},
                "umm": {
                    "TemporalExtent": {"RangeDateTime": {"BeginningDateTime": "2021-03-05T00:00:00.000Z"}},
                    "SpatialExtent": {"HorizontalSpatialDomain": {"Track": {"Cycle": 7}}},
                    "RelatedUrls": [
                        {"URL": "https://host/g1.nc", "Type": "GET DATA"},
                        {"URL": "https://host/g1.nc.md5", "Type": "EXTENDED METADATA"},
                        {"URL": "https://opendap/g1.nc", "Type": "GET DATA", "Subtype": "OPENDAP DATA"}
                    ]
                }
            },
            {
                "meta": {"native-id": "g2.nc"},
                "umm": {
                    "TemporalExtent": {"RangeDateTime": {"BeginningDateTime": "2021-03-06T12:00:00Z"}},
                    "SpatialExtent": {"HorizontalSpatialDomain": {"Track": {"Cycle": 8}}},
                    "RelatedUrls": [
                        {"URL": "https://host/g2.nc.md5", "Type": "EXTENDED METADATA"},
                        {"URL": "https://host/g2.nc", "Type": "GET DATA"},
                        {"URL": "https://host/browse.png", "Type": "GET RELATED VISUALIZATION"}
                    ]
                }
            }
        ]))
    }

    #[test]
    fn test_data_links_precede_metadata_links() {
        let extraction = extract_candidates(&two_records(), LayoutKind::Flat, 2000).unwrap();
        let urls: Vec<&str> = extraction.candidates.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://host/g1.nc",
                "https://host/g2.nc",
                "https://host/g1.nc.md5",
                "https://host/g2.nc.md5",
            ]
        );
        assert_eq!(extraction.data_count(), 2);
    }

    #[test]
    fn test_time_layout_collects_start_times() {
        let extraction =
            extract_candidates(&two_records(), LayoutKind::YearDayOfYear, 2000).unwrap();
        let g1 = Utc.with_ymd_and_hms(2021, 3, 5, 0, 0, 0).unwrap();
        assert_eq!(extraction.tables.start_times.get("g1"), Some(&g1));
        assert_eq!(
            extraction.tables.start_time_for("g2.nc"),
            Some(Utc.with_ymd_and_hms(2021, 3, 6, 12, 0, 0).unwrap())
        );
        assert_eq!(extraction.candidates[0].start_time, Some(g1));
        assert!(extraction.tables.cycles.is_empty());
    }

    #[test]
    fn test_cycle_layout_collects_cycles() {
        let extraction = extract_candidates(&two_records(), LayoutKind::Cycle, 2000).unwrap();
        assert_eq!(extraction.tables.cycle_for("g1.nc"), Some("7"));
        assert_eq!(extraction.tables.cycle_for("g2.nc"), Some("8"));
        assert_eq!(extraction.candidates[0].cycle.as_deref(), Some("7"));
    }

    #[test]
    fn test_missing_start_time_fails_run() {
        let results = results(json!([
            {"meta": {"native-id": "g3"}, "umm": {"RelatedUrls": [
                {"URL": "https://host/g3.nc", "Type": "GET DATA"}
            ]}}
        ]));
        let err = extract_candidates(&results, LayoutKind::YearMonthDay, 2000).unwrap_err();
        match err {
            SyncError::MissingAttribute { native_id, layout, .. } => {
                assert_eq!(native_id, "g3");
                assert_eq!(layout, "year_month_day");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_cycle_fails_run() {
        let results = results(json!([
            {"meta": {"native-id": "g3"}, "umm": {}}
        ]));
        let err = extract_candidates(&results, LayoutKind::Cycle, 2000).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_flat_layout_ignores_missing_attributes() {
        let results = results(json!([
            {"meta": {"native-id": "g3"}, "umm": {"RelatedUrls": [
                {"URL": "https://host/g3.nc", "Type": "GET DATA"}
            ]}}
        ]));
        let extraction = extract_candidates(&results, LayoutKind::Flat, 2000).unwrap();
        assert_eq!(extraction.candidates.len(), 1);
    }

    #[test]
    fn test_empty_results() {
        let extraction =
            extract_candidates(&SearchResults::default(), LayoutKind::Cycle, 2000).unwrap();
        assert!(extraction.candidates.is_empty());
    }

    #[test]
    fn test_parse_start_time_variants() {
        let expected = Utc.with_ymd_and_hms(2021, 3, 5, 0, 0, 0).unwrap();
        assert_eq!(parse_start_time("2021-03-05T00:00:00.000Z"), Some(expected));
        assert_eq!(parse_start_time("2021-03-05T00:00:00Z"), Some(expected));
        assert_eq!(parse_start_time("2021-03-05T00:00:00"), Some(expected));
        assert_eq!(parse_start_time("March 5th"), None);
    }

    /// Collects formatted log output for one closure
    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn extract_with_logs(page_size: usize) -> (Extraction, String) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();

        let extraction = tracing::subscriber::with_default(subscriber, || {
            extract_candidates(&two_records(), LayoutKind::Flat, page_size).unwrap()
        });
        let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        (extraction, text)
    }

    #[test]
    fn test_full_page_warns_but_keeps_every_url() {
        // Two records yield four candidates
        let (extraction, logs) = extract_with_logs(4);
        assert_eq!(extraction.candidates.len(), 4);
        assert!(logs.contains("Only the most recent 4 granules will be transferred"));

        let (extraction, logs) = extract_with_logs(5);
        assert_eq!(extraction.candidates.len(), 4);
        assert!(!logs.contains("Only the most recent"));
    }
}
