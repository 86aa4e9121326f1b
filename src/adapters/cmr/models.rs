//! CMR `granules.umm_json` response models
//!
//! Only the fields the sync engine reads are modelled. Everything else in
//! the UMM-G record is ignored during deserialization.

use serde::{Deserialize, Serialize};

/// Link type of a primary data download
pub const LINK_TYPE_DATA: &str = "GET DATA";

/// Link type of an extended metadata sidecar
pub const LINK_TYPE_METADATA: &str = "EXTENDED METADATA";

/// Link subtype excluded from data links
pub const LINK_SUBTYPE_OPENDAP: &str = "OPENDAP DATA";

/// One or more pages of granule search results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    /// Total number of matching granules reported by the catalog
    #[serde(default)]
    pub hits: u64,

    /// Granule records in catalog order
    #[serde(default)]
    pub items: Vec<GranuleRecord>,
}

impl SearchResults {
    /// Append the records of a further page
    pub fn extend(&mut self, page: SearchResults) {
        self.hits = self.hits.max(page.hits);
        self.items.extend(page.items);
    }
}

/// A single UMM-G granule record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GranuleRecord {
    pub meta: GranuleMeta,
    pub umm: Umm,
}

impl GranuleRecord {
    /// `umm.TemporalExtent.RangeDateTime.BeginningDateTime`
    pub fn beginning_date_time(&self) -> Option<&str> {
        self.umm
            .temporal_extent
            .as_ref()?
            .range_date_time
            .as_ref()?
            .beginning_date_time
            .as_deref()
    }

    /// `umm.SpatialExtent.HorizontalSpatialDomain.Track.Cycle` as text
    pub fn cycle(&self) -> Option<String> {
        let cycle = self
            .umm
            .spatial_extent
            .as_ref()?
            .horizontal_spatial_domain
            .as_ref()?
            .track
            .as_ref()?
            .cycle
            .as_ref()?;
        match cycle {
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }
}

/// Record metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GranuleMeta {
    #[serde(rename = "native-id")]
    pub native_id: String,

    #[serde(rename = "concept-id", default)]
    pub concept_id: Option<String>,
}

/// The parts of the UMM-G body used for link extraction and layouts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Umm {
    #[serde(rename = "RelatedUrls", default)]
    pub related_urls: Vec<RelatedUrl>,

    #[serde(rename = "TemporalExtent", default)]
    pub temporal_extent: Option<TemporalExtent>,

    #[serde(rename = "SpatialExtent", default)]
    pub spatial_extent: Option<SpatialExtent>,
}

/// A related link with its classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedUrl {
    #[serde(rename = "URL")]
    pub url: String,

    #[serde(rename = "Type", default)]
    pub link_type: String,

    #[serde(rename = "Subtype", default)]
    pub subtype: Option<String>,
}

impl RelatedUrl {
    /// Primary data link, excluding OPeNDAP endpoints
    pub fn is_data(&self) -> bool {
        self.link_type == LINK_TYPE_DATA && self.subtype.as_deref() != Some(LINK_SUBTYPE_OPENDAP)
    }

    /// Extended metadata link
    pub fn is_metadata(&self) -> bool {
        self.link_type == LINK_TYPE_METADATA
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemporalExtent {
    #[serde(rename = "RangeDateTime", default)]
    pub range_date_time: Option<RangeDateTime>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RangeDateTime {
    #[serde(rename = "BeginningDateTime", default)]
    pub beginning_date_time: Option<String>,

    #[serde(rename = "EndingDateTime", default)]
    pub ending_date_time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpatialExtent {
    #[serde(rename = "HorizontalSpatialDomain", default)]
    pub horizontal_spatial_domain: Option<HorizontalSpatialDomain>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HorizontalSpatialDomain {
    #[serde(rename = "Track", default)]
    pub track: Option<Track>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Track {
    #[serde(rename = "Cycle", default)]
    pub cycle: Option<serde_json::Value>,
}
