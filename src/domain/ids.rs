//! Domain identifier types with validation
//!
//! Newtype wrappers for catalog identifiers so a collection short name can't
//! be passed where a provider or granule id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Collection short name newtype wrapper
///
/// Identifies the CMR collection whose granules are synchronized, for
/// example `JASON_CS_S6A_L2_ALT_LR_RED_OST_NRT_F`.
///
/// # Examples
///
/// ```
/// use granule_sync::domain::ids::CollectionShortName;
/// use std::str::FromStr;
///
/// let collection = CollectionShortName::from_str("MUR25-JPL-L4-GLOB-v04.2").unwrap();
/// assert_eq!(collection.as_str(), "MUR25-JPL-L4-GLOB-v04.2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionShortName(String);

impl CollectionShortName {
    /// Creates a new CollectionShortName, rejecting blank or whitespace-bearing names
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("Collection short name cannot be empty".to_string());
        }
        if name.chars().any(char::is_whitespace) {
            return Err(format!(
                "Collection short name '{name}' cannot contain whitespace"
            ));
        }
        Ok(Self(name))
    }

    /// Returns the short name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionShortName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CollectionShortName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for CollectionShortName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Catalog provider identifier (e.g. `POCLOUD`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderId(String);

impl ProviderId {
    /// Creates a new ProviderId
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Provider ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the provider ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Default for ProviderId {
    fn default() -> Self {
        Self("POCLOUD".to_string())
    }
}

/// Granule native identifier as reported in the record's `meta.native-id`
///
/// Native ids usually equal the data file name, with or without its
/// extension, which is what the output layouts rely on when correlating a
/// download URL with its catalog attributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NativeId(String);

impl NativeId {
    /// Creates a new NativeId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the native id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The native id with a trailing file extension removed
    ///
    /// Mirrors a filesystem stem: `"g1.nc"` becomes `"g1"`, `"g1"` is kept,
    /// and a leading dot is not treated as an extension separator.
    pub fn stem(&self) -> &str {
        strip_extension(&self.0)
    }
}

impl fmt::Display for NativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NativeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Remove the last `.ext` from a file name
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}
