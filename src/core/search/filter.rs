//! File extension allow-list

use crate::config::DEFAULT_EXTENSIONS;
use crate::domain::Candidate;

/// Keeps candidates whose URL ends in an allowed extension
///
/// Matching is case-insensitive. An empty allow-list falls back to
/// [`DEFAULT_EXTENSIONS`] rather than matching nothing.
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    extensions: Vec<String>,
}

impl ExtensionFilter {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut extensions: Vec<String> = extensions
            .into_iter()
            .map(|e| e.as_ref().trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();

        if extensions.is_empty() {
            extensions = DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect();
        }

        Self { extensions }
    }

    /// The effective allow-list, lowercased
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Whether a URL passes the filter
    pub fn matches(&self, url: &str) -> bool {
        let url = url.to_lowercase();
        self.extensions.iter().any(|ext| url.ends_with(ext.as_str()))
    }

    /// Keep matching candidates, in order
    pub fn apply(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates
            .into_iter()
            .filter(|c| self.matches(&c.url))
            .collect()
    }
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LinkKind, NativeId};
    use test_case::test_case;

    fn candidate(url: &str) -> Candidate {
        Candidate::new(url, NativeId::new("g"), LinkKind::Data)
    }

    #[test_case("https://host/g1.NC", true ; "uppercase url")]
    #[test_case("https://host/g1.nc", true ; "exact")]
    #[test_case("https://host/g1.h5", true ; "hdf5")]
    #[test_case("https://host/g1.zip", true ; "zip")]
    #[test_case("https://host/g1.nc.md5", false ; "checksum sidecar")]
    #[test_case("https://host/g1.txt", false ; "text")]
    fn test_default_list(url: &str, expected: bool) {
        let filter = ExtensionFilter::new(Vec::<String>::new());
        assert_eq!(filter.matches(url), expected);
    }

    #[test]
    fn test_empty_allow_list_means_defaults() {
        let filter = ExtensionFilter::new(Vec::<String>::new());
        assert_eq!(filter.extensions(), &[".nc", ".h5", ".zip"]);
    }

    #[test]
    fn test_configured_extension_case_insensitive() {
        let filter = ExtensionFilter::new([".MD5"]);
        assert!(filter.matches("https://host/g1.nc.md5"));
        assert!(!filter.matches("https://host/g1.nc"));
    }

    #[test]
    fn test_apply_preserves_order_and_keeps_each_once() {
        let filter = ExtensionFilter::new([".nc", ".NC", "c"]);
        let kept = filter.apply(vec![
            candidate("https://host/b.nc"),
            candidate("https://host/x.txt"),
            candidate("https://host/a.nc"),
        ]);
        let urls: Vec<&str> = kept.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(urls, vec!["https://host/b.nc", "https://host/a.nc"]);
    }
}
