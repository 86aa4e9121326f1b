// Search query construction, result extraction and filtering

pub mod extract;
pub mod filter;
pub mod query;

pub use extract::{extract_candidates, Extraction};
pub use filter::ExtensionFilter;
pub use query::{BoundingBox, SearchQuery, SearchWindow};
