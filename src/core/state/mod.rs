// Checkpoint state for incremental synchronization

pub mod checkpoint;
pub mod manager;

pub use checkpoint::{format_utc, parse_utc, Checkpoint, TIMESTAMP_FORMAT};
pub use manager::StateManager;
