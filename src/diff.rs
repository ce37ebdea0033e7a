//! Diff overlay: per-file change statistics scraped from a diff page

mod map;
mod overlay;
mod stats;

pub use map::{DiffRecord, SparseDiffMap};
pub use overlay::{DiffInspector, DiffOverlay, FileChangeElement, DEFAULT_RENAME_MARKER};
pub use stats::{parse_stats_label, StatsLabel};
