//! Diff overlay extraction
//!
//! Turns the file-change elements of a diff page into a `SparseDiffMap`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::map::SparseDiffMap;
use super::stats::parse_stats_label;
use crate::tree::ChangeRecord;

/// Default marker between the old and new path of a renamed file
pub const DEFAULT_RENAME_MARKER: &str = "→";

/// One file-change element as shown in the diff view
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChangeElement {
    /// Displayed path, possibly "old → new"
    pub path: String,
    /// Human-readable statistics label
    #[serde(default)]
    pub stats: Option<String>,
}

/// Read access to the page's diff view
pub trait DiffInspector {
    /// File-change elements in page order; empty when there is no diff view
    fn file_changes(&self) -> Vec<FileChangeElement>;
}

#[derive(Clone, Debug)]
pub struct DiffOverlay {
    rename_marker: String,
}

impl Default for DiffOverlay {
    fn default() -> Self {
        Self::new(DEFAULT_RENAME_MARKER)
    }
}

impl DiffOverlay {
    pub fn new(rename_marker: impl Into<String>) -> Self {
        Self {
            rename_marker: rename_marker.into(),
        }
    }

    /// Build the sparse diff map for the current page
    pub fn extract(&self, inspector: &dyn DiffInspector) -> SparseDiffMap {
        let elements = inspector.file_changes();
        let files = elements.iter().filter_map(|element| self.file_record(element));
        let map = SparseDiffMap::from_files(files);
        debug!(
            elements = elements.len(),
            records = map.len(),
            "extracted diff overlay"
        );
        map
    }

    /// Split "old → new" into (Some(old), new); plain paths pass through
    pub fn split_rename<'a>(&self, display: &'a str) -> (Option<&'a str>, &'a str) {
        if self.rename_marker.is_empty() {
            return (None, display.trim());
        }
        match display.split_once(self.rename_marker.as_str()) {
            Some((previous, current)) => (Some(previous.trim()), current.trim()),
            None => (None, display.trim()),
        }
    }

    fn file_record(&self, element: &FileChangeElement) -> Option<(String, ChangeRecord)> {
        let (previous, path) = self.split_rename(&element.path);
        let path = path.trim_matches('/');
        if path.is_empty() {
            debug!(display = %element.path, "skipping diff element without a path");
            return None;
        }

        let label = element.stats.as_deref().unwrap_or("");
        let stats = parse_stats_label(label, previous.is_some());

        let record = ChangeRecord {
            additions: stats.additions,
            deletions: stats.deletions,
            action: stats.action,
            previous_path: previous.filter(|p| !p.is_empty()).map(str::to_string),
            file_count: 0,
        };
        Some((path.to_string(), record))
    }
}
