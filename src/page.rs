//! Page snapshots
//!
//! A JSON capture of what the page inspectors would report for one page.
//! The command-line driver and the fixture tests load pages this way.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::context::{BranchSignal, PageInspector};
use crate::diff::{DiffInspector, FileChangeElement};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Location pathname, e.g. `/owner/repo/pull/1/files`
    pub path: String,
    #[serde(default)]
    pub not_found: bool,
    #[serde(default)]
    pub raw_content: bool,
    /// Comparison header, `owner/repo:ref`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_header: Option<String>,
    #[serde(default)]
    pub patch_view: bool,
    #[serde(default)]
    pub branch_signals: HashMap<BranchSignal, Vec<String>>,
    #[serde(default)]
    pub diff_files: Vec<FileChangeElement>,
}

impl PageSnapshot {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read page snapshot from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse page snapshot from {}", path.display()))
    }
}

impl PageInspector for PageSnapshot {
    fn current_path(&self) -> String {
        self.path.clone()
    }

    fn is_not_found_page(&self) -> bool {
        self.not_found
    }

    fn is_raw_content_page(&self) -> bool {
        self.raw_content
    }

    fn diff_header_ref(&self) -> Option<String> {
        self.diff_header.clone().filter(|h| !h.trim().is_empty())
    }

    fn is_patch_view(&self) -> bool {
        self.patch_view
    }

    fn branch_signal(&self, signal: BranchSignal) -> Vec<String> {
        self.branch_signals.get(&signal).cloned().unwrap_or_default()
    }
}

impl DiffInspector for PageSnapshot {
    fn file_changes(&self) -> Vec<FileChangeElement> {
        self.diff_files.clone()
    }
}
