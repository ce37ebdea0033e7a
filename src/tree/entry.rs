//! Tree entries and the change records attached to them

use serde::{Deserialize, Serialize};

/// Prefix for ids of entries the server never returned
pub const SYNTHESIZED_ID_PREFIX: &str = "repotree:";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Directory
    Tree,
    /// Regular file
    Blob,
    /// Submodule gitlink
    Commit,
}

impl EntryKind {
    /// Parse the listing API's `type` field
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "tree" => Some(EntryKind::Tree),
            "blob" => Some(EntryKind::Blob),
            "commit" => Some(EntryKind::Commit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Tree => "tree",
            EntryKind::Blob => "blob",
            EntryKind::Commit => "commit",
        }
    }

    /// Directories and submodules sort together, ahead of files
    pub(crate) fn sort_rank(&self) -> u8 {
        match self {
            EntryKind::Tree | EntryKind::Commit => 0,
            EntryKind::Blob => 1,
        }
    }
}

/// How a file changed in the diff view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Modified,
    Added,
    Renamed,
}

impl ChangeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Modified => "modified",
            ChangeAction::Added => "added",
            ChangeAction::Renamed => "renamed",
        }
    }
}

/// Change statistics for a file, or the aggregate for a directory
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub additions: usize,
    pub deletions: usize,
    /// None for directories and for files whose label carried no known token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ChangeAction>,
    /// Path before a rename, when the diff shows a rename marker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_path: Option<String>,
    /// Number of changed files below a directory (0 for files)
    #[serde(default)]
    pub file_count: usize,
}

impl ChangeRecord {
    /// Total lines changed (additions + deletions)
    pub fn total_changes(&self) -> usize {
        self.additions + self.deletions
    }

    /// Fold one changed file into a directory aggregate
    pub(crate) fn accumulate(&mut self, file: &ChangeRecord) {
        self.file_count += 1;
        self.additions += file.additions;
        self.deletions += file.deletions;
    }
}

/// One entry of a flat listing
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub id: String,
    /// Full repo-relative path, `/` separated
    pub path: String,
    pub kind: EntryKind,
    /// Object sha; absent for entries only known from the diff
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<ChangeRecord>,
}

impl TreeEntry {
    pub fn new(id: impl Into<String>, path: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            kind,
            sha: None,
            size: None,
            change: None,
        }
    }

    /// Entry for a path the server did not report
    pub fn synthesized(path: &str, kind: EntryKind) -> Self {
        Self::new(synthesized_id(path), path, kind)
    }

    pub fn is_synthesized(&self) -> bool {
        self.id.starts_with(SYNTHESIZED_ID_PREFIX)
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Tree
    }

    /// Last path segment
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Path of the containing directory ("" at the root)
    pub fn parent_path(&self) -> &str {
        parent_path(&self.path)
    }
}

/// Namespaced id so synthesized nodes never collide with server ids
pub fn synthesized_id(path: &str) -> String {
    format!("{}{}", SYNTHESIZED_ID_PREFIX, path)
}

/// Containing directory of a `/` separated path ("" at the root)
pub fn parent_path(path: &str) -> &str {
    path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}

/// Every ancestor directory of `path`, shallowest first
pub fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices('/').map(move |(idx, _)| &path[..idx])
}
