//! Sparse path → change record map built from the diff view

use std::collections::btree_map::{self, BTreeMap};

use tracing::debug;

use crate::tree::{ancestors, parent_path, ChangeRecord, EntryKind};

/// A change record plus the kind of node it belongs to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffRecord {
    pub kind: EntryKind,
    pub change: ChangeRecord,
}

/// Changed files and every ancestor directory of a changed file.
///
/// Directory records always hold the sum of the file records below them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SparseDiffMap {
    records: BTreeMap<String, DiffRecord>,
}

impl SparseDiffMap {
    /// Build the map from changed files. A path listed twice keeps its last
    /// record; directory totals are derived afterwards so input order never
    /// affects them.
    pub fn from_files<I>(files: I) -> Self
    where
        I: IntoIterator<Item = (String, ChangeRecord)>,
    {
        let files: BTreeMap<String, ChangeRecord> = files.into_iter().collect();
        let mut records: BTreeMap<String, DiffRecord> = BTreeMap::new();

        for (path, change) in &files {
            for dir in ancestors(path) {
                if files.contains_key(dir) {
                    debug!(dir, file = %path, "diff path is both a file and a directory");
                    continue;
                }
                records
                    .entry(dir.to_string())
                    .or_insert_with(|| DiffRecord {
                        kind: EntryKind::Tree,
                        change: ChangeRecord::default(),
                    })
                    .change
                    .accumulate(change);
            }
        }

        for (path, change) in files {
            records.insert(
                path,
                DiffRecord {
                    kind: EntryKind::Blob,
                    change,
                },
            );
        }

        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&DiffRecord> {
        self.records.get(path)
    }

    /// Remove and return the record for `path`
    pub fn take(&mut self, path: &str) -> Option<DiffRecord> {
        self.records.remove(path)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, DiffRecord> {
        self.records.iter()
    }

    /// Records whose immediate parent is `dir` ("" for the root)
    pub fn children_of(&self, dir: &str) -> Self {
        let records = self
            .records
            .iter()
            .filter(|(path, _)| parent_path(path) == dir)
            .map(|(path, record)| (path.clone(), record.clone()))
            .collect();
        Self { records }
    }

    /// Number of changed files (directory aggregates excluded)
    pub fn changed_files(&self) -> usize {
        self.records
            .values()
            .filter(|r| r.kind == EntryKind::Blob)
            .count()
    }
}

impl IntoIterator for SparseDiffMap {
    type Item = (String, DiffRecord);
    type IntoIter = btree_map::IntoIter<String, DiffRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
