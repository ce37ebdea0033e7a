//! Merge of a flat listing with the diff overlay

use std::cmp::Ordering;

use tracing::debug;

use super::entry::TreeEntry;
use crate::diff::SparseDiffMap;

/// Folders first, then ascending path
pub fn compare_entries(a: &TreeEntry, b: &TreeEntry) -> Ordering {
    a.kind
        .sort_rank()
        .cmp(&b.kind.sort_rank())
        .then_with(|| a.path.cmp(&b.path))
}

/// Attach diff records to listed entries, synthesize entries for paths only
/// the diff knows about, and sort the result.
///
/// Server-provided fields are never touched; only `change` is set.
pub fn merge(mut entries: Vec<TreeEntry>, mut diff: SparseDiffMap) -> Vec<TreeEntry> {
    let listed = entries.len();

    for entry in entries.iter_mut() {
        if let Some(record) = diff.take(&entry.path) {
            entry.change = Some(record.change);
        }
    }

    let synthesized = diff.len();
    for (path, record) in diff {
        let mut entry = TreeEntry::synthesized(&path, record.kind);
        entry.change = Some(record.change);
        entries.push(entry);
    }

    entries.sort_by(compare_entries);
    debug!(listed, synthesized, "merged listing with diff overlay");
    entries
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::tree::{ChangeAction, ChangeRecord, EntryKind};

    fn listed(path: &str, kind: EntryKind) -> TreeEntry {
        let mut entry = TreeEntry::new(format!("sha-{}", path), path, kind);
        entry.sha = Some(format!("sha-{}", path));
        entry
    }

    fn changed(additions: usize, deletions: usize, action: ChangeAction) -> ChangeRecord {
        ChangeRecord {
            additions,
            deletions,
            action: Some(action),
            ..Default::default()
        }
    }

    fn sample() -> (Vec<TreeEntry>, SparseDiffMap) {
        let entries = vec![
            listed("zeta.md", EntryKind::Blob),
            listed("src/lib.rs", EntryKind::Blob),
            listed("src", EntryKind::Tree),
            listed("alpha.md", EntryKind::Blob),
            listed("docs", EntryKind::Tree),
        ];
        let diff = SparseDiffMap::from_files(vec![
            ("src/lib.rs".to_string(), changed(4, 1, ChangeAction::Modified)),
            ("src/new/mod.rs".to_string(), changed(10, 0, ChangeAction::Added)),
            ("beta.md".to_string(), changed(1, 0, ChangeAction::Added)),
        ]);
        (entries, diff)
    }

    #[test]
    fn test_union_of_paths_without_duplicates() {
        let (entries, diff) = sample();
        let mut expected: HashSet<String> = entries.iter().map(|e| e.path.clone()).collect();
        expected.extend(diff.iter().map(|(p, _)| p.clone()));

        let merged = merge(entries, diff);
        let paths: Vec<&str> = merged.iter().map(|e| e.path.as_str()).collect();
        let unique: HashSet<&str> = paths.iter().copied().collect();

        assert_eq!(paths.len(), unique.len());
        assert_eq!(unique.len(), expected.len());
        assert!(expected.iter().all(|p| unique.contains(p.as_str())));
    }

    #[test]
    fn test_folders_first_then_paths() {
        let (entries, diff) = sample();
        let merged = merge(entries, diff);
        let order: Vec<&str> = merged.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            order,
            vec![
                "docs",
                "src",
                "src/new",
                "alpha.md",
                "beta.md",
                "src/lib.rs",
                "src/new/mod.rs",
                "zeta.md",
            ]
        );

        let first_blob = merged.iter().position(|e| e.kind == EntryKind::Blob).unwrap();
        assert!(merged[first_blob..].iter().all(|e| e.kind == EntryKind::Blob));
        assert!(merged.windows(2).all(|w| {
            w[0].kind.sort_rank() != w[1].kind.sort_rank() || w[0].path <= w[1].path
        }));
    }

    #[test]
    fn test_server_fields_preserved() {
        let (entries, diff) = sample();
        let merged = merge(entries, diff);

        let lib = merged.iter().find(|e| e.path == "src/lib.rs").unwrap();
        assert_eq!(lib.id, "sha-src/lib.rs");
        assert_eq!(lib.sha.as_deref(), Some("sha-src/lib.rs"));
        assert_eq!(lib.change.as_ref().unwrap().additions, 4);

        let src = merged.iter().find(|e| e.path == "src").unwrap();
        assert_eq!(src.id, "sha-src");
        assert_eq!(src.change.as_ref().unwrap().file_count, 2);

        let docs = merged.iter().find(|e| e.path == "docs").unwrap();
        assert!(docs.change.is_none());
    }

    #[test]
    fn test_diff_only_entries_are_synthesized() {
        let (entries, diff) = sample();
        let merged = merge(entries, diff);

        let new_dir = merged.iter().find(|e| e.path == "src/new").unwrap();
        assert_eq!(new_dir.kind, EntryKind::Tree);
        assert!(new_dir.is_synthesized());
        assert!(new_dir.sha.is_none());

        let beta = merged.iter().find(|e| e.path == "beta.md").unwrap();
        assert_eq!(beta.kind, EntryKind::Blob);
        assert_eq!(beta.change.as_ref().unwrap().action, Some(ChangeAction::Added));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let (entries, diff) = sample();
        let first = merge(entries.clone(), diff.clone());
        let second = merge(entries, diff);
        assert_eq!(first, second);
    }

    #[test]
    fn test_merge_ignores_listing_order() {
        let (entries, diff) = sample();
        let mut reversed = entries.clone();
        reversed.reverse();
        assert_eq!(merge(entries, diff.clone()), merge(reversed, diff));
    }
}
