//! Nesting of the ordered flat list into a forest

use std::collections::HashMap;

use serde::Serialize;

use super::entry::{parent_path, EntryKind, TreeEntry};
use super::merge::compare_entries;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    #[serde(flatten)]
    pub entry: TreeEntry,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(entry: TreeEntry) -> Self {
        Self {
            entry,
            children: Vec::new(),
        }
    }

    /// Depth-first search by full path
    pub fn find(&self, path: &str) -> Option<&TreeNode> {
        if self.entry.path == path {
            return Some(self);
        }
        if !path.starts_with(&self.entry.path) {
            return None;
        }
        self.children.iter().find_map(|child| child.find(path))
    }

    fn find_mut(&mut self, path: &str) -> Option<&mut TreeNode> {
        if self.entry.path == path {
            return Some(self);
        }
        if !path.starts_with(&self.entry.path) {
            return None;
        }
        self.children.iter_mut().find_map(|child| child.find_mut(path))
    }
}

/// Find a node anywhere in a forest
pub fn find_node<'a>(forest: &'a [TreeNode], path: &str) -> Option<&'a TreeNode> {
    forest.iter().find_map(|node| node.find(path))
}

/// Mutable variant of [`find_node`]
pub fn find_node_mut<'a>(forest: &'a mut [TreeNode], path: &str) -> Option<&'a mut TreeNode> {
    forest.iter_mut().find_map(|node| node.find_mut(path))
}

/// Pre-order walk yielding (depth, node)
pub fn walk(forest: &[TreeNode]) -> Vec<(usize, &TreeNode)> {
    fn visit<'a>(nodes: &'a [TreeNode], depth: usize, out: &mut Vec<(usize, &'a TreeNode)>) {
        for node in nodes {
            out.push((depth, node));
            visit(&node.children, depth + 1, out);
        }
    }

    let mut out = Vec::new();
    visit(forest, 0, &mut out);
    out
}

/// Nest entries under their parent directories.
///
/// Entries whose parent directory is missing get a synthesized directory.
/// Every level is ordered with [`compare_entries`].
pub fn build_forest(entries: Vec<TreeEntry>) -> Vec<TreeNode> {
    build_forest_under(entries, "")
}

/// Like [`build_forest`], for entries that all live below `root`
/// (used when expanding one directory lazily)
pub fn build_forest_under(entries: Vec<TreeEntry>, root: &str) -> Vec<TreeNode> {
    // Arena of entries plus child index lists, assembled into owned nodes at the end
    let mut arena: Vec<TreeEntry> = Vec::with_capacity(entries.len());
    let mut children: Vec<Vec<usize>> = Vec::with_capacity(entries.len());
    let mut index: HashMap<String, usize> = HashMap::with_capacity(entries.len());
    let mut roots: Vec<usize> = Vec::new();

    for entry in entries {
        if index.contains_key(&entry.path) {
            continue;
        }
        let idx = arena.len();
        index.insert(entry.path.clone(), idx);
        arena.push(entry);
        children.push(Vec::new());
    }

    let listed = arena.len();
    for idx in 0..listed {
        let parent = parent_path(&arena[idx].path).to_string();
        attach(idx, &parent, root, &mut arena, &mut children, &mut index, &mut roots);
    }

    sort_level(&mut roots, &arena);
    for idx in 0..children.len() {
        let mut level = std::mem::take(&mut children[idx]);
        sort_level(&mut level, &arena);
        children[idx] = level;
    }

    let mut slots: Vec<Option<TreeEntry>> = arena.into_iter().map(Some).collect();
    roots
        .iter()
        .filter_map(|&idx| assemble(idx, &mut slots, &children))
        .collect()
}

fn attach(
    idx: usize,
    parent: &str,
    root: &str,
    arena: &mut Vec<TreeEntry>,
    children: &mut Vec<Vec<usize>>,
    index: &mut HashMap<String, usize>,
    roots: &mut Vec<usize>,
) {
    if parent == root || parent.is_empty() {
        roots.push(idx);
        return;
    }

    let parent_idx = match index.get(parent) {
        Some(&existing) => existing,
        None => {
            let synthesized = arena.len();
            index.insert(parent.to_string(), synthesized);
            arena.push(TreeEntry::synthesized(parent, EntryKind::Tree));
            children.push(Vec::new());
            let grandparent = parent_path(parent).to_string();
            attach(synthesized, &grandparent, root, arena, children, index, roots);
            synthesized
        }
    };
    children[parent_idx].push(idx);
}

fn sort_level(level: &mut [usize], arena: &[TreeEntry]) {
    level.sort_by(|&a, &b| compare_entries(&arena[a], &arena[b]));
}

fn assemble(
    idx: usize,
    slots: &mut Vec<Option<TreeEntry>>,
    children: &[Vec<usize>],
) -> Option<TreeNode> {
    let entry = slots[idx].take()?;
    let kids = children[idx]
        .iter()
        .filter_map(|&child| assemble(child, slots, children))
        .collect();
    Some(TreeNode {
        entry,
        children: kids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::SparseDiffMap;
    use crate::tree::{merge, ChangeAction, ChangeRecord};

    fn listed(path: &str, kind: EntryKind) -> TreeEntry {
        TreeEntry::new(format!("id-{}", path), path, kind)
    }

    fn names(nodes: &[TreeNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.entry.name()).collect()
    }

    #[test]
    fn test_listing_with_added_file() {
        let entries = vec![listed("src", EntryKind::Tree), listed("src/a.js", EntryKind::Blob)];
        let diff = SparseDiffMap::from_files(vec![(
            "b.js".to_string(),
            ChangeRecord {
                additions: 3,
                deletions: 0,
                action: Some(ChangeAction::Added),
                ..Default::default()
            },
        )]);

        let forest = build_forest(merge(entries, diff));
        assert_eq!(names(&forest), vec!["src", "b.js"]);

        let src = &forest[0];
        assert_eq!(src.entry.kind, EntryKind::Tree);
        assert!(src.entry.change.is_none());
        assert_eq!(names(&src.children), vec!["a.js"]);
        assert_eq!(src.children[0].entry.path, "src/a.js");

        let b = forest[1].entry.change.as_ref().unwrap();
        assert_eq!(forest[1].entry.kind, EntryKind::Blob);
        assert_eq!((b.additions, b.deletions, b.action), (3, 0, Some(ChangeAction::Added)));
    }

    #[test]
    fn test_missing_ancestors_are_synthesized() {
        let entries = vec![listed("a/b/c.txt", EntryKind::Blob), listed("z.txt", EntryKind::Blob)];
        let forest = build_forest(entries);

        assert_eq!(names(&forest), vec!["a", "z.txt"]);
        let a = &forest[0];
        assert!(a.entry.is_synthesized());
        assert_eq!(a.children[0].entry.path, "a/b");
        assert_eq!(a.children[0].children[0].entry.path, "a/b/c.txt");
    }

    #[test]
    fn test_children_folders_first() {
        let entries = vec![
            listed("pkg", EntryKind::Tree),
            listed("pkg/z", EntryKind::Tree),
            listed("pkg/a.rs", EntryKind::Blob),
            listed("pkg/m", EntryKind::Commit),
            listed("pkg/b.rs", EntryKind::Blob),
        ];
        let forest = build_forest(entries);
        assert_eq!(names(&forest[0].children), vec!["m", "z", "a.rs", "b.rs"]);
    }

    #[test]
    fn test_forest_under_subdirectory() {
        let entries = vec![
            listed("src/util", EntryKind::Tree),
            listed("src/main.rs", EntryKind::Blob),
        ];
        let forest = build_forest_under(entries, "src");
        assert_eq!(names(&forest), vec!["util", "main.rs"]);
    }

    #[test]
    fn test_find_and_walk() {
        let entries = vec![
            listed("docs", EntryKind::Tree),
            listed("docs/guide.md", EntryKind::Blob),
            listed("docs-old.md", EntryKind::Blob),
        ];
        let forest = build_forest(entries);

        assert!(find_node(&forest, "docs/guide.md").is_some());
        assert!(find_node(&forest, "docs/missing.md").is_none());

        let walked: Vec<(usize, &str)> = walk(&forest)
            .into_iter()
            .map(|(depth, node)| (depth, node.entry.path.as_str()))
            .collect();
        assert_eq!(
            walked,
            vec![(0, "docs"), (1, "docs/guide.md"), (0, "docs-old.md")]
        );
    }
}
