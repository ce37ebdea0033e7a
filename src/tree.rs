//! Tree model, merge with the diff overlay, and nesting into a forest

mod entry;
mod forest;
mod merge;

pub use entry::{
    ancestors, parent_path, synthesized_id, ChangeAction, ChangeRecord, EntryKind, TreeEntry,
    SYNTHESIZED_ID_PREFIX,
};
pub use forest::{build_forest, build_forest_under, find_node, find_node_mut, walk, TreeNode};
pub use merge::{compare_entries, merge};
