//! Plain-text rendering of a loaded forest
//!
//! One line per node, indented two spaces per level, with change stats
//! aligned in a column after the longest name.

use unicode_width::UnicodeWidthStr;

use crate::submodule::{submodule_for, SubmoduleDescriptor};
use crate::tree::{walk, ChangeAction, ChangeRecord, EntryKind, TreeNode};

const BAR_WIDTH: usize = 10;
const GREEN: &str = "\x1b[38;5;83m";
const RED: &str = "\x1b[38;5;203m";
const DIM: &str = "\x1b[38;5;240m";
const RESET: &str = "\x1b[0m";

/// Render the forest. With `color` set, stats get ANSI colors and a diff bar.
pub fn render_forest(
    forest: &[TreeNode],
    submodules: &[SubmoduleDescriptor],
    color: bool,
) -> Vec<String> {
    let rows = walk(forest);
    let labels: Vec<String> = rows
        .iter()
        .map(|(depth, node)| {
            let suffix = if node.entry.is_dir() { "/" } else { "" };
            format!("{}{}{}", "  ".repeat(*depth), node.entry.name(), suffix)
        })
        .collect();
    let width = labels.iter().map(|l| l.width()).max().unwrap_or(0);

    // Bars scale against the busiest file
    let max_changes = rows
        .iter()
        .filter(|(_, node)| !node.entry.is_dir())
        .filter_map(|(_, node)| node.entry.change.as_ref())
        .map(ChangeRecord::total_changes)
        .max()
        .unwrap_or(0)
        .max(1);

    rows.iter()
        .zip(labels)
        .map(|((_, node), label)| {
            let annotation = annotate(node, submodules, max_changes, color);
            if annotation.is_empty() {
                return label;
            }
            let pad = " ".repeat(width - label.width());
            format!("{}{}  {}", label, pad, annotation)
        })
        .collect()
}

fn annotate(
    node: &TreeNode,
    submodules: &[SubmoduleDescriptor],
    max_changes: usize,
    color: bool,
) -> String {
    let entry = &node.entry;
    let mut parts: Vec<String> = Vec::new();

    if entry.kind == EntryKind::Commit {
        if let Some(submodule) = submodule_for(submodules, &entry.path) {
            parts.push(format!("→ {}", submodule.url));
        }
    }

    if let Some(change) = &entry.change {
        parts.push(format_counts(change, color));
        if color && !entry.is_dir() {
            parts.push(create_diff_bar(change.additions, change.deletions, max_changes, BAR_WIDTH));
        }
        match change.action {
            Some(ChangeAction::Added) => parts.push("[added]".to_string()),
            Some(ChangeAction::Renamed) | Some(ChangeAction::Modified)
                if change.previous_path.is_some() =>
            {
                let from = change.previous_path.as_deref().unwrap_or_default();
                parts.push(format!("[renamed from {}]", truncate_path(from, 40)));
            }
            Some(ChangeAction::Renamed) => parts.push("[renamed]".to_string()),
            _ => {}
        }
        if entry.is_dir() {
            let noun = if change.file_count == 1 { "file" } else { "files" };
            parts.push(format!("({} {})", change.file_count, noun));
        }
    }

    parts.join(" ")
}

fn format_counts(change: &ChangeRecord, color: bool) -> String {
    if color {
        format!(
            "{GREEN}+{}{RESET} {RED}-{}{RESET}",
            change.additions, change.deletions
        )
    } else {
        format!("+{} -{}", change.additions, change.deletions)
    }
}

/// Truncate a path string, showing the end with ellipsis if too long
pub fn truncate_path(path: &str, max_len: usize) -> String {
    let len = path.chars().count();
    if len <= max_len {
        path.to_string()
    } else if max_len <= 3 {
        "...".to_string()
    } else {
        // Show end of path (more useful)
        let tail: String = path.chars().skip(len - (max_len - 1)).collect();
        format!("…{}", tail)
    }
}

/// Create a scaled diff bar showing additions (green) and deletions (red)
/// Max width is `max_width` characters, scaled proportionally to `max_changes`
pub fn create_diff_bar(
    additions: usize,
    deletions: usize,
    max_changes: usize,
    max_width: usize,
) -> String {
    let total = additions + deletions;
    if total == 0 {
        return format!("{DIM}{}{RESET}", "·".repeat(max_width.min(2)));
    }

    let scaled_total = ((total as f64 / max_changes.max(1) as f64) * max_width as f64).ceil() as usize;
    let bar_width = scaled_total.clamp(1, max_width);

    // Distribute bar width between additions and deletions
    let add_chars = ((additions as f64 / total as f64) * bar_width as f64).round() as usize;
    let del_chars = bar_width.saturating_sub(add_chars);

    let mut bar = String::new();
    if add_chars > 0 {
        bar.push_str(&format!("{GREEN}{}{RESET}", "+".repeat(add_chars)));
    }
    if del_chars > 0 {
        bar.push_str(&format!("{RED}{}{RESET}", "-".repeat(del_chars)));
    }
    bar
}
