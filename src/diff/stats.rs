//! Parsing of the diff view's per-file statistics label
//!
//! Labels look like "12 additions & 3 deletions", "File renamed without
//! changes" or "Binary file added". Keyword matching assumes English labels.

use std::sync::OnceLock;

use regex::Regex;

use crate::tree::ChangeAction;

const ADDITION_TOKEN: &str = "addition";
const RENAMED_TOKEN: &str = "renamed";
const ADDED_TOKEN: &str = "added";

fn additions_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([\d,]+)\s+addition").unwrap())
}

fn deletions_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([\d,]+)\s+deletion").unwrap())
}

/// Counts and classification read from one label
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatsLabel {
    pub additions: usize,
    pub deletions: usize,
    pub action: Option<ChangeAction>,
}

/// Classify a statistics label.
///
/// Line counts win over everything else: a renamed file with edits is
/// Modified. Otherwise a rename (label token or marker in the path) beats
/// "added". Removed files carry no action.
pub fn parse_stats_label(label: &str, has_rename_marker: bool) -> StatsLabel {
    let lower = label.to_lowercase();

    if lower.contains(ADDITION_TOKEN) {
        return StatsLabel {
            additions: capture_count(additions_re(), &lower),
            deletions: capture_count(deletions_re(), &lower),
            action: Some(ChangeAction::Modified),
        };
    }

    let action = if lower.contains(RENAMED_TOKEN) || has_rename_marker {
        Some(ChangeAction::Renamed)
    } else if lower.contains(ADDED_TOKEN) {
        Some(ChangeAction::Added)
    } else {
        None
    };

    StatsLabel {
        action,
        ..StatsLabel::default()
    }
}

fn capture_count(re: &Regex, text: &str) -> usize {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
        .unwrap_or(0)
}
