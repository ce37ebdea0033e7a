//! Branch probes
//!
//! Page signals for the current branch are unreliable, so they are tried in a
//! fixed order and the first non-empty answer wins.

use super::inspector::{BranchSignal, PageInspector};

pub type BranchProbe = fn(&dyn PageInspector) -> Option<String>;

/// Probe chain used when no other list is configured
pub fn default_probes() -> Vec<BranchProbe> {
    vec![
        switcher_label,
        branch_link_data,
        sidebar_code_link,
        current_branch_label,
        commit_feed_title,
    ]
}

/// Run probes in order, returning the first non-empty branch
pub fn probe_branch(page: &dyn PageInspector, probes: &[BranchProbe]) -> Option<String> {
    probes.iter().find_map(|probe| probe(page).filter(|b| !b.is_empty()))
}

pub fn switcher_label(page: &dyn PageInspector) -> Option<String> {
    first_value(page, BranchSignal::SwitcherLabel)
}

pub fn branch_link_data(page: &dyn PageInspector) -> Option<String> {
    first_value(page, BranchSignal::BranchLinkData)
}

/// `/owner/repo/tree/<branch>` → branch
pub fn sidebar_code_link(page: &dyn PageInspector) -> Option<String> {
    let href = first_value(page, BranchSignal::SidebarCodeLink)?;
    nth_fragment(&href, '/', 3)
}

/// `owner:<branch>` → branch
pub fn current_branch_label(page: &dyn PageInspector) -> Option<String> {
    let title = first_value(page, BranchSignal::CurrentBranchLabel)?;
    nth_fragment(&title, ':', 1)
}

/// `Recent Commits to repo:<branch>` → branch; ambiguous when several feeds exist
pub fn commit_feed_title(page: &dyn PageInspector) -> Option<String> {
    let titles = page.branch_signal(BranchSignal::CommitFeedTitle);
    match titles.as_slice() {
        [title] => nth_fragment(title, ':', 1),
        _ => None,
    }
}

fn first_value(page: &dyn PageInspector, signal: BranchSignal) -> Option<String> {
    page.branch_signal(signal)
        .into_iter()
        .next()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// nth non-empty fragment of `value` split on `sep`
fn nth_fragment(value: &str, sep: char, n: usize) -> Option<String> {
    value
        .split(sep)
        .filter(|s| !s.is_empty())
        .nth(n)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
