use serde::{Deserialize, Serialize};

/// Page elements that may reveal the current branch, in probe order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchSignal {
    /// Title of the branch switcher button
    SwitcherLabel,
    /// `data-branch` attribute of the repository root link
    BranchLinkData,
    /// href of the sidebar "Code" link, `/owner/repo/tree/<branch>`
    SidebarCodeLink,
    /// Title of the current-branch label, `owner:<branch>`
    CurrentBranchLabel,
    /// Title of the commit feed link, `Recent Commits to repo:<branch>`
    CommitFeedTitle,
}

/// Read access to the host page, as seen by the context resolver
pub trait PageInspector {
    /// Location pathname, e.g. `/owner/repo/tree/main`
    fn current_path(&self) -> String;

    fn is_not_found_page(&self) -> bool;

    fn is_raw_content_page(&self) -> bool;

    /// `owner/repo:ref` from a comparison header, if the page has one
    fn diff_header_ref(&self) -> Option<String>;

    /// Whether the page has file-diff-info elements
    fn is_patch_view(&self) -> bool;

    /// Raw values of every element carrying `signal`, in page order
    fn branch_signal(&self, signal: BranchSignal) -> Vec<String>;
}
