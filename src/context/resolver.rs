//! Page context resolution
//!
//! Works out which repository and ref the current page shows. Ref sources,
//! first match wins: comparison header, branch probes, previous context of
//! the same repository, default-branch cache. When all of them come up empty
//! the caller looks the default branch up and calls
//! [`ContextResolver::remember_default_branch`].

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use super::branch_cache::DefaultBranchCache;
use super::inspector::PageInspector;
use super::probes::{default_probes, probe_branch, BranchProbe};
use super::repository::{parse_diff_header, PagePath, RepositoryContext};

/// Top-level routes that look like `/owner` but are not users
pub const RESERVED_OWNER_NAMES: &[&str] = &[
    "settings", "orgs", "organizations", "site", "blog", "about", "explore",
    "styleguide", "showcases", "trending", "stars", "dashboard", "notifications",
    "search", "developer", "account", "pulls", "issues", "features", "contact",
    "security", "join", "login", "watching", "new", "integrations", "gist",
    "business", "mirrors", "open-source", "personal", "pricing",
];

/// Second-level routes that look like `/owner/repo` but are not repositories
pub const RESERVED_REPO_NAMES: &[&str] = &["followers", "following", "repositories"];

/// Page types that always count as code pages
pub const CODE_PAGE_TYPES: &[&str] = &["tree", "blob"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolverConfig {
    pub reserved_owners: HashSet<String>,
    pub reserved_repos: HashSet<String>,
    pub code_page_types: HashSet<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            reserved_owners: to_set(RESERVED_OWNER_NAMES),
            reserved_repos: to_set(RESERVED_REPO_NAMES),
            code_page_types: to_set(CODE_PAGE_TYPES),
        }
    }
}

fn to_set(names: &[&str]) -> HashSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// Why a page was not treated as a repository
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    NotFoundPage,
    RawContent,
    NotARepository,
    ReservedName,
    NonCodePage,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing to show; the pipeline stops here
    Skip(SkipReason),
    /// Context with a resolved ref
    Ready(RepositoryContext),
    /// Context whose ref must be looked up as the repository's default branch
    NeedsDefaultBranch(RepositoryContext),
}

pub struct ContextResolver {
    config: ResolverConfig,
    probes: Vec<BranchProbe>,
    cache: Arc<DefaultBranchCache>,
}

impl ContextResolver {
    pub fn new(config: ResolverConfig, cache: Arc<DefaultBranchCache>) -> Self {
        Self {
            config,
            probes: default_probes(),
            cache,
        }
    }

    /// Replace the branch probe chain
    pub fn with_probes(mut self, probes: Vec<BranchProbe>) -> Self {
        self.probes = probes;
        self
    }

    pub fn cache(&self) -> &Arc<DefaultBranchCache> {
        &self.cache
    }

    pub fn resolve(
        &self,
        page: &dyn PageInspector,
        show_non_code_pages: bool,
        previous: Option<&RepositoryContext>,
    ) -> Resolution {
        if page.is_not_found_page() {
            return Resolution::Skip(SkipReason::NotFoundPage);
        }
        if page.is_raw_content_page() {
            return Resolution::Skip(SkipReason::RawContent);
        }

        let Some(path) = PagePath::parse(&page.current_path()) else {
            return Resolution::Skip(SkipReason::NotARepository);
        };

        if self.config.reserved_owners.contains(&path.owner)
            || self.config.reserved_repos.contains(&path.repo)
        {
            return Resolution::Skip(SkipReason::ReservedName);
        }

        if !show_non_code_pages {
            if let Some(page_type) = &path.page_type {
                if !self.config.code_page_types.contains(page_type) {
                    return Resolution::Skip(SkipReason::NonCodePage);
                }
            }
        }

        let header = page.diff_header_ref().and_then(|h| parse_diff_header(&h));
        let mut context = match header {
            Some((owner, name, git_ref)) => {
                let mut context = RepositoryContext::new(owner, name, git_ref);
                context.is_patch_view = page.is_patch_view();
                context
            }
            None => {
                let branch = probe_branch(page, &self.probes).unwrap_or_default();
                RepositoryContext::new(path.owner, path.repo, branch)
            }
        };

        if !context.has_ref() {
            if let Some(prev) = previous.filter(|p| p.same_repo(&context) && p.has_ref()) {
                context.git_ref = prev.git_ref.clone();
            } else if let Some(cached) = self.cache.get(&context.owner, &context.name) {
                context.git_ref = cached;
            }
        }

        if context.has_ref() {
            debug!(repo = %context.key(), git_ref = %context.git_ref, "resolved page context");
            Resolution::Ready(context)
        } else {
            debug!(repo = %context.key(), "ref unresolved, default branch lookup needed");
            Resolution::NeedsDefaultBranch(context)
        }
    }

    /// Cache a looked-up default branch and return the completed context
    pub fn remember_default_branch(
        &self,
        context: RepositoryContext,
        branch: &str,
    ) -> RepositoryContext {
        self.cache.set(&context.owner, &context.name, branch);
        context.with_ref(branch)
    }
}
