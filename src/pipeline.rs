//! Tree loading pipeline
//!
//! resolve → (default branch lookup) → fetch → merge with diff overlay →
//! submodule detection → forest.
//!
//! Every "context changed" signal starts a new request epoch. Network calls
//! are never cancelled; a cycle that finds a newer epoch when it resumes
//! drops its result and reports `Outcome::Superseded`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::Serialize;
use tracing::{debug, info};

use crate::context::{ContextResolver, PageInspector, RepositoryContext, Resolution, SkipReason};
use crate::diff::{DiffInspector, DiffOverlay, SparseDiffMap};
use crate::error::{Error, Result};
use crate::fetch::{fetch_root, fetch_subtree, RepoSource, TruncatedPolicy};
use crate::submodule::{self, SubmoduleDescriptor, DEFAULT_MANIFEST_NAME};
use crate::tree::{build_forest, build_forest_under, find_node, find_node_mut, merge, EntryKind, TreeNode};

/// Used when the server does not report a default branch
pub const FALLBACK_BRANCH: &str = "master";

#[derive(Clone, Debug)]
pub struct LoadOptions {
    pub show_non_code_pages: bool,
    pub truncated_policy: TruncatedPolicy,
    pub manifest_name: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            show_non_code_pages: false,
            truncated_policy: TruncatedPolicy::default(),
            manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
        }
    }
}

/// Result of one pipeline cycle
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The page is not a repository; nothing was fetched
    Skipped(SkipReason),
    /// A newer navigation started while this cycle was waiting
    Superseded,
    Ready(T),
}

impl<T> Outcome<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            Outcome::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// The final tree handed to the tree-view widget
#[derive(Clone, Debug, Serialize)]
pub struct LoadedTree {
    pub context: RepositoryContext,
    pub forest: Vec<TreeNode>,
    /// None when the repository has no submodule manifest
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submodules: Option<Vec<SubmoduleDescriptor>>,
    /// Directories load their children through [`TreeLoader::expand`]
    pub lazy: bool,
    #[serde(skip)]
    pub epoch: u64,
    #[serde(skip)]
    diff: SparseDiffMap,
}

impl LoadedTree {
    pub fn submodules(&self) -> &[SubmoduleDescriptor] {
        self.submodules.as_deref().unwrap_or(&[])
    }
}

pub struct TreeLoader<S> {
    source: S,
    resolver: ContextResolver,
    overlay: DiffOverlay,
    options: LoadOptions,
    epoch: AtomicU64,
    current: Mutex<Option<RepositoryContext>>,
}

impl<S: RepoSource> TreeLoader<S> {
    pub fn new(source: S, resolver: ContextResolver, overlay: DiffOverlay, options: LoadOptions) -> Self {
        Self {
            source,
            resolver,
            overlay,
            options,
            epoch: AtomicU64::new(0),
            current: Mutex::new(None),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn resolver(&self) -> &ContextResolver {
        &self.resolver
    }

    pub fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Context established by the latest completed resolution
    pub fn current_context(&self) -> Option<RepositoryContext> {
        self.current.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    fn begin_epoch(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, epoch: u64) -> bool {
        let current = self.current_epoch();
        if current != epoch {
            debug!(epoch, current, "discarding result of superseded request");
            return false;
        }
        true
    }

    fn commit_context(&self, context: &RepositoryContext) {
        *self.current.lock().unwrap_or_else(|p| p.into_inner()) = Some(context.clone());
    }

    /// Handle a "context changed" signal for the page
    pub async fn load(
        &self,
        page: &dyn PageInspector,
        diff_view: &dyn DiffInspector,
    ) -> Result<Outcome<LoadedTree>> {
        let epoch = self.begin_epoch();
        let previous = self.current_context();
        let show = self.options.show_non_code_pages;

        let context = match self.resolver.resolve(page, show, previous.as_ref()) {
            Resolution::Skip(reason) => {
                debug!(?reason, path = %page.current_path(), "page skipped");
                return Ok(Outcome::Skipped(reason));
            }
            Resolution::Ready(context) => context,
            Resolution::NeedsDefaultBranch(pending) => {
                let lookup = self.source.default_branch(&pending).await;
                if !self.is_current(epoch) {
                    return Ok(Outcome::Superseded);
                }
                let branch = lookup?.unwrap_or_else(|| FALLBACK_BRANCH.to_string());
                let remembered = self.resolver.remember_default_branch(pending, &branch);
                match self.resolver.resolve(page, show, previous.as_ref()) {
                    Resolution::Ready(context) => context,
                    Resolution::Skip(reason) => return Ok(Outcome::Skipped(reason)),
                    Resolution::NeedsDefaultBranch(_) => remembered,
                }
            }
        };
        self.commit_context(&context);

        let diff = self.overlay.extract(diff_view);
        // Late results of a superseded cycle are dropped, errors included
        let listing = fetch_root(&self.source, &context, self.options.truncated_policy).await;
        if !self.is_current(epoch) {
            return Ok(Outcome::Superseded);
        }
        let listing = listing?;

        let overlay = if listing.lazy {
            diff.children_of("")
        } else {
            diff.clone()
        };
        let merged = merge(listing.entries, overlay);

        let submodules =
            submodule::detect(&self.source, &context, &merged, &self.options.manifest_name).await;
        if !self.is_current(epoch) {
            return Ok(Outcome::Superseded);
        }
        let submodules = submodules?;

        info!(
            repo = %context.key(),
            git_ref = %context.git_ref,
            entries = merged.len(),
            changed = diff.changed_files(),
            lazy = listing.lazy,
            "tree loaded"
        );

        Ok(Outcome::Ready(LoadedTree {
            context,
            forest: build_forest(merged),
            submodules,
            lazy: listing.lazy,
            epoch,
            diff,
        }))
    }

    /// Load the children of one directory of a lazy tree
    pub async fn expand(&self, tree: &mut LoadedTree, dir_path: &str) -> Result<Outcome<()>> {
        if !self.is_current(tree.epoch) {
            return Ok(Outcome::Superseded);
        }

        let dir = find_node(&tree.forest, dir_path)
            .map(|node| node.entry.clone())
            .ok_or_else(|| Error::NotFound(format!("directory '{}'", dir_path)))?;
        if dir.kind != EntryKind::Tree {
            return Err(Error::NotFound(format!("'{}' is not a directory", dir_path)));
        }

        let entries = fetch_subtree(&self.source, &tree.context, &dir).await;
        if !self.is_current(tree.epoch) {
            return Ok(Outcome::Superseded);
        }
        let entries = entries?;

        let merged = merge(entries, tree.diff.children_of(dir_path));
        let children = build_forest_under(merged, dir_path);
        if let Some(node) = find_node_mut(&mut tree.forest, dir_path) {
            node.children = children;
        }
        Ok(Outcome::Ready(()))
    }
}
