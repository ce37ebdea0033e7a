//! Page context resolution: which repository and ref the page shows

mod branch_cache;
mod inspector;
mod probes;
mod repository;
mod resolver;

pub use branch_cache::DefaultBranchCache;
pub use inspector::{BranchSignal, PageInspector};
pub use probes::{default_probes, probe_branch, BranchProbe};
pub use repository::{parse_diff_header, PagePath, RepositoryContext};
pub use resolver::{
    ContextResolver, Resolution, ResolverConfig, SkipReason, CODE_PAGE_TYPES,
    RESERVED_OWNER_NAMES, RESERVED_REPO_NAMES,
};
