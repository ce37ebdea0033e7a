//! Tree fetching from the hosting API
//!
//! This module provides:
//! - `RepoSource`, the seam between the engine and the API
//! - `GitHubClient`, the reqwest implementation
//! - Root/subtree fetch helpers with truncation handling

mod client;
mod fetcher;
mod source;
mod wire;

pub use client::{api_url_for_host, check_status, GitHubClient};
pub use fetcher::{encode_ref, fetch_root, fetch_subtree, fetch_tree, RootListing, TruncatedPolicy};
pub use source::RepoSource;
pub use wire::{BlobResponse, RepoResponse, TreeResponse, WireEntry};
