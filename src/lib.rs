//! repotree: repository file trees for code-hosting pages
//!
//! Resolves which repository and ref a page shows, fetches the file listing,
//! overlays per-file diff statistics, detects submodules and nests the result
//! into a forest ready for a tree-view widget.

pub mod cli;
pub mod config;
pub mod context;
pub mod diff;
pub mod error;
pub mod fetch;
pub mod page;
pub mod pipeline;
pub mod render;
pub mod submodule;
pub mod tree;

#[cfg(test)]
mod fixtures_tests;

pub use error::{Error, Result};
