//! Tree fetching on top of a `RepoSource`
//!
//! A recursive listing is tried first. When the server says it is too large
//! the caller's policy decides between surfacing the truncation and falling
//! back to a per-directory (lazy) tree.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::{debug, info, warn};

use super::source::RepoSource;
use crate::context::RepositoryContext;
use crate::error::{Error, Result};
use crate::tree::TreeEntry;

/// Characters left alone by URI-component encoding
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// What to do when the recursive listing is truncated
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TruncatedPolicy {
    /// Surface `Error::Truncated`
    Fail,
    /// Load the root level only and expand directories on demand
    #[default]
    LoadLazily,
}

/// Root listing plus whether its directories still need expanding
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootListing {
    pub entries: Vec<TreeEntry>,
    pub lazy: bool,
}

/// Encode a ref for use as one URL path segment. The ref is decoded first
/// so already-encoded refs are not double encoded.
pub fn encode_ref(git_ref: &str) -> String {
    let decoded = percent_decode_str(git_ref).decode_utf8_lossy();
    utf8_percent_encode(&decoded, URI_COMPONENT).to_string()
}

/// Full recursive listing of the context's ref
pub async fn fetch_tree(
    source: &dyn RepoSource,
    context: &RepositoryContext,
) -> Result<Vec<TreeEntry>> {
    let tree_ish = encode_ref(&context.git_ref);
    let entries = source.list_tree(context, &tree_ish, true).await?;
    debug!(repo = %context.key(), git_ref = %context.git_ref, entries = entries.len(), "fetched tree");
    Ok(entries)
}

/// Listing of the root, recursive when the server allows it
pub async fn fetch_root(
    source: &dyn RepoSource,
    context: &RepositoryContext,
    policy: TruncatedPolicy,
) -> Result<RootListing> {
    match fetch_tree(source, context).await {
        Ok(entries) => Ok(RootListing {
            entries,
            lazy: false,
        }),
        Err(Error::Truncated { path }) if policy == TruncatedPolicy::LoadLazily => {
            info!(repo = %context.key(), %path, "tree too large, loading directories lazily");
            let tree_ish = encode_ref(&context.git_ref);
            let entries = source.list_tree(context, &tree_ish, false).await?;
            Ok(RootListing {
                entries,
                lazy: true,
            })
        }
        Err(err) => {
            if err.is_recoverable() {
                warn!(repo = %context.key(), "tree listing truncated");
            }
            Err(err)
        }
    }
}

/// Direct children of one directory, by its server subtree id.
/// Returned paths are full repository paths.
pub async fn fetch_subtree(
    source: &dyn RepoSource,
    context: &RepositoryContext,
    dir: &TreeEntry,
) -> Result<Vec<TreeEntry>> {
    let Some(sha) = dir.sha.as_deref() else {
        // Directory only known from the diff: nothing on the server to list
        return Ok(Vec::new());
    };

    let mut entries = source.list_tree(context, sha, false).await?;
    for entry in entries.iter_mut() {
        entry.path = format!("{}/{}", dir.path, entry.path);
    }
    debug!(dir = %dir.path, entries = entries.len(), "fetched subtree");
    Ok(entries)
}
