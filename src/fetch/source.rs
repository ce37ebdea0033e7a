use async_trait::async_trait;

use crate::context::RepositoryContext;
use crate::error::Result;
use crate::tree::TreeEntry;

/// The hosting API as seen by the engine.
///
/// Implementations report a truncated listing as `Error::Truncated`.
#[async_trait]
pub trait RepoSource: Send + Sync {
    /// Flat listing of `tree_ish` (an encoded ref or a subtree sha).
    /// Non-recursive listings return paths relative to that tree.
    async fn list_tree(
        &self,
        context: &RepositoryContext,
        tree_ish: &str,
        recursive: bool,
    ) -> Result<Vec<TreeEntry>>;

    /// Transport-encoded content of a blob
    async fn blob_content(&self, context: &RepositoryContext, sha: &str) -> Result<String>;

    /// The repository's default branch, if the server reports one
    async fn default_branch(&self, context: &RepositoryContext) -> Result<Option<String>>;
}
