use std::collections::HashMap;
use std::sync::Mutex;

use super::repository::repo_key;

/// Default branches discovered so far, keyed by `owner/repo`.
///
/// Entries live as long as the cache; last writer wins. A stale entry only
/// affects ref guessing, a bad ref still fails cleanly at fetch time.
#[derive(Debug, Default)]
pub struct DefaultBranchCache {
    branches: Mutex<HashMap<String, String>>,
}

impl DefaultBranchCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, owner: &str, name: &str) -> Option<String> {
        let guard = self.branches.lock().unwrap_or_else(|p| p.into_inner());
        guard.get(&repo_key(owner, name)).cloned()
    }

    pub fn set(&self, owner: &str, name: &str, branch: &str) {
        let mut guard = self.branches.lock().unwrap_or_else(|p| p.into_inner());
        guard.insert(repo_key(owner, name), branch.to_string());
    }
}
