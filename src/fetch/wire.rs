//! Response bodies of the hosting API

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::tree::{EntryKind, TreeEntry};

/// `GET /repos/{owner}/{repo}/git/trees/{tree_ish}`
#[derive(Debug, Deserialize)]
pub struct TreeResponse {
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub tree: Vec<WireEntry>,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Deserialize)]
pub struct WireEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// `GET /repos/{owner}/{repo}/git/blobs/{sha}`
#[derive(Debug, Deserialize)]
pub struct BlobResponse {
    pub content: String,
    #[serde(default)]
    pub encoding: Option<String>,
}

/// `GET /repos/{owner}/{repo}`
#[derive(Debug, Deserialize)]
pub struct RepoResponse {
    #[serde(default)]
    pub default_branch: Option<String>,
}

impl TreeResponse {
    /// Convert to flat entries; a truncated listing is an error, never a
    /// partial result.
    pub fn into_entries(self, tree_ish: &str) -> Result<Vec<TreeEntry>> {
        if self.truncated {
            return Err(Error::Truncated {
                path: tree_ish.to_string(),
            });
        }

        let entries = self
            .tree
            .into_iter()
            .filter_map(|wire| {
                let Some(kind) = EntryKind::parse(&wire.entry_type) else {
                    debug!(path = %wire.path, kind = %wire.entry_type, "skipping unknown entry type");
                    return None;
                };
                let id = wire.sha.clone().unwrap_or_else(|| wire.path.clone());
                Some(TreeEntry {
                    id,
                    path: wire.path,
                    kind,
                    sha: wire.sha,
                    size: wire.size,
                    change: None,
                })
            })
            .collect();
        Ok(entries)
    }
}

impl BlobResponse {
    /// Base64 content as served; any other encoding is rejected.
    pub fn into_content(self, sha: &str) -> Result<String> {
        match self.encoding.as_deref() {
            None | Some("base64") => Ok(self.content),
            Some(other) => Err(Error::transport(
                None,
                format!("blob {} has unsupported encoding '{}'", sha, other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing() {
        let body = r#"{
            "sha": "root",
            "tree": [
                {"path": "src", "mode": "040000", "type": "tree", "sha": "t1"},
                {"path": "src/a.js", "mode": "100644", "type": "blob", "sha": "b1", "size": 12},
                {"path": "vendor/lib", "mode": "160000", "type": "commit", "sha": "c1"}
            ],
            "truncated": false
        }"#;
        let response: TreeResponse = serde_json::from_str(body).unwrap();
        let entries = response.into_entries("main").unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].kind, EntryKind::Tree);
        assert_eq!(entries[1].id, "b1");
        assert_eq!(entries[1].size, Some(12));
        assert_eq!(entries[2].kind, EntryKind::Commit);
    }

    #[test]
    fn test_truncated_listing_is_an_error() {
        let body = r#"{"sha": "root", "tree": [{"path": "a", "type": "blob", "sha": "x"}], "truncated": true}"#;
        let response: TreeResponse = serde_json::from_str(body).unwrap();
        match response.into_entries("main") {
            Err(Error::Truncated { path }) => assert_eq!(path, "main"),
            other => panic!("expected truncation, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_types_are_skipped() {
        let body = r#"{"tree": [{"path": "weird", "type": "tag"}]}"#;
        let response: TreeResponse = serde_json::from_str(body).unwrap();
        assert!(response.into_entries("main").unwrap().is_empty());
    }

    #[test]
    fn test_blob_encoding() {
        let body = r#"{"sha": "b1", "content": "W3N1Ym1vZHVsZV0=\n", "encoding": "base64"}"#;
        let blob: BlobResponse = serde_json::from_str(body).unwrap();
        assert_eq!(blob.into_content("b1").unwrap(), "W3N1Ym1vZHVsZV0=\n");

        let body = r#"{"sha": "b1", "content": "[submodule]", "encoding": "utf-8"}"#;
        let blob: BlobResponse = serde_json::from_str(body).unwrap();
        match blob.into_content("b1") {
            Err(Error::Transport { status: None, message }) => assert!(message.contains("'utf-8'")),
            other => panic!("expected transport error, got {:?}", other),
        }
    }
}
