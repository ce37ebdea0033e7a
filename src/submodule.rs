//! Submodule detection
//!
//! Looks for the submodule manifest in a merged listing, fetches it and
//! parses its `[submodule "name"]` sections.

use base64::Engine;
use serde::Serialize;
use tracing::debug;

use crate::context::RepositoryContext;
use crate::error::{Error, Result};
use crate::fetch::RepoSource;
use crate::tree::{EntryKind, TreeEntry};

pub const DEFAULT_MANIFEST_NAME: &str = ".gitmodules";

/// One nested repository reference
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubmoduleDescriptor {
    pub name: String,
    /// Repo-relative path of the gitlink
    pub path: String,
    /// Upstream URL
    pub url: String,
    /// Tracked branch, when the manifest names one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// Find the manifest entry (exact path, case-insensitive)
pub fn find_manifest<'a>(entries: &'a [TreeEntry], manifest_name: &str) -> Option<&'a TreeEntry> {
    entries.iter().find(|entry| {
        entry.kind == EntryKind::Blob
            && entry.sha.is_some()
            && entry.path.eq_ignore_ascii_case(manifest_name)
    })
}

/// Fetch and parse the manifest. `Ok(None)` when the tree has none.
pub async fn detect(
    source: &dyn RepoSource,
    context: &RepositoryContext,
    entries: &[TreeEntry],
    manifest_name: &str,
) -> Result<Option<Vec<SubmoduleDescriptor>>> {
    let Some(manifest) = find_manifest(entries, manifest_name) else {
        return Ok(None);
    };
    let Some(sha) = manifest.sha.as_deref() else {
        return Ok(None);
    };

    let encoded = source.blob_content(context, sha).await?;
    let text = decode_content(&encoded)?;
    let submodules = parse_manifest(&text)?;
    debug!(repo = %context.key(), count = submodules.len(), "parsed submodule manifest");
    Ok(Some(submodules))
}

/// Decode base64 blob content (the API wraps it across lines)
pub fn decode_content(encoded: &str) -> Result<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| Error::ManifestParse {
            line: 0,
            message: format!("invalid base64 content: {}", e),
        })?;
    String::from_utf8(bytes).map_err(|e| Error::ManifestParse {
        line: 0,
        message: format!("content is not UTF-8: {}", e),
    })
}

/// Parse a `.gitmodules`-style manifest
pub fn parse_manifest(text: &str) -> Result<Vec<SubmoduleDescriptor>> {
    let mut submodules = Vec::new();
    let mut current: Option<PartialSubmodule> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if line.starts_with('[') {
            if let Some(done) = current.take() {
                submodules.push(done.finish()?);
            }
            current = Some(PartialSubmodule::from_header(line, line_no)?);
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(parse_error(line_no, format!("expected 'key = value', found '{}'", line)));
        };
        let Some(section) = current.as_mut() else {
            return Err(parse_error(line_no, "key outside of a [submodule] section"));
        };
        section.set(key.trim(), unquote(value.trim()));
    }

    if let Some(done) = current.take() {
        submodules.push(done.finish()?);
    }
    Ok(submodules)
}

struct PartialSubmodule {
    name: String,
    line: usize,
    path: Option<String>,
    url: Option<String>,
    branch: Option<String>,
}

impl PartialSubmodule {
    /// `[submodule "name"]`
    fn from_header(line: &str, line_no: usize) -> Result<Self> {
        let inner = line
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .ok_or_else(|| parse_error(line_no, "unterminated section header"))?
            .trim();
        let name = inner
            .strip_prefix("submodule")
            .map(|rest| unquote(rest.trim()))
            .filter(|name| !name.is_empty())
            .ok_or_else(|| parse_error(line_no, format!("unexpected section '{}'", inner)))?;
        Ok(Self {
            name,
            line: line_no,
            path: None,
            url: None,
            branch: None,
        })
    }

    fn set(&mut self, key: &str, value: String) {
        match key {
            "path" => self.path = Some(value),
            "url" => self.url = Some(value),
            "branch" => self.branch = Some(value),
            _ => {}
        }
    }

    fn finish(self) -> Result<SubmoduleDescriptor> {
        let path = self
            .path
            .ok_or_else(|| parse_error(self.line, format!("submodule '{}' has no path", self.name)))?;
        let url = self
            .url
            .ok_or_else(|| parse_error(self.line, format!("submodule '{}' has no url", self.name)))?;
        Ok(SubmoduleDescriptor {
            name: self.name,
            path,
            url,
            branch: self.branch,
        })
    }
}

fn unquote(value: &str) -> String {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
        .to_string()
}

fn parse_error(line: usize, message: impl Into<String>) -> Error {
    Error::ManifestParse {
        line,
        message: message.into(),
    }
}

/// Descriptor for the gitlink at `path`
pub fn submodule_for<'a>(
    submodules: &'a [SubmoduleDescriptor],
    path: &str,
) -> Option<&'a SubmoduleDescriptor> {
    submodules.iter().find(|s| s.path == path)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    const MANIFEST: &str = r#"
# vendored libraries
[submodule "vendor/json"]
	path = vendor/json
	url = https://github.com/nlohmann/json.git
	branch = develop
[submodule "docs/theme"]
	path = docs/theme
	url = "git@github.com:example/theme.git"
"#;

    struct ManifestSource(String);

    #[async_trait]
    impl RepoSource for ManifestSource {
        async fn list_tree(
            &self,
            _context: &RepositoryContext,
            _tree_ish: &str,
            _recursive: bool,
        ) -> Result<Vec<TreeEntry>> {
            Ok(Vec::new())
        }

        async fn blob_content(&self, _context: &RepositoryContext, sha: &str) -> Result<String> {
            assert_eq!(sha, "manifest-sha");
            Ok(self.0.clone())
        }

        async fn default_branch(&self, _context: &RepositoryContext) -> Result<Option<String>> {
            Ok(None)
        }
    }

    fn encode_wrapped(text: &str) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(text);
        encoded
            .as_bytes()
            .chunks(60)
            .map(|c| String::from_utf8_lossy(c).into_owned())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn manifest_entry(path: &str) -> TreeEntry {
        let mut entry = TreeEntry::new("manifest-sha", path, EntryKind::Blob);
        entry.sha = Some("manifest-sha".into());
        entry
    }

    #[test]
    fn test_parse_manifest() {
        let subs = parse_manifest(MANIFEST).unwrap();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].name, "vendor/json");
        assert_eq!(subs[0].path, "vendor/json");
        assert_eq!(subs[0].url, "https://github.com/nlohmann/json.git");
        assert_eq!(subs[0].branch.as_deref(), Some("develop"));
        assert_eq!(subs[1].url, "git@github.com:example/theme.git");
        assert_eq!(subs[1].branch, None);
        assert_eq!(submodule_for(&subs, "docs/theme").unwrap().name, "docs/theme");
    }

    #[test]
    fn test_malformed_manifests() {
        let orphan = "path = lib\n";
        assert!(matches!(
            parse_manifest(orphan),
            Err(Error::ManifestParse { line: 1, .. })
        ));

        let no_equals = "[submodule \"a\"]\n  path lib\n";
        assert!(matches!(
            parse_manifest(no_equals),
            Err(Error::ManifestParse { line: 2, .. })
        ));

        let no_url = "[submodule \"a\"]\n  path = lib\n";
        assert!(matches!(
            parse_manifest(no_url),
            Err(Error::ManifestParse { line: 1, .. })
        ));

        assert!(parse_manifest("[core]\n").is_err());
        assert!(parse_manifest("[submodule \"a\"\n").is_err());
    }

    #[test]
    fn test_decode_wrapped_base64() {
        let decoded = decode_content(&encode_wrapped(MANIFEST)).unwrap();
        assert_eq!(decoded, MANIFEST);
        assert!(decode_content("not base64!").is_err());
    }

    #[test]
    fn test_manifest_lookup_is_exact_and_case_insensitive() {
        let entries = vec![manifest_entry("lib/.gitmodules"), manifest_entry(".GitModules")];
        assert_eq!(
            find_manifest(&entries, DEFAULT_MANIFEST_NAME).unwrap().path,
            ".GitModules"
        );
        assert!(find_manifest(&entries[..1], DEFAULT_MANIFEST_NAME).is_none());
    }

    #[tokio::test]
    async fn test_detect() {
        let source = ManifestSource(encode_wrapped(MANIFEST));
        let context = RepositoryContext::new("o", "r", "main");

        let none = detect(&source, &context, &[], DEFAULT_MANIFEST_NAME).await.unwrap();
        assert!(none.is_none());

        let entries = vec![manifest_entry(".gitmodules")];
        let subs = detect(&source, &context, &entries, DEFAULT_MANIFEST_NAME)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(subs.len(), 2);
    }

    #[tokio::test]
    async fn test_detect_surfaces_parse_errors() {
        let source = ManifestSource(encode_wrapped("url = nowhere\n"));
        let context = RepositoryContext::new("o", "r", "main");
        let entries = vec![manifest_entry(".gitmodules")];
        let result = detect(&source, &context, &entries, DEFAULT_MANIFEST_NAME).await;
        assert!(matches!(result, Err(Error::ManifestParse { .. })));
    }
}
