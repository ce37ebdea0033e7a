use serde::{Deserialize, Serialize};

/// Repository identity of the current page
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryContext {
    pub owner: String,
    pub name: String,
    /// Branch, tag or sha; empty until resolution completes
    #[serde(rename = "ref")]
    pub git_ref: String,
    /// Page shows proposed changes rather than a committed snapshot
    #[serde(default)]
    pub is_patch_view: bool,
}

impl RepositoryContext {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, git_ref: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            git_ref: git_ref.into(),
            is_patch_view: false,
        }
    }

    /// "owner/name", the default-branch cache key
    pub fn key(&self) -> String {
        repo_key(&self.owner, &self.name)
    }

    pub fn same_repo(&self, other: &RepositoryContext) -> bool {
        self.owner == other.owner && self.name == other.name
    }

    pub fn has_ref(&self) -> bool {
        !self.git_ref.is_empty()
    }

    pub fn with_ref(mut self, git_ref: impl Into<String>) -> Self {
        self.git_ref = git_ref.into();
        self
    }
}

pub(crate) fn repo_key(owner: &str, name: &str) -> String {
    format!("{}/{}", owner, name)
}

/// `/owner/repo[/type/...]` split into its leading segments
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PagePath {
    pub owner: String,
    pub repo: String,
    /// Third segment ("tree", "blob", "pull", ...), if any
    pub page_type: Option<String>,
}

impl PagePath {
    /// None unless the path has at least an owner and a repository segment
    pub fn parse(path: &str) -> Option<Self> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let owner = segments.next()?;
        let repo = segments.next()?;
        let page_type = segments.next().map(str::to_string);
        Some(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            page_type,
        })
    }
}

/// Parse a comparison header of the form `owner/repo:ref`
pub fn parse_diff_header(header: &str) -> Option<(String, String, String)> {
    let header = header.trim();
    let slash = header.find('/')?;
    let colon = header[slash..].find(':')? + slash;
    let owner = &header[..slash];
    let repo = &header[slash + 1..colon];
    let git_ref = &header[colon + 1..];
    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some((owner.to_string(), repo.to_string(), git_ref.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_path() {
        let path = PagePath::parse("/rust-lang/cargo/tree/master/src").unwrap();
        assert_eq!(path.owner, "rust-lang");
        assert_eq!(path.repo, "cargo");
        assert_eq!(path.page_type.as_deref(), Some("tree"));

        let bare = PagePath::parse("/rust-lang/cargo").unwrap();
        assert_eq!(bare.page_type, None);

        assert!(PagePath::parse("/rust-lang").is_none());
        assert!(PagePath::parse("/").is_none());
    }

    #[test]
    fn test_diff_header() {
        assert_eq!(
            parse_diff_header("alice/proj:feature-x"),
            Some(("alice".into(), "proj".into(), "feature-x".into()))
        );
        assert_eq!(
            parse_diff_header("alice/proj:feature/nested:odd"),
            Some(("alice".into(), "proj".into(), "feature/nested:odd".into()))
        );
        assert!(parse_diff_header("feature-x").is_none());
        assert!(parse_diff_header("alice/proj").is_none());
        assert!(parse_diff_header("/proj:main").is_none());
    }

    #[test]
    fn test_key_and_same_repo() {
        let a = RepositoryContext::new("o", "r", "main");
        let b = RepositoryContext::new("o", "r", "dev");
        assert_eq!(a.key(), "o/r");
        assert!(a.same_repo(&b));
        assert!(!a.same_repo(&RepositoryContext::new("o", "other", "main")));
    }
}
