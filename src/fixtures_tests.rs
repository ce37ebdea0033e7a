#[cfg(test)]
mod fixtures {
    use std::collections::HashMap;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use anyhow::{bail, Context, Result};
    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::{json, Value};

    use crate::context::{ContextResolver, DefaultBranchCache, RepositoryContext, ResolverConfig};
    use crate::diff::DiffOverlay;
    use crate::error::Error;
    use crate::fetch::{RepoSource, TreeResponse};
    use crate::page::PageSnapshot;
    use crate::pipeline::{LoadOptions, Outcome, TreeLoader};
    use crate::render::render_forest;
    use crate::tree::TreeEntry;

    /// Canned API responses, keyed by the tree-ish the loader asks for
    #[derive(Debug, Default, Deserialize)]
    struct Listing {
        #[serde(default)]
        default_branch: Option<String>,
        #[serde(default)]
        recursive: HashMap<String, Value>,
        #[serde(default)]
        shallow: HashMap<String, Value>,
        /// sha → base64 content
        #[serde(default)]
        blobs: HashMap<String, String>,
        #[serde(default)]
        show_non_code_pages: bool,
        /// Directories to expand after loading, in order
        #[serde(default)]
        expand: Vec<String>,
    }

    #[async_trait]
    impl RepoSource for Listing {
        async fn list_tree(
            &self,
            _context: &RepositoryContext,
            tree_ish: &str,
            recursive: bool,
        ) -> crate::Result<Vec<TreeEntry>> {
            let listings = if recursive { &self.recursive } else { &self.shallow };
            let body = listings
                .get(tree_ish)
                .cloned()
                .ok_or_else(|| Error::NotFound(tree_ish.to_string()))?;
            let response: TreeResponse = serde_json::from_value(body)
                .map_err(|e| Error::transport(None, e.to_string()))?;
            response.into_entries(tree_ish)
        }

        async fn blob_content(&self, _context: &RepositoryContext, sha: &str) -> crate::Result<String> {
            self.blobs
                .get(sha)
                .cloned()
                .ok_or_else(|| Error::NotFound(sha.to_string()))
        }

        async fn default_branch(&self, _context: &RepositoryContext) -> crate::Result<Option<String>> {
            Ok(self.default_branch.clone())
        }
    }

    #[tokio::test]
    async fn fixture_snapshots() -> Result<()> {
        let fixtures_root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
        let mut fixture_dirs = Vec::new();

        for entry in fs::read_dir(&fixtures_root).context("read fixtures directory")? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                fixture_dirs.push(entry.path());
            }
        }

        fixture_dirs.sort();

        for fixture_dir in fixture_dirs {
            run_fixture(&fixture_dir).await.with_context(|| {
                format!(
                    "fixture {}",
                    fixture_dir
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("unknown")
                )
            })?;
        }

        Ok(())
    }

    async fn run_fixture(fixture_dir: &Path) -> Result<()> {
        let page = PageSnapshot::load(&fixture_dir.join("page.json"))?;

        let listing_path = fixture_dir.join("listing.json");
        let listing_contents = fs::read_to_string(&listing_path)
            .with_context(|| format!("read {}", listing_path.display()))?;
        let listing: Listing = serde_json::from_str(&listing_contents)
            .with_context(|| format!("parse {}", listing_path.display()))?;

        let options = LoadOptions {
            show_non_code_pages: listing.show_non_code_pages,
            ..LoadOptions::default()
        };
        let expand = listing.expand.clone();
        let resolver = ContextResolver::new(ResolverConfig::default(), Arc::new(DefaultBranchCache::new()));
        let loader = TreeLoader::new(listing, resolver, DiffOverlay::default(), options);

        let actual_json = match loader.load(&page, &page).await? {
            Outcome::Skipped(reason) => json!({ "outcome": format!("skipped:{:?}", reason) }),
            Outcome::Superseded => bail!("single load reported as superseded"),
            Outcome::Ready(mut tree) => {
                for dir in &expand {
                    if loader.expand(&mut tree, dir).await? != Outcome::Ready(()) {
                        bail!("expansion of {} was superseded", dir);
                    }
                }
                json!({
                    "outcome": "ready",
                    "context": tree.context,
                    "lazy": tree.lazy,
                    "submodules": tree.submodules(),
                    "lines": render_forest(&tree.forest, tree.submodules(), false),
                })
            }
        };

        let expected_path = fixture_dir.join("expected.json");
        if should_update_fixtures() {
            let pretty = serde_json::to_string_pretty(&actual_json)?;
            fs::write(&expected_path, format!("{}\n", pretty))
                .with_context(|| format!("write {}", expected_path.display()))?;
            return Ok(());
        }

        let expected_contents = fs::read_to_string(&expected_path)
            .with_context(|| format!("read {}", expected_path.display()))?;
        let expected_json: Value = serde_json::from_str(&expected_contents)
            .with_context(|| format!("parse {}", expected_path.display()))?;

        if expected_json != actual_json {
            bail!(
                "fixture snapshot mismatch: {}\nactual: {}",
                expected_path.display(),
                serde_json::to_string_pretty(&actual_json)?
            );
        }

        Ok(())
    }

    fn should_update_fixtures() -> bool {
        matches!(std::env::var("REPOTREE_UPDATE_FIXTURES"), Ok(v) if v == "1" || v == "true")
    }
}
