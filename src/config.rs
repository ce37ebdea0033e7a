//! Configuration management for repotree
//!
//! Handles loading and saving user preferences: API host, token, page
//! filtering and the overridable name lists.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::context::{ResolverConfig, CODE_PAGE_TYPES, RESERVED_OWNER_NAMES, RESERVED_REPO_NAMES};
use crate::diff::DEFAULT_RENAME_MARKER;
use crate::fetch::TruncatedPolicy;
use crate::pipeline::LoadOptions;
use crate::submodule::DEFAULT_MANIFEST_NAME;

/// repotree configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Hosting site, e.g. "github.com" or an enterprise host
    #[serde(default = "default_host")]
    pub host: String,

    /// API token. `REPOTREE_TOKEN` and `--token` take precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default)]
    pub show_non_code_pages: bool,

    /// Fall back to a lazily expanded tree when the listing is truncated
    #[serde(default = "default_true")]
    pub lazy_on_truncated: bool,

    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,

    #[serde(default)]
    pub reserved: ReservedNames,

    #[serde(default)]
    pub diff: DiffConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReservedNames {
    #[serde(default = "default_owners")]
    pub owners: Vec<String>,
    #[serde(default = "default_repos")]
    pub repos: Vec<String>,
    #[serde(default = "default_code_page_types")]
    pub code_page_types: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Separator between old and new path in renamed file headers
    #[serde(default = "default_rename_marker")]
    pub rename_marker: String,
}

fn default_host() -> String {
    "github.com".to_string()
}

fn default_true() -> bool {
    true
}

fn default_manifest_name() -> String {
    DEFAULT_MANIFEST_NAME.to_string()
}

fn default_rename_marker() -> String {
    DEFAULT_RENAME_MARKER.to_string()
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn default_owners() -> Vec<String> {
    owned(RESERVED_OWNER_NAMES)
}

fn default_repos() -> Vec<String> {
    owned(RESERVED_REPO_NAMES)
}

fn default_code_page_types() -> Vec<String> {
    owned(CODE_PAGE_TYPES)
}

impl Default for ReservedNames {
    fn default() -> Self {
        Self {
            owners: default_owners(),
            repos: default_repos(),
            code_page_types: default_code_page_types(),
        }
    }
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            rename_marker: default_rename_marker(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            token: None,
            show_non_code_pages: false,
            lazy_on_truncated: true,
            manifest_name: default_manifest_name(),
            reserved: ReservedNames::default(),
            diff: DiffConfig::default(),
        }
    }
}

impl Config {
    /// Get config directory path (~/.repotree)
    pub fn config_dir() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(".repotree"))
            .context("Could not find home directory")
    }

    /// Get config file path (~/.repotree/config.toml)
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from the default location, or defaults if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load config from an explicit file, or defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory {}", dir.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        // Atomic write: write to temp file then rename
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, &contents)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path)
            .with_context(|| format!("Failed to rename config file to {}", path.display()))?;

        Ok(())
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            reserved_owners: self.reserved.owners.iter().cloned().collect(),
            reserved_repos: self.reserved.repos.iter().cloned().collect(),
            code_page_types: self.reserved.code_page_types.iter().cloned().collect(),
        }
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            show_non_code_pages: self.show_non_code_pages,
            truncated_policy: if self.lazy_on_truncated {
                TruncatedPolicy::LoadLazily
            } else {
                TruncatedPolicy::Fail
            },
            manifest_name: self.manifest_name.clone(),
        }
    }
}
