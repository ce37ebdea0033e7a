//! HTTP client for the hosting API
//!
//! Requests carry no timeout; callers that need a deadline wrap the call.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::source::RepoSource;
use super::wire::{BlobResponse, RepoResponse, TreeResponse};
use crate::context::RepositoryContext;
use crate::error::{Error, Result};
use crate::tree::TreeEntry;

/// Public host whose API lives on a separate subdomain
const PUBLIC_HOST: &str = "github.com";
const PUBLIC_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("repotree/", env!("CARGO_PKG_VERSION"));

/// API base URL for a web host: the public site uses its API subdomain,
/// enterprise installs serve the API under `/api/v3`.
pub fn api_url_for_host(host: &str) -> String {
    let host = host
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    if host == PUBLIC_HOST {
        PUBLIC_API_URL.to_string()
    } else {
        format!("https://{}/api/v3", host)
    }
}

pub struct GitHubClient {
    http: Client,
    api_url: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Client for the API belonging to `host` (e.g. "github.com")
    pub fn new(host: &str, token: Option<String>) -> Result<Self> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self::with_client(http, api_url_for_host(host), token))
    }

    /// Client with a custom reqwest client and explicit API base URL
    pub fn with_client(http: Client, api_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn repo_url(&self, context: &RepositoryContext, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.api_url, context.owner, context.name, suffix
        )
    }

    fn trees_url(&self, context: &RepositoryContext, tree_ish: &str) -> String {
        self.repo_url(context, &format!("/git/trees/{}", tree_ish))
    }

    fn blobs_url(&self, context: &RepositoryContext, sha: &str) -> String {
        self.repo_url(context, &format!("/git/blobs/{}", sha))
    }

    async fn get(&self, url: &str, query: &[(&str, &str)], subject: &str) -> Result<Response> {
        let mut req = self
            .http
            .get(url)
            .header(ACCEPT, "application/vnd.github+json");
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(token) = &self.token {
            req = req.header(AUTHORIZATION, format!("token {}", token));
        }

        let response = req.send().await?;
        let remaining = rate_limit_remaining(&response);
        check_status(response.status(), remaining, subject)?;
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        subject: &str,
    ) -> Result<T> {
        let response = self.get(url, query, subject).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl RepoSource for GitHubClient {
    async fn list_tree(
        &self,
        context: &RepositoryContext,
        tree_ish: &str,
        recursive: bool,
    ) -> Result<Vec<TreeEntry>> {
        let url = self.trees_url(context, tree_ish);
        let query: &[(&str, &str)] = if recursive { &[("recursive", "1")] } else { &[] };
        debug!(%url, recursive, "fetching tree listing");

        let listing: TreeResponse = self.get_json(&url, query, tree_ish).await?;
        listing.into_entries(tree_ish)
    }

    async fn blob_content(&self, context: &RepositoryContext, sha: &str) -> Result<String> {
        let url = self.blobs_url(context, sha);
        let blob: BlobResponse = self.get_json(&url, &[], sha).await?;
        blob.into_content(sha)
    }

    async fn default_branch(&self, context: &RepositoryContext) -> Result<Option<String>> {
        let url = self.repo_url(context, "");
        let repo: RepoResponse = self.get_json(&url, &[], &context.key()).await?;
        Ok(repo.default_branch.filter(|b| !b.is_empty()))
    }
}

fn rate_limit_remaining(response: &Response) -> Option<u64> {
    response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Map a response status to the engine's error kinds.
///
/// 206 is a success status on the wire but means the listing was cut short.
pub fn check_status(status: StatusCode, rate_limit_remaining: Option<u64>, subject: &str) -> Result<()> {
    match status {
        StatusCode::PARTIAL_CONTENT => Err(Error::Truncated {
            path: subject.to_string(),
        }),
        s if s.is_success() => Ok(()),
        StatusCode::UNAUTHORIZED => Err(Error::transport(
            Some(401),
            "invalid or expired access token",
        )),
        StatusCode::FORBIDDEN => {
            let message = if rate_limit_remaining == Some(0) {
                "API rate limit exceeded; configure an access token to raise the limit"
            } else {
                "access forbidden; the token may lack repository scope"
            };
            Err(Error::transport(Some(403), message))
        }
        StatusCode::NOT_FOUND => Err(Error::NotFound(format!(
            "'{}' (private repository or bad ref)",
            subject
        ))),
        StatusCode::CONFLICT => Err(Error::NotFound("repository is empty".to_string())),
        s => Err(Error::transport(
            Some(s.as_u16()),
            format!("unexpected status code: {}", s),
        )),
    }
}
