// ABOUTME: GitHub REST client: repository metadata, recursive tree listing, raw file content.
// ABOUTME: One shared reqwest client; the token is supplied per call so requests can override it.

use reqwest::{RequestBuilder, Url};
use serde::Deserialize;

use crate::error::GithubError;
use crate::repo::{RepoRef, RepositoryEntry, RepositoryInfo, parse_repo_url};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = "vibe-assistant";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw+json";
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";

#[derive(Debug, Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeNode>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeNode {
    path: String,
    #[serde(rename = "type")]
    node_type: String,
    #[serde(default)]
    size: Option<u64>,
    sha: String,
}

impl From<TreeNode> for RepositoryEntry {
    fn from(node: TreeNode) -> Self {
        let entry_type = match node.node_type.as_str() {
            "blob" => "file",
            "tree" => "dir",
            "commit" => "submodule",
            other => other,
        };
        RepositoryEntry {
            path: node.path,
            entry_type: entry_type.to_string(),
            size: node.size,
            sha: node.sha,
        }
    }
}

/// Client for the subset of the GitHub REST API the assistant needs.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for GithubClient {
    fn default() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl GithubClient {
    /// Create a client against `base_url` (e.g. a GitHub Enterprise API root).
    pub fn new(base_url: &str) -> Result<Self, GithubError> {
        let parsed =
            Url::parse(base_url).map_err(|e| GithubError::InvalidBaseUrl(e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(GithubError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, GithubError> {
        let invalid = || GithubError::InvalidBaseUrl(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get(&self, url: Url, token: Option<&str>, accept: &str) -> RequestBuilder {
        let request = self
            .http
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, accept)
            .header("X-GitHub-Api-Version", API_VERSION);
        match token.filter(|t| !t.is_empty()) {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(request: RequestBuilder) -> Result<reqwest::Response, GithubError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = GithubError::from_status(status, &body);
        tracing::warn!(status = status.as_u16(), "github request failed: {}", err);
        Err(err)
    }

    async fn repository(
        &self,
        repo: &RepoRef,
        token: Option<&str>,
    ) -> Result<RepositoryInfo, GithubError> {
        let url = self.endpoint(["repos", repo.owner.as_str(), repo.name.as_str()])?;
        let response = Self::send(self.get(url, token, JSON_MEDIA_TYPE)).await?;
        response
            .json()
            .await
            .map_err(|e| GithubError::InvalidResponse(e.to_string()))
    }

    /// Fetch basic repository metadata.
    pub async fn get_repository(
        &self,
        repo_url: &str,
        token: Option<&str>,
    ) -> Result<RepositoryInfo, GithubError> {
        let repo = parse_repo_url(repo_url)?;
        self.repository(&repo, token).await
    }

    /// List every file and directory on the default branch, recursively.
    pub async fn list_files(
        &self,
        repo_url: &str,
        token: Option<&str>,
    ) -> Result<Vec<RepositoryEntry>, GithubError> {
        let repo = parse_repo_url(repo_url)?;
        let info = self.repository(&repo, token).await?;

        let mut url = self.endpoint([
            "repos",
            repo.owner.as_str(),
            repo.name.as_str(),
            "git",
            "trees",
            info.default_branch.as_str(),
        ])?;
        url.query_pairs_mut().append_pair("recursive", "1");

        let response = Self::send(self.get(url, token, JSON_MEDIA_TYPE)).await?;
        let tree: TreeResponse = response
            .json()
            .await
            .map_err(|e| GithubError::InvalidResponse(e.to_string()))?;

        if tree.truncated {
            tracing::warn!(repo = %repo.full_name(), "tree listing was truncated by GitHub");
        }
        tracing::debug!(repo = %repo.full_name(), entries = tree.tree.len(), "listed repository tree");

        Ok(tree.tree.into_iter().map(RepositoryEntry::from).collect())
    }

    /// Fetch the text content of one file on the default branch.
    pub async fn get_file_content(
        &self,
        repo_url: &str,
        file_path: &str,
        token: Option<&str>,
    ) -> Result<String, GithubError> {
        let repo = parse_repo_url(repo_url)?;

        let segments = ["repos", repo.owner.as_str(), repo.name.as_str(), "contents"]
            .into_iter()
            .chain(file_path.split('/').filter(|s| !s.is_empty()));
        let url = self.endpoint(segments)?;

        let response = Self::send(self.get(url, token, RAW_MEDIA_TYPE)).await?;
        Ok(response.text().await?)
    }

    /// Check the token can see `repo_url` and return its metadata.
    pub async fn test_connection(
        &self,
        repo_url: &str,
        token: Option<&str>,
    ) -> Result<RepositoryInfo, GithubError> {
        let info = self.get_repository(repo_url, token).await?;
        tracing::info!(repo = %info.full_name, "github connection verified");
        Ok(info)
    }
}
