// ABOUTME: GitHub REST adapter for vibe-assistant.
// ABOUTME: Lists repository trees, fetches raw file content, and verifies token access.

pub mod client;
pub mod error;
pub mod repo;

pub use client::{DEFAULT_API_URL, GithubClient};
pub use error::GithubError;
pub use repo::{RepoRef, RepositoryEntry, RepositoryInfo, parse_repo_url};
