// ABOUTME: Repository reference parsing and the serializable shapes returned to API callers.
// ABOUTME: Accepts owner/repo shorthand, https GitHub URLs, and scp-style SSH remotes.

use serde::{Deserialize, Serialize};

use crate::error::GithubError;

/// An `owner/name` pair identifying one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Parse a repository reference.
///
/// Accepted forms:
/// - `owner/repo`
/// - `https://github.com/owner/repo`, optionally with `.git` or trailing path
/// - `git@github.com:owner/repo.git`
pub fn parse_repo_url(input: &str) -> Result<RepoRef, GithubError> {
    let trimmed = input.trim();
    let invalid = || GithubError::InvalidRepoUrl(input.to_string());

    let path = if let Some(rest) = trimmed.strip_prefix("git@github.com:") {
        rest
    } else if let Some(rest) = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
    {
        let rest = rest.strip_prefix("www.").unwrap_or(rest);
        rest.strip_prefix("github.com/").ok_or_else(invalid)?
    } else if trimmed.contains("://") || trimmed.contains('@') {
        return Err(invalid());
    } else {
        trimmed
    };

    let mut parts = path.trim_matches('/').split('/');
    let owner = parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
    let name = parts
        .next()
        .map(|s| s.strip_suffix(".git").unwrap_or(s))
        .filter(|s| !s.is_empty())
        .ok_or_else(invalid)?;

    // Shorthand must be exactly two segments; URLs may carry /tree/main etc.
    if path == trimmed && parts.next().is_some() {
        return Err(invalid());
    }

    Ok(RepoRef {
        owner: owner.to_string(),
        name: name.to_string(),
    })
}

/// One node of a recursive tree listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    pub sha: String,
}

/// Basic metadata returned by the connection test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub name: String,
    pub full_name: String,
    pub private: bool,
    pub default_branch: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(input: &str) -> (String, String) {
        let r = parse_repo_url(input).unwrap();
        (r.owner, r.name)
    }

    #[test]
    fn parses_supported_forms() {
        let expected = ("octo".to_string(), "widgets".to_string());
        assert_eq!(parsed("octo/widgets"), expected);
        assert_eq!(parsed("https://github.com/octo/widgets"), expected);
        assert_eq!(parsed("https://github.com/octo/widgets.git"), expected);
        assert_eq!(parsed("https://github.com/octo/widgets/tree/main/src"), expected);
        assert_eq!(parsed("https://www.github.com/octo/widgets/"), expected);
        assert_eq!(parsed("git@github.com:octo/widgets.git"), expected);
        assert_eq!(parsed("  octo/widgets  "), expected);
    }

    #[test]
    fn rejects_other_inputs() {
        for bad in [
            "",
            "widgets",
            "octo/",
            "a/b/c",
            "https://gitlab.com/octo/widgets",
            "ftp://github.com/octo/widgets",
            "git@gitlab.com:octo/widgets.git",
        ] {
            assert!(
                matches!(parse_repo_url(bad), Err(GithubError::InvalidRepoUrl(_))),
                "expected rejection for {:?}",
                bad
            );
        }
    }

    #[test]
    fn entry_serializes_type_and_omits_missing_size() {
        let dir = RepositoryEntry {
            path: "src".into(),
            entry_type: "dir".into(),
            size: None,
            sha: "abc".into(),
        };
        let value = serde_json::to_value(&dir).unwrap();
        assert_eq!(value["type"], "dir");
        assert!(value.get("size").is_none());
    }
}
