//! Commit URL parsing
//!
//! A `commit_url` encodes the VCS host, the repository and the commit SHA.
//! The repository URL is everything before the host's commit marker.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CoreError, Result};

/// Length of a full git commit SHA in hex
pub const COMMIT_SHA_LEN: usize = 40;

/// CI system / VCS host an artifact was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CiSystem {
    Github,
    Gitlab,
}

impl CiSystem {
    /// Detect provenance from the `commit_url` prefix
    pub fn detect(commit_url: &str) -> Option<Self> {
        if commit_url.starts_with("https://github.com/") {
            Some(CiSystem::Github)
        } else if commit_url.starts_with("https://gitlab.com") {
            Some(CiSystem::Gitlab)
        } else {
            None
        }
    }

    /// Path segment separating the repository URL from the commit SHA
    pub fn commit_marker(&self) -> &'static str {
        match self {
            CiSystem::Github => "/commit/",
            CiSystem::Gitlab => "/-/commit/",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CiSystem::Github => "github",
            CiSystem::Gitlab => "gitlab",
        }
    }
}

impl fmt::Display for CiSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Components of a parsed `commit_url`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRef {
    pub ci_system: CiSystem,
    pub repo_url: String,
    pub repo_name: String,
    pub commit_sha: String,
}

impl CommitRef {
    pub fn parse(commit_url: &str) -> Result<Self> {
        let ci_system = CiSystem::detect(commit_url)
            .ok_or_else(|| CoreError::UnknownProvenance(commit_url.to_string()))?;

        let malformed = || CoreError::MalformedCommitUrl(commit_url.to_string());

        let (repo_url, commit_sha) = commit_url
            .rsplit_once(ci_system.commit_marker())
            .ok_or_else(malformed)?;

        if commit_sha.len() != COMMIT_SHA_LEN
            || !commit_sha.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(malformed());
        }

        let repo_name = repo_url
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .ok_or_else(malformed)?;

        Ok(Self {
            ci_system,
            repo_url: repo_url.to_string(),
            repo_name: repo_name.to_string(),
            commit_sha: commit_sha.to_string(),
        })
    }
}
