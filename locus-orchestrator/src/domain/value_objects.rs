//! Orchestrator value objects

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where the analysed source tree comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// `?github=owner/name`
    GitHub,
    /// `?gitlab=owner/name`
    GitLab,
    /// Multipart archive upload
    Upload,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::GitHub => "github",
            SourceKind::GitLab => "gitlab",
            SourceKind::Upload => "upload",
        }
    }

    /// Resolve a query-parameter key to a remote source kind.
    ///
    /// `upload` is deliberately not accepted here: uploads are selected by
    /// the request method, never by a query key.
    pub fn from_query_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "github" => Some(SourceKind::GitHub),
            "gitlab" => Some(SourceKind::GitLab),
            _ => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `owner/name` coordinates of a remote repository
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryId {
    owner: String,
    name: String,
}

/// Raised when a repository identifier is not exactly `owner/name`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Incorrect user/repo")]
pub struct InvalidRepositoryId;

impl RepositoryId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self, InvalidRepositoryId> {
        let owner = owner.into();
        let name = name.into();
        if owner.is_empty() || name.is_empty() || owner.contains('/') || name.contains('/') {
            return Err(InvalidRepositoryId);
        }
        Ok(Self { owner, name })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for RepositoryId {
    type Err = InvalidRepositoryId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) => Self::new(owner, name),
            _ => Err(InvalidRepositoryId),
        }
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Per-request identifier. Names the request workspace and tags its log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderToken(u64);

impl OrderToken {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OrderToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
