use serde::{Deserialize, Serialize};

/// Identifier of a pull request. Webhook payloads carry a number, hand-written
/// payload files sometimes carry a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrId {
    Number(u64),
    Text(String),
}

impl std::fmt::Display for PrId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrId::Number(n) => write!(f, "{}", n),
            PrId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// State of a file within the pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
}

impl FileStatus {
    /// Map a GitHub `files` API status onto the three states the analyzers know.
    /// `renamed`, `copied`, `changed` and `unchanged` all count as modified.
    pub fn from_github(status: &str) -> Self {
        match status {
            "added" => FileStatus::Added,
            "removed" => FileStatus::Removed,
            _ => FileStatus::Modified,
        }
    }
}

/// One changed file as seen by the analyzers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileChange {
    /// Path relative to the repository root (e.g., "src/controllers/user.ts")
    pub filename: String,
    /// Full text of the file at the head ref. Analyzers treat `None` as "".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Unified diff hunk text as reported by GitHub
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
    pub status: FileStatus,
}

impl FileChange {
    pub fn content(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

/// The unit of work for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestPayload {
    pub id: PrId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Head branch
    pub branch: String,
    /// Base branch
    pub base: String,
    /// Repository full name (e.g., "owner/repo")
    pub repository: String,
    /// Author's login
    pub author: String,
    #[serde(default)]
    pub changes: Vec<FileChange>,
}

/// Represents the parsed components of a GitHub PR URL.
#[derive(Debug, Clone)]
pub struct PrUrl {
    pub owner: String,
    pub repo: String,
    pub pr_number: u64,
}
