use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct User {
    pub login: CompactString,
}

/// A pull request as returned by the list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PullSummary {
    pub number: u64,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub user: Option<User>,

    #[serde(default)]
    pub html_url: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullSummary {
    #[must_use]
    pub fn author(&self) -> &str {
        self.user.as_ref().map_or("", |user| user.login.as_str())
    }
}

/// Diff statistics only available from the single pull request endpoint.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PullDetails {
    #[serde(default)]
    pub additions: u64,

    #[serde(default)]
    pub deletions: u64,

    #[serde(default)]
    pub changed_files: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Commit {
    pub commit: CommitDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub id: u64,

    #[serde(default)]
    pub user: Option<User>,

    #[serde(default)]
    pub body: Option<String>,

    pub state: ReviewState,

    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// An inline review comment or a conversation comment.
#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub user: Option<User>,

    #[serde(default)]
    pub body: Option<String>,
}

/// Everything collected about one merged pull request.
#[derive(Debug, Clone)]
pub struct PullFacts {
    pub summary: PullSummary,
    pub details: PullDetails,
    pub commits: Vec<Commit>,
    pub reviews: Vec<Review>,
    pub review_comments: Vec<Comment>,
    pub issue_comments: Vec<Comment>,
}
