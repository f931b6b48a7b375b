use chrono::{DateTime, Utc};
use compact_str::CompactString;

/// The status history of a single issue, as retrieved from the tracker.
///
/// Timestamps are optional because the tracker occasionally returns values that
/// cannot be parsed; the analysis decides how to treat the gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueHistory {
    /// When the issue was created.
    pub created_at: Option<DateTime<Utc>>,

    /// When the issue was resolved, absent while it is still open.
    pub resolved_at: Option<DateTime<Utc>>,

    /// Status in effect when the issue was retrieved.
    pub current_status: CompactString,

    /// Status changes in retrieval order, which is not necessarily chronological.
    pub transitions: Vec<StatusChange>,
}

/// One recorded move from one status to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub timestamp: Option<DateTime<Utc>>,
    pub from_status: Option<CompactString>,
    pub to_status: CompactString,
}

impl StatusChange {
    #[must_use]
    pub fn new(timestamp: Option<DateTime<Utc>>, from_status: Option<&str>, to_status: &str) -> Self {
        Self {
            timestamp,
            from_status: from_status.map(CompactString::from),
            to_status: to_status.into(),
        }
    }
}
