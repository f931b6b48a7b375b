use crate::analysis::{IssueStats, StateSummary, Velocity};
use chrono::{DateTime, Local};

/// Everything a Jira analysis run produced, ready for the text and JSON writers.
#[derive(Debug, Clone)]
pub struct JiraReport {
    pub generated_at: DateTime<Local>,
    pub project: String,
    pub assignee: Option<String>,

    /// Filters as given on the command line.
    pub start: Option<String>,
    pub end: Option<String>,
    pub status: Option<String>,

    /// Query selecting the analyzed issues.
    pub jql: String,

    /// Query selecting the completed stories used for velocity.
    pub story_jql: String,

    pub stats: IssueStats,
    pub states: StateSummary,
    pub velocity: Velocity,

    /// Average entries per issue above which a status is flagged as rework.
    pub rework_threshold: f64,
}
