//! Metric computation over collected Jira issues and GitHub pull requests.
//!
//! Everything here is pure: collectors in [`crate::facts`] produce the inputs, and the
//! report writers in [`crate::reports`] consume the outputs. Functions that depend on the
//! current time take it as a parameter.

mod issue_history;
mod issue_stats;
mod pr_metrics;
mod pr_stats;
mod state_durations;
mod state_summary;
mod timestamp;

pub use issue_history::{IssueHistory, StatusChange};
pub use issue_stats::{ClosureStats, IssueStats, TimeRange, Velocity};
pub use pr_metrics::{AiDetection, Classifier, PrMetrics, detect_ai_tools, is_approval_only, is_bot};
pub use pr_stats::{Comparison, GroupStats, OverallMetrics, PrStatistics};
pub use state_durations::{DataQuality, StateDurations, StateStats, UNKNOWN_STATUS, compute};
pub use state_summary::{StateAggregate, StateSummary};
pub use timestamp::{DATE_FORMAT, FILE_STAMP_FORMAT, REPORT_TIMESTAMP_FORMAT, file_stamp, format_report_timestamp, parse_date, parse_timestamp};
