//! Time spent in each workflow status for a single issue.
//!
//! The computation walks the issue's status changes in chronological order,
//! attributing each interval to the status that was live during it. The final
//! interval runs until the issue was resolved or, for open issues, until the
//! caller-supplied "now".
//!
//! Malformed data never aborts the computation. Instead it is recorded in
//! [`DataQuality`] so batch callers can report how much was skipped:
//!
//! - an issue with no usable creation time produces an empty result;
//! - a status change without a usable timestamp is ignored;
//! - an interval that would be negative is clamped to zero.

use super::{IssueHistory, StatusChange};
use crate::HashMap;
use chrono::{DateTime, Utc};
use compact_str::CompactString;
use core::time::Duration;

const LOG_TARGET: &str = "  analysis";

/// Status attributed to the time before the first transition when that transition does not name its origin.
pub const UNKNOWN_STATUS: &str = "Unknown";

/// Accumulated time and entry count for one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateStats {
    /// Total wall-clock time spent in the status.
    pub total: Duration,

    /// Number of times the issue entered the status, counting the initial status once.
    pub entries: u32,
}

/// Data problems encountered while computing durations for one issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DataQuality {
    /// The issue had no usable creation time, so nothing was computed.
    pub missing_created: bool,

    /// Status changes ignored because their timestamp was missing or unparsable.
    pub skipped_events: u32,

    /// Intervals that came out negative and were counted as zero.
    pub clamped_intervals: u32,
}

/// Per-status durations for one issue.
#[derive(Debug, Clone, Default)]
pub struct StateDurations {
    states: HashMap<CompactString, StateStats>,
    quality: DataQuality,
}

impl StateDurations {
    #[must_use]
    pub fn get(&self, status: &str) -> Option<&StateStats> {
        self.states.get(status)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StateStats)> {
        self.states.iter().map(|(status, stats)| (status.as_str(), stats))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Sum of the time spent across all statuses.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.states.values().map(|stats| stats.total).sum()
    }

    #[must_use]
    pub const fn quality(&self) -> DataQuality {
        self.quality
    }

    fn enter(&mut self, status: &str) {
        if let Some(stats) = self.states.get_mut(status) {
            stats.entries += 1;
        } else {
            let _ = self.states.insert(status.into(), StateStats { total: Duration::ZERO, entries: 1 });
        }
    }

    fn accumulate(&mut self, status: &str, from: DateTime<Utc>, to: DateTime<Utc>) {
        let elapsed = match (to - from).to_std() {
            Ok(elapsed) => elapsed,
            Err(_) => {
                self.quality.clamped_intervals += 1;
                log::debug!(target: LOG_TARGET, "Clamping negative interval in status '{status}' ({from} to {to})");
                Duration::ZERO
            }
        };

        self.states.entry(status.into()).or_default().total += elapsed;
    }
}

/// Compute how long the issue spent in each status and how often it entered each one.
///
/// `now` closes the final interval of issues that are not resolved yet.
#[must_use]
pub fn compute(history: &IssueHistory, now: DateTime<Utc>) -> StateDurations {
    let mut result = StateDurations::default();

    let Some(created_at) = history.created_at else {
        result.quality.missing_created = true;
        log::debug!(target: LOG_TARGET, "Issue has no usable creation time, skipping state analysis");
        return result;
    };

    let mut events: Vec<(DateTime<Utc>, &StatusChange)> = Vec::with_capacity(history.transitions.len());
    for change in &history.transitions {
        if let Some(timestamp) = change.timestamp {
            events.push((timestamp, change));
        } else {
            result.quality.skipped_events += 1;
            log::debug!(target: LOG_TARGET, "Skipping change to status '{}' without a usable timestamp", change.to_status);
        }
    }

    // Stable, so changes recorded at the same instant keep their retrieval order
    events.sort_by_key(|&(timestamp, _)| timestamp);

    let mut current: &str = match events.first() {
        Some(&(_, first)) => first.from_status.as_deref().unwrap_or(UNKNOWN_STATUS),
        None => history.current_status.as_str(),
    };
    let mut entered_at = created_at;
    result.enter(current);

    for (timestamp, change) in events {
        result.accumulate(current, entered_at, timestamp);
        current = change.to_status.as_str();
        entered_at = timestamp;
        result.enter(current);
    }

    result.accumulate(current, entered_at, history.resolved_at.unwrap_or(now));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    const DAY: Duration = Duration::from_secs(86_400);

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + TimeDelta::days(n)
    }

    fn change(at: i64, from: &str, to: &str) -> StatusChange {
        StatusChange::new(Some(day(at)), Some(from), to)
    }

    fn history(resolved: Option<i64>, current: &str, transitions: Vec<StatusChange>) -> IssueHistory {
        IssueHistory {
            created_at: Some(day(0)),
            resolved_at: resolved.map(day),
            current_status: current.into(),
            transitions,
        }
    }

    fn stats(total: Duration, entries: u32) -> StateStats {
        StateStats { total, entries }
    }

    #[test]
    fn test_linear_workflow() {
        let issue = history(
            Some(4),
            "Done",
            vec![change(1, "New", "In Progress"), change(4, "In Progress", "Done")],
        );

        let result = compute(&issue, day(100));

        assert_eq!(result.len(), 3);
        assert_eq!(result.get("New"), Some(&stats(Duration::from_secs(86_400), 1)));
        assert_eq!(result.get("In Progress"), Some(&stats(Duration::from_secs(259_200), 1)));
        assert_eq!(result.get("Done"), Some(&stats(Duration::ZERO, 1)));
        assert_eq!(result.quality(), DataQuality::default());
    }

    #[test]
    fn test_reentry_until_now() {
        let issue = history(
            None,
            "In Progress",
            vec![
                change(1, "To Do", "In Progress"),
                change(2, "In Progress", "To Do"),
                change(3, "To Do", "In Progress"),
            ],
        );

        let result = compute(&issue, day(4));

        assert_eq!(result.get("To Do"), Some(&stats(2 * DAY, 2)));
        assert_eq!(result.get("In Progress"), Some(&stats(2 * DAY, 2)));
        assert_eq!(result.total(), 4 * DAY);
    }

    #[test]
    fn test_no_transitions_uses_current_status() {
        let issue = history(None, "Backlog", Vec::new());

        let result = compute(&issue, day(3));

        assert_eq!(result.len(), 1);
        assert_eq!(result.get("Backlog"), Some(&stats(3 * DAY, 1)));
    }

    #[test]
    fn test_round_trip_counts_both_entries() {
        let issue = history(
            Some(5),
            "A",
            vec![change(1, "A", "B"), change(3, "B", "A")],
        );

        let result = compute(&issue, day(100));

        let a = result.get("A").unwrap();
        let b = result.get("B").unwrap();
        assert_eq!(a.entries, 2);
        assert_eq!(a.total, 3 * DAY);
        assert_eq!(b.entries, 1);
        assert_eq!(b.total, 2 * DAY);
    }

    #[test]
    fn test_transitions_are_sorted_before_walking() {
        let issue = history(
            Some(4),
            "Done",
            vec![change(4, "In Progress", "Done"), change(1, "New", "In Progress")],
        );

        let result = compute(&issue, day(100));

        assert_eq!(result.get("New").unwrap().total, DAY);
        assert_eq!(result.get("In Progress").unwrap().total, 3 * DAY);
        assert_eq!(result.get("Done").unwrap().total, Duration::ZERO);
    }

    #[test]
    fn test_sum_matches_lifetime() {
        let issue = history(
            Some(30),
            "Closed",
            vec![
                change(2, "New", "Refinement"),
                change(5, "Refinement", "To Do"),
                change(9, "To Do", "In Progress"),
                change(12, "In Progress", "Review"),
                change(13, "Review", "In Progress"),
                change(20, "In Progress", "Review"),
                change(25, "Review", "Closed"),
            ],
        );

        let result = compute(&issue, day(100));

        assert_eq!(result.total(), 30 * DAY);
        assert!(result.iter().all(|(_, s)| s.entries >= 1));
    }

    #[test]
    fn test_missing_created_yields_empty_result() {
        let mut issue = history(Some(3), "Done", vec![change(1, "New", "Done")]);
        issue.created_at = None;

        let result = compute(&issue, day(10));

        assert!(result.is_empty());
        assert!(result.quality().missing_created);
    }

    #[test]
    fn test_events_without_timestamp_are_skipped() {
        let issue = history(
            Some(4),
            "Done",
            vec![
                change(1, "New", "In Progress"),
                StatusChange::new(None, Some("In Progress"), "Blocked"),
                change(4, "In Progress", "Done"),
            ],
        );

        let result = compute(&issue, day(100));

        assert!(result.get("Blocked").is_none());
        assert_eq!(result.quality().skipped_events, 1);
        assert_eq!(result.total(), 4 * DAY);
    }

    #[test]
    fn test_resolved_before_created_is_clamped() {
        let issue = IssueHistory {
            created_at: Some(day(5)),
            resolved_at: Some(day(2)),
            current_status: "Done".into(),
            transitions: Vec::new(),
        };

        let result = compute(&issue, day(100));

        assert_eq!(result.get("Done"), Some(&stats(Duration::ZERO, 1)));
        assert_eq!(result.quality().clamped_intervals, 1);
    }

    #[test]
    fn test_transition_before_created_is_clamped() {
        let issue = IssueHistory {
            created_at: Some(day(3)),
            resolved_at: Some(day(6)),
            current_status: "Done".into(),
            transitions: vec![change(1, "New", "Done")],
        };

        let result = compute(&issue, day(100));

        assert_eq!(result.get("New"), Some(&stats(Duration::ZERO, 1)));
        assert_eq!(result.get("Done"), Some(&stats(5 * DAY, 1)));
        assert_eq!(result.quality().clamped_intervals, 1);
    }

    #[test]
    fn test_unknown_origin_is_attributed_to_unknown_status() {
        let issue = history(
            Some(3),
            "Done",
            vec![StatusChange::new(Some(day(1)), None, "Done")],
        );

        let result = compute(&issue, day(100));

        assert_eq!(result.get(UNKNOWN_STATUS), Some(&stats(DAY, 1)));
        assert_eq!(result.get("Done"), Some(&stats(2 * DAY, 1)));
    }

    #[test]
    fn test_equal_timestamps_keep_input_order() {
        let issue = history(
            Some(3),
            "Review",
            vec![change(1, "New", "In Progress"), change(1, "In Progress", "Review")],
        );

        let result = compute(&issue, day(100));

        assert_eq!(result.get("New"), Some(&stats(DAY, 1)));
        assert_eq!(result.get("In Progress"), Some(&stats(Duration::ZERO, 1)));
        assert_eq!(result.get("Review"), Some(&stats(2 * DAY, 1)));
    }
}
