use super::StateDurations;
use crate::HashMap;
use compact_str::CompactString;
use core::time::Duration;

/// Per-status totals across a batch of issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateAggregate {
    /// Time spent in the status, summed over all issues.
    pub total: Duration,

    /// Number of times any issue entered the status.
    pub entries: u64,

    /// Number of issues that were in the status at least once.
    pub issues: u64,
}

impl StateAggregate {
    #[must_use]
    pub fn total_seconds(&self) -> f64 {
        self.total.as_secs_f64()
    }

    /// Average time spent in the status by the issues that experienced it.
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "issue counts are far below f64 precision limits")]
    pub fn average_seconds(&self) -> f64 {
        if self.issues == 0 {
            return 0.0;
        }
        self.total_seconds() / self.issues as f64
    }

    /// Average number of times an issue entered the status.
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "issue counts are far below f64 precision limits")]
    pub fn average_entries(&self) -> f64 {
        if self.issues == 0 {
            return 0.0;
        }
        self.entries as f64 / self.issues as f64
    }

    /// Whether issues bounced back into this status more often than `threshold` times on average.
    #[must_use]
    pub fn is_rework(&self, threshold: f64) -> bool {
        self.average_entries() > threshold
    }
}

/// Aggregation of [`StateDurations`] over a batch of issues.
#[derive(Debug, Clone, Default)]
pub struct StateSummary {
    states: HashMap<CompactString, StateAggregate>,
    analyzed_issues: u64,
    excluded_issues: u64,
    skipped_events: u64,
    clamped_intervals: u64,
}

impl StateSummary {
    pub fn add(&mut self, durations: &StateDurations) {
        let quality = durations.quality();
        self.skipped_events += u64::from(quality.skipped_events);
        self.clamped_intervals += u64::from(quality.clamped_intervals);

        if quality.missing_created {
            self.excluded_issues += 1;
            return;
        }

        self.analyzed_issues += 1;
        for (status, stats) in durations.iter() {
            let aggregate = self.states.entry(status.into()).or_default();
            aggregate.total += stats.total;
            aggregate.entries += u64::from(stats.entries);
            aggregate.issues += 1;
        }
    }

    #[must_use]
    pub fn get(&self, status: &str) -> Option<&StateAggregate> {
        self.states.get(status)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Statuses ordered by average duration, longest first, ties broken by name.
    #[must_use]
    pub fn sorted_by_average(&self) -> Vec<(&str, &StateAggregate)> {
        let mut sorted: Vec<_> = self.states.iter().map(|(status, aggregate)| (status.as_str(), aggregate)).collect();
        sorted.sort_by(|(a_name, a), (b_name, b)| {
            b.average_seconds()
                .total_cmp(&a.average_seconds())
                .then_with(|| a_name.cmp(b_name))
        });
        sorted
    }

    /// Issues that contributed to the aggregates.
    #[must_use]
    pub const fn analyzed_issues(&self) -> u64 {
        self.analyzed_issues
    }

    /// Issues left out because they had no usable creation time.
    #[must_use]
    pub const fn excluded_issues(&self) -> u64 {
        self.excluded_issues
    }

    #[must_use]
    pub const fn skipped_events(&self) -> u64 {
        self.skipped_events
    }

    #[must_use]
    pub const fn clamped_intervals(&self) -> u64 {
        self.clamped_intervals
    }
}

impl<'a> FromIterator<&'a StateDurations> for StateSummary {
    fn from_iter<I: IntoIterator<Item = &'a StateDurations>>(iter: I) -> Self {
        let mut summary = Self::default();
        for durations in iter {
            summary.add(durations);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{IssueHistory, StatusChange, compute};
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};

    const DAY: Duration = Duration::from_secs(86_400);

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + TimeDelta::days(n)
    }

    fn issue(resolved: i64, transitions: &[(i64, &str, &str)]) -> StateDurations {
        let history = IssueHistory {
            created_at: Some(day(0)),
            resolved_at: Some(day(resolved)),
            current_status: "Done".into(),
            transitions: transitions
                .iter()
                .map(|&(at, from, to)| StatusChange::new(Some(day(at)), Some(from), to))
                .collect(),
        };
        compute(&history, day(365))
    }

    #[test]
    fn test_aggregates_across_issues() {
        let first = issue(4, &[(1, "To Do", "In Progress"), (2, "In Progress", "To Do"), (3, "To Do", "Done")]);
        let second = issue(2, &[(2, "To Do", "Done")]);

        let summary: StateSummary = [&first, &second].into_iter().collect();

        let todo = summary.get("To Do").unwrap();
        assert_eq!(todo.issues, 2);
        assert_eq!(todo.entries, 3);
        assert_eq!(todo.total, 4 * DAY);
        assert!((todo.average_seconds() - 2.0 * 86_400.0).abs() < 1e-9);
        assert!((todo.average_entries() - 1.5).abs() < 1e-9);
        assert!(!todo.is_rework(1.5));

        let in_progress = summary.get("In Progress").unwrap();
        assert_eq!(in_progress.issues, 1);
        assert_eq!(in_progress.entries, 1);
        assert_eq!(in_progress.total, DAY);

        assert_eq!(summary.analyzed_issues(), 2);
        assert_eq!(summary.excluded_issues(), 0);
    }

    #[test]
    fn test_rework_flag_above_threshold() {
        let bouncy = issue(
            5,
            &[(1, "Review", "In Progress"), (2, "In Progress", "Review"), (3, "Review", "In Progress"), (4, "In Progress", "Done")],
        );

        let summary: StateSummary = [&bouncy].into_iter().collect();

        assert!(summary.get("In Progress").unwrap().is_rework(1.5));
        assert!(summary.get("Review").unwrap().is_rework(1.5));
        assert!(!summary.get("Done").unwrap().is_rework(1.5));
    }

    #[test]
    fn test_excluded_issues_contribute_nothing() {
        let good = issue(2, &[(1, "New", "Done")]);
        let missing = compute(
            &IssueHistory {
                created_at: None,
                resolved_at: Some(day(2)),
                current_status: "Done".into(),
                transitions: Vec::new(),
            },
            day(365),
        );

        let summary: StateSummary = [&good, &missing].into_iter().collect();

        assert_eq!(summary.analyzed_issues(), 1);
        assert_eq!(summary.excluded_issues(), 1);
        assert_eq!(summary.get("Done").unwrap().issues, 1);
    }

    #[test]
    fn test_sorted_by_average_descending() {
        let first = issue(10, &[(1, "New", "In Progress"), (9, "In Progress", "Done")]);
        let summary: StateSummary = [&first].into_iter().collect();

        let order: Vec<&str> = summary.sorted_by_average().into_iter().map(|(name, _)| name).collect();
        assert_eq!(order, vec!["In Progress", "Done", "New"]);
    }

    #[test]
    fn test_empty_summary() {
        let summary = StateSummary::default();
        assert!(summary.is_empty());
        assert!(summary.sorted_by_average().is_empty());
    }
}
