use crate::HashMap;
use crate::facts::jira::Issue;
use chrono::{DateTime, Utc};
use compact_str::CompactString;

const SECONDS_PER_HOUR: f64 = 3600.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Time from creation to resolution across resolved issues.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosureStats {
    /// Issues with both a creation and a resolution time.
    pub analyzed: u64,
    pub average_seconds: f64,
    pub min_seconds: f64,
    pub max_seconds: f64,
}

impl ClosureStats {
    #[must_use]
    pub fn average_days(&self) -> f64 {
        self.average_seconds / SECONDS_PER_DAY
    }

    #[must_use]
    pub fn average_hours(&self) -> f64 {
        self.average_seconds / SECONDS_PER_HOUR
    }

    #[must_use]
    pub fn min_days(&self) -> f64 {
        self.min_seconds / SECONDS_PER_DAY
    }

    #[must_use]
    pub fn max_days(&self) -> f64 {
        self.max_seconds / SECONDS_PER_DAY
    }
}

/// Creation and resolution bounds of the resolved issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub earliest_created: DateTime<Utc>,
    pub latest_created: DateTime<Utc>,
    pub earliest_resolved: DateTime<Utc>,
    pub latest_resolved: DateTime<Utc>,
}

impl TimeRange {
    /// Whole days from the first creation to the last resolution.
    #[must_use]
    pub fn span_days(&self) -> i64 {
        (self.latest_resolved - self.earliest_created).num_days()
    }
}

/// Summary figures for a batch of issues.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueStats {
    pub total: u64,

    /// Issue count per type, most common first.
    pub issue_types: Vec<(CompactString, u64)>,

    pub closure: Option<ClosureStats>,
    pub time_range: Option<TimeRange>,
}

impl IssueStats {
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "issue counts are far below f64 precision limits")]
    pub fn compute(issues: &[Issue]) -> Self {
        let mut types: HashMap<&str, u64> = HashMap::default();
        let mut resolved: Vec<(DateTime<Utc>, DateTime<Utc>)> = Vec::new();

        for issue in issues {
            *types.entry(issue.issue_type()).or_default() += 1;

            if let (Some(created), Some(resolved_at)) = (issue.created_at(), issue.resolved_at()) {
                resolved.push((created, resolved_at));
            }
        }

        let mut issue_types: Vec<(CompactString, u64)> = types.into_iter().map(|(name, count)| (name.into(), count)).collect();
        issue_types.sort_by(|(a_name, a), (b_name, b)| b.cmp(a).then_with(|| a_name.cmp(b_name)));

        let closure = (!resolved.is_empty()).then(|| {
            let seconds: Vec<f64> = resolved
                .iter()
                .map(|(created, resolved_at)| (*resolved_at - *created).num_milliseconds() as f64 / 1000.0)
                .collect();

            ClosureStats {
                analyzed: seconds.len() as u64,
                average_seconds: seconds.iter().sum::<f64>() / seconds.len() as f64,
                min_seconds: seconds.iter().copied().fold(f64::INFINITY, f64::min),
                max_seconds: seconds.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            }
        });

        let time_range = resolved.iter().fold(None, |range: Option<TimeRange>, &(created, resolved_at)| {
            Some(match range {
                None => TimeRange {
                    earliest_created: created,
                    latest_created: created,
                    earliest_resolved: resolved_at,
                    latest_resolved: resolved_at,
                },
                Some(r) => TimeRange {
                    earliest_created: r.earliest_created.min(created),
                    latest_created: r.latest_created.max(created),
                    earliest_resolved: r.earliest_resolved.min(resolved_at),
                    latest_resolved: r.latest_resolved.max(resolved_at),
                },
            })
        });

        Self {
            total: issues.len() as u64,
            issue_types,
            closure,
            time_range,
        }
    }

    /// Share of issues of the given type, in percent.
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "issue counts are far below f64 precision limits")]
    pub fn type_percentage(&self, count: u64) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64 * 100.0
        }
    }
}

/// Story point throughput of completed stories.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
    pub total_stories: u64,
    pub stories_with_points: u64,
    pub total_points: f64,
}

impl Velocity {
    /// Stories without an estimate, or estimated at zero, do not count towards the points.
    #[must_use]
    pub fn compute(stories: &[Issue], story_points_field: &str) -> Self {
        let mut velocity = Self {
            total_stories: stories.len() as u64,
            ..Self::default()
        };

        for points in stories.iter().filter_map(|story| story.story_points(story_points_field)) {
            if points > 0.0 {
                velocity.total_points += points;
                velocity.stories_with_points += 1;
            }
        }

        velocity
    }

    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "story counts are far below f64 precision limits")]
    pub fn average_points(&self) -> Option<f64> {
        (self.stories_with_points > 0).then(|| self.total_points / self.stories_with_points as f64)
    }
}
