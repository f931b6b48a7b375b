use super::PrMetrics;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Averages over one group of pull requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupStats {
    pub count: u64,
    pub avg_time_to_merge_days: f64,
    pub avg_time_to_first_review_hours: f64,
    pub avg_changes_requested: f64,
    pub avg_commits: f64,
    pub avg_reviewers: f64,
    pub avg_comments: f64,
    pub avg_additions: f64,
    pub avg_deletions: f64,
    pub avg_files_changed: f64,
}

impl GroupStats {
    /// Averages over `prs`, or `None` when there are none.
    ///
    /// A zero first-review time means the review could not be timed and is left out.
    #[must_use]
    pub fn from_prs(prs: &[&PrMetrics]) -> Option<Self> {
        if prs.is_empty() {
            return None;
        }

        Some(Self {
            count: prs.len() as u64,
            avg_time_to_merge_days: average(prs.iter().map(|pr| pr.time_to_merge_days)),
            avg_time_to_first_review_hours: average(
                prs.iter()
                    .filter_map(|pr| pr.time_to_first_review_hours)
                    .filter(|hours| *hours != 0.0),
            ),
            avg_changes_requested: average_count(prs.iter().map(|pr| pr.changes_requested_count)),
            avg_commits: average_count(prs.iter().map(|pr| pr.total_commits)),
            avg_reviewers: average_count(prs.iter().map(|pr| pr.reviewers_count)),
            avg_comments: average_count(prs.iter().map(|pr| pr.total_comments_count)),
            avg_additions: average_count(prs.iter().map(|pr| pr.additions)),
            avg_deletions: average_count(prs.iter().map(|pr| pr.deletions)),
            avg_files_changed: average_count(prs.iter().map(|pr| pr.changed_files)),
        })
    }
}

/// How much better the AI-assisted group did than the rest, in percent of the baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Comparison {
    pub merge_time_improvement: f64,
    pub changes_requested_reduction: f64,
}

/// Aggregate statistics for a set of pull requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrStatistics {
    pub total_prs: u64,
    pub ai_assisted_prs: u64,
    pub non_ai_prs: u64,

    /// Share of AI-assisted pull requests, in percent.
    pub ai_adoption_rate: f64,

    /// Pull request count per configured tool, in configuration order.
    pub tool_prs: Vec<(CompactString, u64)>,

    /// Pull requests that used more than one tool.
    pub multi_tool_prs: u64,

    pub ai_stats: Option<GroupStats>,
    pub non_ai_stats: Option<GroupStats>,
    pub comparison: Comparison,
}

impl PrStatistics {
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "pull request counts are far below f64 precision limits")]
    pub fn compute(prs: &[PrMetrics], ai_tools: &[CompactString]) -> Self {
        let (ai, non_ai): (Vec<&PrMetrics>, Vec<&PrMetrics>) = prs.iter().partition(|pr| pr.has_ai_assistance);

        let tool_prs = ai_tools
            .iter()
            .map(|tool| (tool.clone(), ai.iter().filter(|pr| pr.used_tool(tool)).count() as u64))
            .collect();

        let ai_stats = GroupStats::from_prs(&ai);
        let non_ai_stats = GroupStats::from_prs(&non_ai);

        let total_prs = prs.len() as u64;
        let ai_adoption_rate = if total_prs == 0 {
            0.0
        } else {
            ai.len() as f64 / total_prs as f64 * 100.0
        };

        let ai_or_zero = ai_stats.unwrap_or_default();
        let non_ai_or_zero = non_ai_stats.unwrap_or_default();

        Self {
            total_prs,
            ai_assisted_prs: ai.len() as u64,
            non_ai_prs: non_ai.len() as u64,
            ai_adoption_rate,
            tool_prs,
            multi_tool_prs: ai.iter().filter(|pr| pr.ai_tools.len() > 1).count() as u64,
            ai_stats,
            non_ai_stats,
            comparison: Comparison {
                merge_time_improvement: reduction(non_ai_or_zero.avg_time_to_merge_days, ai_or_zero.avg_time_to_merge_days),
                changes_requested_reduction: reduction(non_ai_or_zero.avg_changes_requested, ai_or_zero.avg_changes_requested),
            },
        }
    }

    /// JSON form written into the metrics report.
    ///
    /// Per-tool counts become `<tool>_prs` keys and empty groups become empty objects, so
    /// the shape depends on the configured tools.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        let _ = map.insert("total_prs".into(), self.total_prs.into());
        let _ = map.insert("ai_assisted_prs".into(), self.ai_assisted_prs.into());
        let _ = map.insert("non_ai_prs".into(), self.non_ai_prs.into());
        let _ = map.insert("ai_adoption_rate".into(), self.ai_adoption_rate.into());

        for (tool, count) in &self.tool_prs {
            let _ = map.insert(format!("{}_prs", tool.to_lowercase()), (*count).into());
        }
        let _ = map.insert("both_tools_prs".into(), self.multi_tool_prs.into());

        let _ = map.insert("ai_stats".into(), group_json(self.ai_stats));
        let _ = map.insert("non_ai_stats".into(), group_json(self.non_ai_stats));
        let _ = map.insert(
            "comparison".into(),
            serde_json::to_value(self.comparison).unwrap_or_else(|_| Value::Object(Map::new())),
        );

        Value::Object(map)
    }
}

/// Averages across every pull request of a report, used for phase comparisons.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverallMetrics {
    pub avg_time_to_merge_days: f64,
    pub avg_time_to_first_review_hours: f64,
    pub avg_changes_requested: f64,
    pub avg_commits: f64,
    pub avg_reviewers: f64,
    pub avg_comments: f64,
    pub avg_additions: f64,
    pub avg_deletions: f64,
    pub avg_files_changed: f64,
    pub avg_human_reviewers: f64,
    pub avg_human_comments: f64,
    pub avg_human_substantive_comments: f64,
}

impl OverallMetrics {
    /// Pull requests that were never reviewed do not count towards the first-review average.
    #[must_use]
    pub fn compute(prs: &[PrMetrics]) -> Self {
        Self {
            avg_time_to_merge_days: average(prs.iter().map(|pr| pr.time_to_merge_days)),
            avg_time_to_first_review_hours: average(prs.iter().filter_map(|pr| pr.time_to_first_review_hours)),
            avg_changes_requested: average_count(prs.iter().map(|pr| pr.changes_requested_count)),
            avg_commits: average_count(prs.iter().map(|pr| pr.total_commits)),
            avg_reviewers: average_count(prs.iter().map(|pr| pr.reviewers_count)),
            avg_comments: average_count(prs.iter().map(|pr| pr.total_comments_count)),
            avg_additions: average_count(prs.iter().map(|pr| pr.additions)),
            avg_deletions: average_count(prs.iter().map(|pr| pr.deletions)),
            avg_files_changed: average_count(prs.iter().map(|pr| pr.changed_files)),
            avg_human_reviewers: average_count(prs.iter().map(|pr| pr.human_reviewers_count)),
            avg_human_comments: average_count(prs.iter().map(|pr| pr.human_total_comments_count)),
            avg_human_substantive_comments: average_count(prs.iter().map(|pr| pr.human_substantive_comments_count)),
        }
    }
}

fn group_json(stats: Option<GroupStats>) -> Value {
    stats
        .and_then(|stats| serde_json::to_value(stats).ok())
        .unwrap_or_else(|| Value::Object(Map::new()))
}

/// Relative drop from `baseline` to `value`, in percent; zero without a baseline.
fn reduction(baseline: f64, value: f64) -> f64 {
    if baseline > 0.0 {
        (baseline - value) / baseline * 100.0
    } else {
        0.0
    }
}

#[expect(clippy::cast_precision_loss, reason = "sample counts are far below f64 precision limits")]
fn average(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0_u64), |(sum, n), v| (sum + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

#[expect(clippy::cast_precision_loss, reason = "counts are far below f64 precision limits")]
fn average_count(values: impl Iterator<Item = u64>) -> f64 {
    average(values.map(|v| v as f64))
}
