use super::JiraReport;
use super::common::{SECONDS_PER_DAY, SECONDS_PER_HOUR};
use crate::Result;
use crate::analysis::ClosureStats;
use core::fmt::Write;
use serde_json::{Map, Value, json};

/// Write the Jira analysis as machine-readable JSON.
#[expect(unused_results, reason = "Map::insert returns the previous value, keys are unique here")]
pub fn generate<W: Write>(report: &JiraReport, writer: &mut W) -> Result<()> {
    let closure = report.stats.closure.as_ref();

    let mut states = Map::new();
    for (state, aggregate) in report.states.sorted_by_average() {
        let average_seconds = aggregate.average_seconds();
        states.insert(
            state.to_string(),
            json!({
                "total_count": aggregate.entries,
                "issue_count": aggregate.issues,
                "average_seconds": average_seconds,
                "average_days": average_seconds / SECONDS_PER_DAY,
                "average_hours": average_seconds / SECONDS_PER_HOUR,
                "total_seconds": aggregate.total_seconds(),
                "avg_transitions_per_issue": aggregate.average_entries(),
            }),
        );
    }

    let output = json!({
        "analysis_date": report.generated_at.to_rfc3339(),
        "project_key": report.project,
        "query_parameters": {
            "start_date": report.start,
            "end_date": report.end,
            "status": report.status,
            "assignee": report.assignee,
        },
        "jql_queries": {
            "main_analysis": report.jql,
            "velocity_calculation": report.story_jql,
        },
        "jql_query": report.jql,
        "total_issues_analyzed": report.stats.total,
        "closing_time_stats": {
            "average_days": closure.map(ClosureStats::average_days),
            "average_hours": closure.map(ClosureStats::average_hours),
            "min_days": closure.map(ClosureStats::min_days),
            "max_days": closure.map(ClosureStats::max_days),
        },
        "state_statistics": Value::Object(states),
        "velocity_stats": {
            "query_used": report.story_jql,
            "total_stories": report.velocity.total_stories,
            "total_story_points": report.velocity.total_points,
            "stories_with_points": report.velocity.stories_with_points,
        },
        "data_quality": {
            "excluded_issues": report.states.excluded_issues(),
            "skipped_events": report.states.skipped_events(),
            "clamped_intervals": report.states.clamped_intervals(),
        },
    });

    write!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}
