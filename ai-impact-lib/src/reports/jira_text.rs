use super::JiraReport;
use super::common::format_duration;
use crate::Result;
use crate::analysis::{REPORT_TIMESTAMP_FORMAT, format_report_timestamp};
use core::fmt::Write;

const RULE_WIDTH: usize = 100;

/// Write the Jira analysis as the plain-text report that `compare-jira` reads back.
pub fn generate<W: Write>(report: &JiraReport, writer: &mut W) -> Result<()> {
    let rule = "=".repeat(RULE_WIDTH);

    writeln!(writer, "{rule}")?;
    match &report.assignee {
        Some(assignee) => writeln!(writer, "JIRA Data Analysis Report - {assignee}")?,
        None => writeln!(writer, "JIRA Data Analysis Report")?,
    }
    writeln!(writer, "{rule}")?;
    writeln!(writer)?;
    writeln!(writer, "Generated: {}", report.generated_at.format(REPORT_TIMESTAMP_FORMAT))?;
    writeln!(writer, "Project: {}", report.project)?;
    if let Some(assignee) = &report.assignee {
        writeln!(writer, "Assignee: {assignee}")?;
    }
    writeln!(writer, "JQL Query: {}", report.jql)?;
    writeln!(writer)?;

    write_time_range(report, writer)?;
    write_issue_types(report, writer)?;
    write_closure(report, writer)?;
    write_states(report, &rule, writer)?;
    write_velocity(report, writer)?;

    Ok(())
}

fn write_time_range<W: Write>(report: &JiraReport, writer: &mut W) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "--- Data Time Range ---")?;

    if let Some(range) = &report.stats.time_range {
        writeln!(writer, "Earliest Created: {}", format_report_timestamp(range.earliest_created))?;
        writeln!(writer, "Latest Created: {}", format_report_timestamp(range.latest_created))?;
        writeln!(writer, "Earliest Resolved: {}", format_report_timestamp(range.earliest_resolved))?;
        writeln!(writer, "Latest Resolved: {}", format_report_timestamp(range.latest_resolved))?;
        writeln!(writer, "Data Span: {} days", range.span_days())?;
    }

    Ok(())
}

fn write_issue_types<W: Write>(report: &JiraReport, writer: &mut W) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "--- Issue Type Statistics ---")?;
    writeln!(writer, "Total: {} issues", report.stats.total)?;

    for (issue_type, count) in &report.stats.issue_types {
        let percentage = report.stats.type_percentage(*count);
        writeln!(writer, "  {:<20} {count:>5} ({percentage:>5.1}%)", issue_type.as_str())?;
    }

    Ok(())
}

fn write_closure<W: Write>(report: &JiraReport, writer: &mut W) -> Result<()> {
    writeln!(writer)?;

    let Some(closure) = &report.stats.closure else {
        writeln!(writer, "No valid closing time data found.")?;
        return Ok(());
    };

    writeln!(writer, "--- Task Closure Time Statistics ---")?;
    writeln!(writer, "Successfully analyzed issues: {}", closure.analyzed)?;
    writeln!(
        writer,
        "Average Closure Time: {:.2} days ({:.2} hours)",
        closure.average_days(),
        closure.average_hours()
    )?;
    writeln!(writer, "Shortest Closure Time: {:.2} days", closure.min_days())?;
    writeln!(writer, "Longest Closure Time: {:.2} days", closure.max_days())?;

    Ok(())
}

fn write_states<W: Write>(report: &JiraReport, rule: &str, writer: &mut W) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "--- State Duration Analysis ---")?;

    if report.states.is_empty() {
        writeln!(writer, "Unable to retrieve state transition data")?;
        return Ok(());
    }

    let sorted = report.states.sorted_by_average();

    writeln!(writer)?;
    writeln!(writer, "Analyzed {} issues state transitions", report.stats.total)?;
    writeln!(writer)?;
    writeln!(
        writer,
        "{:<20} {:<12} {:<15} {:<20} {:<20}",
        "State", "Occurrences", "Issues Affected", "Avg Duration", "Total Duration"
    )?;
    writeln!(writer, "{rule}")?;

    for (state, aggregate) in &sorted {
        writeln!(
            writer,
            "{state:<20} {:<12} {:<15} {:<20} {:<20}",
            aggregate.entries,
            aggregate.issues,
            format_duration(aggregate.average_seconds()),
            format_duration(aggregate.total_seconds())
        )?;
    }

    writeln!(writer)?;
    writeln!(writer, "--- Detailed State Analysis ---")?;

    for (state, aggregate) in &sorted {
        writeln!(writer)?;
        writeln!(writer, "{state}:")?;
        writeln!(writer, "  - {} issues experienced this state", aggregate.issues)?;
        writeln!(
            writer,
            "  - Average times per issue entering this state {:.2} times",
            aggregate.average_entries()
        )?;
        if aggregate.is_rework(report.rework_threshold) {
            writeln!(
                writer,
                "  ⚠️  Warning: This state was entered multiple times, indicating possible back-and-forth transitions"
            )?;
        }
    }

    Ok(())
}

fn write_velocity<W: Write>(report: &JiraReport, writer: &mut W) -> Result<()> {
    let velocity = &report.velocity;

    writeln!(writer)?;
    writeln!(writer, "--- Velocity (Story Points) ---")?;

    if velocity.total_stories == 0 {
        writeln!(writer, "No stories found matching the criteria.")?;
        return Ok(());
    }

    writeln!(writer, "Completed Stories Count: {}", velocity.total_stories)?;
    writeln!(writer, "Stories with Story Points: {}", velocity.stories_with_points)?;
    writeln!(writer, "Total Story Points: {:.1}", velocity.total_points)?;
    if let Some(average) = velocity.average_points() {
        writeln!(writer, "Average Points per Story: {average:.2}")?;
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::analysis::{IssueHistory, IssueStats, StateSummary, StatusChange, Velocity, compute};
    use crate::facts::jira::Issue;
    use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + TimeDelta::days(n)
    }

    fn issue(json: &str) -> Issue {
        serde_json::from_str(json).unwrap()
    }

    pub(crate) fn sample_report() -> JiraReport {
        let issues = vec![
            issue(
                r#"{ "key": "P-1", "fields": { "created": "2024-01-01T00:00:00.000+0000", "resolutiondate": "2024-01-05T00:00:00.000+0000",
                     "issuetype": { "name": "Story" } } }"#,
            ),
            issue(
                r#"{ "key": "P-2", "fields": { "created": "2024-01-02T00:00:00.000+0000", "resolutiondate": "2024-01-03T00:00:00.000+0000",
                     "issuetype": { "name": "Bug" } } }"#,
            ),
        ];

        let bouncing = IssueHistory {
            created_at: Some(day(0)),
            resolved_at: Some(day(4)),
            current_status: "Done".into(),
            transitions: vec![
                StatusChange::new(Some(day(1)), Some("New"), "In Progress"),
                StatusChange::new(Some(day(2)), Some("In Progress"), "Review"),
                StatusChange::new(Some(day(2) + TimeDelta::hours(6)), Some("Review"), "In Progress"),
                StatusChange::new(Some(day(3)), Some("In Progress"), "Done"),
            ],
        };
        let direct = IssueHistory {
            created_at: Some(day(1)),
            resolved_at: Some(day(2)),
            current_status: "Done".into(),
            transitions: vec![StatusChange::new(Some(day(1) + TimeDelta::hours(12)), Some("New"), "Done")],
        };
        let durations = [compute(&bouncing, day(30)), compute(&direct, day(30))];

        JiraReport {
            generated_at: Local.with_ymd_and_hms(2024, 2, 1, 9, 30, 0).unwrap(),
            project: "Konflux UI".into(),
            assignee: Some("jdoe@example.com".into()),
            start: Some("2024-01-01".into()),
            end: Some("2024-01-31".into()),
            status: None,
            jql: r#"project = "Konflux UI" AND assignee = "jdoe@example.com" AND resolved >= "-31d""#.into(),
            story_jql: r#"project = "Konflux UI" AND issuetype = Story AND resolved >= "-31d""#.into(),
            stats: IssueStats::compute(&issues),
            states: durations.iter().collect::<StateSummary>(),
            velocity: Velocity {
                total_stories: 3,
                stories_with_points: 2,
                total_points: 8.0,
            },
            rework_threshold: 1.5,
        }
    }

    #[test]
    fn test_generate_full_report() {
        let mut out = String::new();
        generate(&sample_report(), &mut out).unwrap();

        // columns are padded, so compare without trailing spaces
        let out: Vec<&str> = out.lines().map(str::trim_end).collect();
        insta::assert_snapshot!(out.join("\n"), @r#"
        ====================================================================================================
        JIRA Data Analysis Report - jdoe@example.com
        ====================================================================================================

        Generated: 2024-02-01 09:30:00
        Project: Konflux UI
        Assignee: jdoe@example.com
        JQL Query: project = "Konflux UI" AND assignee = "jdoe@example.com" AND resolved >= "-31d"


        --- Data Time Range ---
        Earliest Created: 2024-01-01 00:00:00
        Latest Created: 2024-01-02 00:00:00
        Earliest Resolved: 2024-01-03 00:00:00
        Latest Resolved: 2024-01-05 00:00:00
        Data Span: 4 days

        --- Issue Type Statistics ---
        Total: 2 issues
          Bug                      1 ( 50.0%)
          Story                    1 ( 50.0%)

        --- Task Closure Time Statistics ---
        Successfully analyzed issues: 2
        Average Closure Time: 2.50 days (60.00 hours)
        Shortest Closure Time: 1.00 days
        Longest Closure Time: 4.00 days

        --- State Duration Analysis ---

        Analyzed 2 issues state transitions

        State                Occurrences  Issues Affected Avg Duration         Total Duration
        ====================================================================================================
        In Progress          2            1               1.75 days            1.75 days
        Done                 2            2               18.00 hours          1.50 days
        New                  2            2               18.00 hours          1.50 days
        Review               1            1               6.00 hours           6.00 hours

        --- Detailed State Analysis ---

        In Progress:
          - 1 issues experienced this state
          - Average times per issue entering this state 2.00 times
          ⚠️  Warning: This state was entered multiple times, indicating possible back-and-forth transitions

        Done:
          - 2 issues experienced this state
          - Average times per issue entering this state 1.00 times

        New:
          - 2 issues experienced this state
          - Average times per issue entering this state 1.00 times

        Review:
          - 1 issues experienced this state
          - Average times per issue entering this state 1.00 times

        --- Velocity (Story Points) ---
        Completed Stories Count: 3
        Stories with Story Points: 2
        Total Story Points: 8.0
        Average Points per Story: 4.00
        "#);
    }

    #[test]
    fn test_generate_without_data() {
        let report = JiraReport {
            assignee: None,
            stats: IssueStats::default(),
            states: StateSummary::default(),
            velocity: Velocity::default(),
            ..sample_report()
        };

        let mut out = String::new();
        generate(&report, &mut out).unwrap();

        assert!(out.contains("\nJIRA Data Analysis Report\n"));
        assert!(!out.contains("Assignee:"));
        assert!(out.contains("Total: 0 issues"));
        assert!(out.contains("No valid closing time data found."));
        assert!(out.contains("Unable to retrieve state transition data"));
        assert!(out.contains("No stories found matching the criteria."));
        assert!(!out.contains("Earliest Created"));
    }
}
