use super::common::{MetricChange, Phase, format_metric_changes};
use super::{ComparisonTable, ParsedJiraReport};
use crate::Result;
use chrono::NaiveDate;
use ohno::app_err;

/// Settings for a Jira phase comparison.
#[derive(Debug, Clone, Copy)]
pub struct JiraComparison<'a> {
    /// Assignee the reports were filtered by, `None` for the whole team.
    pub assignee: Option<&'a str>,
    pub project: &'a str,
    pub phases: &'a [Phase],

    /// Statuses whose average time is compared.
    pub states: &'a [String],

    /// Statuses whose re-entry rate is compared.
    pub reentry_states: &'a [String],

    pub issue_types: &'a [String],
    pub top_changes: usize,
    pub generated_on: NaiveDate,
}

/// Per-phase figures derived from one parsed report.
struct PhaseColumn<'a> {
    report: &'a ParsedJiraReport,
    period_days: Option<i64>,
}

impl PhaseColumn<'_> {
    #[expect(clippy::cast_precision_loss, reason = "issue counts and day spans are far below f64 precision limits")]
    fn throughput(&self) -> Option<f64> {
        self.period_days.map(|days| {
            if days > 0 {
                self.report.total_issues as f64 / days as f64
            } else {
                0.0
            }
        })
    }

    fn state_days(&self, state: &str) -> f64 {
        self.report.state_days.get(state).copied().unwrap_or_default()
    }

    fn reentry(&self, state: &str) -> f64 {
        self.report.state_reentry.get(state).copied().unwrap_or_default()
    }
}

/// Lay out the reports side by side, one column per configured phase.
///
/// Report `i` fills phase `i`; phases beyond the available reports show empty figures.
pub fn build(reports: &[ParsedJiraReport], options: &JiraComparison<'_>) -> Result<ComparisonTable> {
    if options.phases.is_empty() {
        return Err(app_err!("no Jira phases are configured, add [[comparison.jira_phases]] entries to the configuration"));
    }

    let empty = ParsedJiraReport::default();
    let columns: Vec<PhaseColumn<'_>> = (0..options.phases.len())
        .map(|i| {
            let report = reports.get(i).unwrap_or(&empty);
            PhaseColumn {
                report,
                period_days: report.analysis_period_days(),
            }
        })
        .collect();

    let mut table = ComparisonTable::new();
    write_header(&mut table, options);

    table.row("Metric", options.phases.iter().map(|phase| phase.name.clone()));

    table.row(
        "Analysis Period",
        columns.iter().map(|c| c.period_days.map_or_else(na, |days| format!("{days}d"))),
    );
    table.row("Total Issues Completed", columns.iter().map(|c| c.report.total_issues.to_string()));
    table.row(
        "Average Closure Time",
        columns.iter().map(|c| format!("{:.2}d", c.report.average_closure_days.unwrap_or_default())),
    );
    table.row(
        "Longest Closure Time",
        columns.iter().map(|c| format!("{:.2}d", c.report.longest_closure_days.unwrap_or_default())),
    );
    table.row(
        "Daily Throughput",
        columns.iter().map(|c| c.throughput().map_or_else(na, |t| format!("{t:.2}/d"))),
    );

    for state in options.states {
        table.row(
            format!("{state} State Avg Time"),
            columns.iter().map(|c| positive(c.state_days(state)).map_or_else(na, |d| format!("{d:.2}d"))),
        );
    }

    for state in options.reentry_states {
        table.row(
            format!("{state} Re-entry Rate"),
            columns.iter().map(|c| positive(c.reentry(state)).map_or_else(na, |r| format!("{r:.2}x"))),
        );
    }

    for issue_type in options.issue_types {
        table.row(
            format!("{issue_type} Percentage"),
            columns.iter().map(|c| {
                let percentage = c.report.issue_types.get(issue_type).map_or(0.0, |share| share.percentage);
                format!("{percentage:.2}%")
            }),
        );
    }

    table.blank();
    table.text("Note: N/A values indicate no issues entered that workflow state during the period.");
    table.text("This can be positive (e.g., no blocked issues) or indicate the state isn't used in your workflow.");
    table.blank();
    table.text("Key Changes:");

    let changes = key_changes(&columns, options);
    let mut block = String::new();
    format_metric_changes(&changes, options.top_changes, &mut block)?;
    table.text_block(&block);

    Ok(table)
}

fn write_header(table: &mut ComparisonTable, options: &JiraComparison<'_>) {
    table.text(format!(
        "AI Impact Analysis Report - {}",
        options.assignee.unwrap_or("Team Overall")
    ));
    table.text(format!("Report Generated: {}", options.generated_on.format("%B %d, %Y")));
    table.text(format!("Project: {}", options.project));
    table.blank();
    table.text("This report analyzes development data across three distinct periods to evaluate");
    table.text("the impact of AI tools on team efficiency:");
    table.blank();

    for (i, phase) in options.phases.iter().enumerate() {
        table.text(format!("Phase {}: {} ({} to {})", i + 1, phase.name, phase.start, phase.end));
    }

    table.blank();
}

/// Changes from the first to the last phase, for metrics the first phase has data for.
fn key_changes(columns: &[PhaseColumn<'_>], options: &JiraComparison<'_>) -> Vec<MetricChange> {
    let [first, .., last] = columns else {
        return Vec::new();
    };

    let mut changes = Vec::new();

    changes.extend(MetricChange::relative(
        "Average Closure Time",
        first.report.average_closure_days.unwrap_or_default(),
        last.report.average_closure_days.unwrap_or_default(),
        "d",
    ));

    if let (Some(before), Some(after)) = (first.throughput(), last.throughput()) {
        changes.extend(MetricChange::relative("Daily Throughput", before, after, "/d"));
    }

    for state in options.states {
        changes.extend(MetricChange::relative(
            format!("{state} State"),
            first.state_days(state),
            last.state_days(state),
            "d",
        ));
    }

    for state in options.reentry_states {
        changes.extend(MetricChange::relative(
            format!("{state} Re-entry Rate"),
            first.reentry(state),
            last.reentry(state),
            "x",
        ));
    }

    changes
}

fn positive(value: f64) -> Option<f64> {
    (value > 0.0).then_some(value)
}

fn na() -> String {
    "N/A".to_string()
}
