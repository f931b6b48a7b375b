use super::common::{Phase, percentage_change};
use super::{ComparisonTable, PrReport};
use crate::Result;
use crate::analysis::OverallMetrics;
use chrono::NaiveDate;
use compact_str::CompactString;
use core::fmt::Write;
use ohno::app_err;

/// Settings for a PR phase comparison.
#[derive(Debug, Clone, Copy)]
pub struct PrComparison<'a> {
    /// Author the reports were filtered by, `None` for the whole team.
    pub author: Option<&'a str>,

    /// `owner/name` of the analyzed repository.
    pub repository: &'a str,

    pub phases: &'a [Phase],
    pub ai_tools: &'a [CompactString],
    pub generated_on: NaiveDate,
}

const ADOPTION_STRONG: f64 = 50.0;
const ADOPTION_MODERATE: f64 = 20.0;

/// Overall-metric rows: label, value accessor, unit.
const METRIC_ROWS: &[(&str, fn(&OverallMetrics) -> f64, &str)] = &[
    ("Avg Time to Merge (days)", |m| m.avg_time_to_merge_days, "d"),
    ("Avg Time to First Review (hours)", |m| m.avg_time_to_first_review_hours, "h"),
    ("Avg Changes Requested", |m| m.avg_changes_requested, ""),
    ("Avg Commits per PR", |m| m.avg_commits, ""),
    ("Avg Reviewers", |m| m.avg_reviewers, ""),
    ("Avg Reviewers (excl. bots)", |m| m.avg_human_reviewers, ""),
    ("Avg Comments", |m| m.avg_comments, ""),
    ("Avg Comments (excl. bots & approvals)", |m| m.avg_human_substantive_comments, ""),
    ("Avg Lines Added", |m| m.avg_additions, ""),
    ("Avg Lines Deleted", |m| m.avg_deletions, ""),
    ("Avg Files Changed", |m| m.avg_files_changed, ""),
];

/// Trend lines: label, value accessor, unit.
const TREND_ROWS: &[(&str, fn(&OverallMetrics) -> f64, &str)] = &[
    ("Avg Time to Merge", |m| m.avg_time_to_merge_days, "d"),
    ("Avg Time to First Review", |m| m.avg_time_to_first_review_hours, "h"),
    ("Avg Reviewers (excl. bots)", |m| m.avg_human_reviewers, ""),
    ("Avg Comments (excl. bots & approvals)", |m| m.avg_human_substantive_comments, ""),
];

struct PhaseColumn<'a> {
    phase: &'a Phase,
    report: &'a PrReport,

    /// `None` when the report holds no pull requests.
    overall: Option<OverallMetrics>,
}

/// Lay out PR reports side by side, ordered by period and labelled by the phase whose
/// dates they match exactly.
pub fn build(reports: &[PrReport], options: &PrComparison<'_>) -> Result<ComparisonTable> {
    if reports.len() < 2 {
        return Err(app_err!("need at least 2 PR reports for a comparison, found {}", reports.len()));
    }

    if options.phases.is_empty() {
        return Err(app_err!("no GitHub phases are configured, add [[comparison.github_phases]] entries to the configuration"));
    }

    let mut sorted: Vec<&PrReport> = reports.iter().collect();
    sorted.sort_by_key(|report| report.period.start_date);

    let columns = sorted
        .into_iter()
        .enumerate()
        .map(|(i, report)| {
            let phase = match_phase(report, options.phases).ok_or_else(|| unmatched_report(i, report, options.phases))?;
            Ok(PhaseColumn {
                phase,
                report,
                overall: (!report.prs.is_empty()).then(|| OverallMetrics::compute(&report.prs)),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut table = ComparisonTable::new();
    write_header(&mut table, &columns, options);

    table.row("Metric", columns.iter().map(|c| c.phase.name.clone()));
    table.row(
        "Total PRs Merged (excl. bot-authored)",
        columns.iter().map(|c| c.report.statistic_u64("total_prs").to_string()),
    );
    table.row(
        "AI Adoption Rate",
        columns.iter().map(|c| format!("{:.1}%", c.report.statistic_f64("ai_adoption_rate"))),
    );
    table.row(
        "AI-Assisted PRs",
        columns.iter().map(|c| c.report.statistic_u64("ai_assisted_prs").to_string()),
    );
    table.row("Non-AI PRs", columns.iter().map(|c| c.report.statistic_u64("non_ai_prs").to_string()));

    for tool in options.ai_tools {
        table.row(format!("{tool} PRs"), columns.iter().map(|c| c.report.tool_prs(tool).to_string()));
    }

    for (label, value, unit) in METRIC_ROWS {
        table.row(
            *label,
            columns
                .iter()
                .map(|c| c.overall.as_ref().map_or_else(|| "N/A".to_string(), |m| format!("{:.2}{unit}", value(m)))),
        );
    }

    for _ in 0..5 {
        table.blank();
    }

    let mut block = String::new();
    write_trends(&columns, &mut block)?;
    table.text_block(&block);

    Ok(table)
}

fn match_phase<'a>(report: &PrReport, phases: &'a [Phase]) -> Option<&'a Phase> {
    phases
        .iter()
        .find(|phase| phase.start == report.period.start_date && phase.end == report.period.end_date)
}

fn unmatched_report(index: usize, report: &PrReport, phases: &[Phase]) -> ohno::AppError {
    let available = phases
        .iter()
        .map(|phase| format!("{}: {} to {}", phase.name, phase.start, phase.end))
        .collect::<Vec<_>>()
        .join(", ");

    app_err!(
        "no configured phase matches report {} ({} to {}); available phases: {available}",
        index + 1,
        report.period.start_date,
        report.period.end_date
    )
}

fn write_header(table: &mut ComparisonTable, columns: &[PhaseColumn<'_>], options: &PrComparison<'_>) {
    table.text(format!(
        "GitHub PR Analysis - AI Impact Report - {}",
        options.author.unwrap_or("Team Overall")
    ));
    table.text(format!("Report Generated: {}", options.generated_on.format("%B %d, %Y")));
    table.text(format!("Repository: {}", options.repository));
    table.blank();

    let tools = options.ai_tools.iter().map(CompactString::as_str).collect::<Vec<_>>().join(", ");
    table.text("This report compares GitHub PR metrics across different time periods");
    table.text(format!("to evaluate the impact of AI tools ({tools}) on development workflow."));
    table.blank();

    for (i, column) in columns.iter().enumerate() {
        table.text(format!(
            "Phase {}: {} ({} to {})",
            i + 1,
            column.phase.name,
            column.report.period.start_date,
            column.report.period.end_date
        ));
    }

    table.blank();
    table.blank();
}

fn write_trends<W: Write>(columns: &[PhaseColumn<'_>], writer: &mut W) -> core::fmt::Result {
    writeln!(writer, "Key Trends:")?;
    writeln!(writer)?;

    let adoption: Vec<f64> = columns.iter().map(|c| c.report.statistic_f64("ai_adoption_rate")).collect();
    if let [first, .., last] = adoption.as_slice() {
        writeln!(
            writer,
            "AI Adoption: {first:.1}% → {last:.1}% ({:+.1}% change)",
            last - first
        )?;
    }

    let measured: Vec<&OverallMetrics> = columns.iter().filter_map(|c| c.overall.as_ref()).collect();
    if let [first, .., last] = measured.as_slice() {
        for (label, value, unit) in TREND_ROWS {
            let (before, after) = (value(first), value(last));
            let change = if before > 0.0 {
                percentage_change(before, after).unwrap_or_default()
            } else {
                0.0
            };
            writeln!(
                writer,
                "{label}: {before:.2}{unit} → {after:.2}{unit} ({change:+.1}% change)"
            )?;
        }
    }

    writeln!(writer)?;
    writeln!(writer, "Summary:")?;

    if let ([first, .., last], Some(&latest)) = (measured.as_slice(), adoption.last()) {
        if latest > ADOPTION_STRONG {
            writeln!(writer, "Strong AI adoption ({latest:.1}% of PRs).")?;
            if last.avg_time_to_merge_days < first.avg_time_to_merge_days {
                writeln!(writer, "Merge times trending downward - positive productivity signal.")?;
            }
        } else if latest > ADOPTION_MODERATE {
            writeln!(writer, "Moderate AI adoption ({latest:.1}% of PRs).")?;
        } else {
            writeln!(writer, "Early stage AI adoption ({latest:.1}% of PRs).")?;
        }
    }

    Ok(())
}
