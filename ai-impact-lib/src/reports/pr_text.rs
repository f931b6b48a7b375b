use super::PrReport;
use crate::Result;
use crate::analysis::{OverallMetrics, PrStatistics, REPORT_TIMESTAMP_FORMAT};
use chrono::{DateTime, Local};
use core::fmt::Write;

const RULE_WIDTH: usize = 80;

/// Write the human-readable summary of one PR metrics report.
pub fn generate<W: Write>(report: &PrReport, stats: &PrStatistics, generated_at: DateTime<Local>, writer: &mut W) -> Result<()> {
    let rule = "=".repeat(RULE_WIDTH);

    writeln!(writer, "{rule}")?;
    writeln!(writer, "GitHub PR Metrics Report")?;
    writeln!(writer, "{rule}")?;
    writeln!(writer, "Period: {} to {}", report.period.start_date, report.period.end_date)?;
    writeln!(writer, "Repository: {}/{}", report.repository.owner, report.repository.name)?;
    if let Some(author) = &report.filter.author {
        writeln!(writer, "Author: {author}")?;
    }
    writeln!(writer, "Generated: {}", generated_at.format(REPORT_TIMESTAMP_FORMAT))?;
    writeln!(writer)?;

    writeln!(writer, "--- PR Summary ---")?;
    writeln!(writer, "Total PRs Merged (excl. bot-authored): {}", stats.total_prs)?;
    writeln!(writer, "AI Adoption Rate: {:.1}%", stats.ai_adoption_rate)?;
    writeln!(writer, "AI-Assisted PRs: {}", stats.ai_assisted_prs)?;
    writeln!(writer, "Non-AI PRs: {}", stats.non_ai_prs)?;
    writeln!(writer)?;

    if stats.ai_assisted_prs > 0 {
        writeln!(writer, "--- AI Tool Distribution ---")?;
        for (tool, count) in &stats.tool_prs {
            writeln!(writer, "{tool} PRs: {count}")?;
        }
        if stats.multi_tool_prs > 0 {
            writeln!(writer, "Both Tools: {}", stats.multi_tool_prs)?;
        }
        writeln!(writer)?;
    }

    let overall = OverallMetrics::compute(&report.prs);

    writeln!(writer, "--- Overall Metrics ---")?;
    writeln!(writer, "Avg Time to Merge: {:.2} days", overall.avg_time_to_merge_days)?;
    writeln!(writer, "Avg Time to First Review: {:.2} hours", overall.avg_time_to_first_review_hours)?;
    writeln!(writer, "Avg Changes Requested: {:.2}", overall.avg_changes_requested)?;
    writeln!(writer, "Avg Commits per PR: {:.2}", overall.avg_commits)?;
    writeln!(writer, "Avg Reviewers: {:.2}", overall.avg_reviewers)?;
    writeln!(writer, "Avg Reviewers (excl. bots): {:.2}", overall.avg_human_reviewers)?;
    writeln!(writer, "Avg Comments: {:.2}", overall.avg_comments)?;
    writeln!(
        writer,
        "Avg Comments (excl. bots & approvals): {:.2}",
        overall.avg_human_substantive_comments
    )?;
    writeln!(writer, "Avg Lines Added: {:.2}", overall.avg_additions)?;
    writeln!(writer, "Avg Lines Deleted: {:.2}", overall.avg_deletions)?;
    writeln!(writer, "Avg Files Changed: {:.2}", overall.avg_files_changed)?;
    writeln!(writer)?;
    writeln!(writer, "{rule}")?;

    Ok(())
}
