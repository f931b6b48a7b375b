//! Reads back the Jira text reports written by `jira`.

use crate::HashMap;
use crate::analysis::parse_date;
use regex::Regex;
use std::sync::LazyLock;

static STATE_ROW_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s+(\d+)\s+(\d+)\s+(-?[\d.]+)\s*(days|hours)").expect("invalid regex"));
static ISSUE_TYPE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s+(\S.*?)\s+(\d+)\s+\(\s*([\d.]+)%\)").expect("invalid regex"));
static LEADING_NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(-?[\d.]+)").expect("invalid regex"));
static REENTRY_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([\d.]+)\s*times").expect("invalid regex"));

const ISSUE_TYPES_HEADING: &str = "--- Issue Type Statistics ---";
const DETAILED_STATES_HEADING: &str = "--- Detailed State Analysis ---";
const REENTRY_MARKER: &str = "Average times per issue entering this state";

/// Share of one issue type within a report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IssueTypeShare {
    pub count: u64,
    pub percentage: f64,
}

/// The figures `compare-jira` needs from one Jira text report.
///
/// Missing sections leave their fields empty, so an empty report stands in for a phase
/// without data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedJiraReport {
    pub assignee: Option<String>,
    pub jql: Option<String>,
    pub total_issues: u64,
    pub average_closure_days: Option<f64>,
    pub longest_closure_days: Option<f64>,
    pub earliest_created: Option<String>,
    pub earliest_resolved: Option<String>,
    pub latest_resolved: Option<String>,
    pub span_days: Option<i64>,
    pub issue_types: HashMap<String, IssueTypeShare>,

    /// Average days spent per status, for statuses with a positive average.
    pub state_days: HashMap<String, f64>,

    /// Average entries per issue, per status.
    pub state_reentry: HashMap<String, f64>,
}

impl ParsedJiraReport {
    /// Whole days between the first and the last resolution, by calendar date.
    #[must_use]
    pub fn analysis_period_days(&self) -> Option<i64> {
        let earliest = date_part(self.earliest_resolved.as_deref()?)?;
        let latest = date_part(self.latest_resolved.as_deref()?)?;
        Some((latest - earliest).num_days())
    }
}

fn date_part(timestamp: &str) -> Option<chrono::NaiveDate> {
    parse_date(timestamp.split_whitespace().next()?)
}

/// Extract the comparison figures from the text of a Jira report.
///
/// Lines that do not match the expected layout are ignored.
#[must_use]
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "report counts are small whole numbers")]
pub fn parse(text: &str) -> ParsedJiraReport {
    let mut report = ParsedJiraReport::default();

    for line in text.lines() {
        if let Some((key, value)) = line.split_once(':') {
            let value = value.trim();
            match key {
                "Assignee" => report.assignee = Some(value.to_string()),
                "JQL Query" => report.jql = Some(value.to_string()),
                "Total" => report.total_issues = leading_number(value).map_or(0, |n| n as u64),
                "Average Closure Time" => report.average_closure_days = leading_number(value),
                "Longest Closure Time" => report.longest_closure_days = leading_number(value),
                "Earliest Created" => report.earliest_created = Some(value.to_string()),
                "Earliest Resolved" => report.earliest_resolved = Some(value.to_string()),
                "Latest Resolved" => report.latest_resolved = Some(value.to_string()),
                "Data Span" => report.span_days = leading_number(value).map(|n| n as i64),
                _ => {}
            }
        }
    }

    parse_issue_types(text, &mut report);
    parse_state_rows(text, &mut report);
    parse_reentry(text, &mut report);

    report
}

fn leading_number(value: &str) -> Option<f64> {
    LEADING_NUMBER_REGEX.captures(value)?.get(1)?.as_str().parse().ok()
}

fn section<'a>(text: &'a str, heading: &str) -> impl Iterator<Item = &'a str> {
    text.lines()
        .skip_while(move |line| !line.starts_with(heading))
        .skip(1)
        .take_while(|line| !line.starts_with("---"))
}

#[expect(unused_results, reason = "later duplicates replace earlier ones")]
fn parse_issue_types(text: &str, report: &mut ParsedJiraReport) {
    for line in section(text, ISSUE_TYPES_HEADING) {
        let Some(caps) = ISSUE_TYPE_REGEX.captures(line) else {
            continue;
        };

        if let (Ok(count), Ok(percentage)) = (caps[2].parse(), caps[3].parse()) {
            report
                .issue_types
                .insert(caps[1].to_string(), IssueTypeShare { count, percentage });
        }
    }
}

#[expect(unused_results, reason = "later duplicates replace earlier ones")]
fn parse_state_rows(text: &str, report: &mut ParsedJiraReport) {
    let rows = text
        .lines()
        .skip_while(|line| !(line.contains("State") && line.contains("Occurrences") && line.contains("Avg Duration")))
        .skip(1)
        .take_while(|line| !line.starts_with("---"));

    for line in rows {
        let line = line.trim();
        if line.is_empty() || line.starts_with('=') {
            continue;
        }

        let Some(caps) = STATE_ROW_REGEX.captures(line) else {
            continue;
        };

        let Ok(average) = caps[4].parse::<f64>() else {
            continue;
        };

        let days = if &caps[5] == "hours" { average / 24.0 } else { average };
        if days > 0.0 {
            report.state_days.insert(caps[1].trim().to_string(), days);
        }
    }
}

#[expect(unused_results, reason = "later duplicates replace earlier ones")]
fn parse_reentry(text: &str, report: &mut ParsedJiraReport) {
    let mut current: Option<&str> = None;

    for line in section(text, DETAILED_STATES_HEADING) {
        if !line.starts_with([' ', '-']) && line.ends_with(':') {
            current = line.strip_suffix(':').map(str::trim);
        } else if let Some(state) = current
            && line.contains(REENTRY_MARKER)
            && let Some(rate) = REENTRY_REGEX.captures(line).and_then(|caps| caps[1].parse().ok())
        {
            report.state_reentry.insert(state.to_string(), rate);
        }
    }
}
