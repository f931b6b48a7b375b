//! JQL query construction.
//!
//! Dates are expressed relative to `today` (`"-30d"`) rather than as absolute dates, which
//! keeps queries independent of the Jira server's configured date format.

use crate::analysis::parse_date;
use chrono::NaiveDate;

/// Filters for the main issue query.
#[derive(Debug, Clone, Copy, Default)]
pub struct IssueQuery<'a> {
    pub project: &'a str,
    pub start: Option<&'a str>,
    pub end: Option<&'a str>,
    pub status: Option<&'a str>,
    pub assignee: Option<&'a str>,
}

/// Convert a `YYYY-MM-DD` date into a JQL relative date expression.
///
/// Today becomes `startOfDay()`, past dates `"-Nd"` and future dates `"Nd"`. Input that is not
/// a valid date is passed through quoted, leaving Jira to interpret it.
#[must_use]
pub fn date_to_jql(date: &str, today: NaiveDate) -> String {
    let Some(date) = parse_date(date) else {
        return format!("\"{date}\"");
    };

    let days_ago = (today - date).num_days();
    match days_ago {
        0 => "startOfDay()".to_string(),
        d if d > 0 => format!("\"-{d}d\""),
        d => format!("\"{}d\"", d.unsigned_abs()),
    }
}

/// Build the JQL selecting the issues to analyze.
///
/// A resolution date window takes precedence over the status filter: resolved issues are
/// already done, whatever their final status is called.
#[must_use]
pub fn build_jql(query: &IssueQuery<'_>, today: NaiveDate) -> String {
    let mut parts = vec![format!("project = \"{}\"", query.project)];

    if let Some(assignee) = query.assignee {
        parts.push(format!("assignee = \"{assignee}\""));
    }

    if query.start.is_some() || query.end.is_some() {
        push_resolved_bounds(&mut parts, query.start, query.end, today);
    } else if let Some(status) = query.status {
        parts.push(format!("status = \"{status}\""));
    }

    parts.join(" AND ")
}

/// Build the JQL selecting completed stories for velocity.
#[must_use]
pub fn build_story_jql(project: &str, start: Option<&str>, end: Option<&str>, today: NaiveDate) -> String {
    let mut parts = vec![format!("project = \"{project}\""), "issuetype = Story".to_string()];
    push_resolved_bounds(&mut parts, start, end, today);
    parts.join(" AND ")
}

fn push_resolved_bounds(parts: &mut Vec<String>, start: Option<&str>, end: Option<&str>, today: NaiveDate) {
    if let Some(start) = start {
        parts.push(format!("resolved >= {}", date_to_jql(start, today)));
    }

    if let Some(end) = end {
        parts.push(format!("resolved <= {}", date_to_jql(end, today)));
    }
}
