//! Timestamp parsing and formatting shared by the collectors and reports.

use chrono::{DateTime, NaiveDate, Utc};

/// Formats accepted for issue tracker timestamps, tried in order.
///
/// Jira emits `2024-01-15T10:30:00.000+0000`; some proxies strip the fractional part.
const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M:%S%z"];

/// Format used for calendar dates on the command line and in phase definitions.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format used for instants inside text reports.
pub const REPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format used to stamp generated report file names.
pub const FILE_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Parse an ISO-8601 timestamp with or without fractional seconds.
///
/// Returns the first successful parse normalized to UTC, or `None` when no format matches.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(text, format).ok())
        .or_else(|| DateTime::parse_from_rfc3339(text).ok())
        .map(|ts| ts.with_timezone(&Utc))
}

/// Parse a `YYYY-MM-DD` calendar date.
#[must_use]
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

#[must_use]
pub fn format_report_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(REPORT_TIMESTAMP_FORMAT).to_string()
}

#[must_use]
pub fn file_stamp<Tz: chrono::TimeZone>(ts: &DateTime<Tz>) -> String
where
    Tz::Offset: core::fmt::Display,
{
    ts.format(FILE_STAMP_FORMAT).to_string()
}
