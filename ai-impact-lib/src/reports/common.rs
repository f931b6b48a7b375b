//! Common utilities shared across report generators.

use chrono::NaiveDate;
use core::fmt::Write;
use serde::{Deserialize, Serialize};

pub const SECONDS_PER_HOUR: f64 = 3600.0;
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// A named period of AI tool adoption, compared against the other phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Phase {
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Reduce a user identifier to the short form used in report file names.
///
/// Drops an email domain, a `rh-ee-` employee prefix, and a trailing `-<digits>` suffix, so
/// `jdoe@example.com`, `rh-ee-jdoe`, and `jdoe-1` all become `jdoe`.
#[must_use]
pub fn normalize_username(username: &str) -> &str {
    let name = username.split('@').next().unwrap_or_default();
    let name = name.strip_prefix("rh-ee-").unwrap_or(name);

    match name.rsplit_once('-') {
        Some((base, digits)) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => base,
        _ => name,
    }
}

/// Relative change from `before` to `after`, in percent.
///
/// Returns `None` when there is no baseline to compare against.
#[must_use]
pub fn percentage_change(before: f64, after: f64) -> Option<f64> {
    (before != 0.0).then(|| (after - before) / before * 100.0)
}

/// A metric compared between the first and the last phase.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricChange {
    pub name: String,
    pub before: f64,
    pub after: f64,

    /// Percentage change from `before` to `after`.
    pub change: f64,

    pub unit: &'static str,
}

impl MetricChange {
    /// A change measured relative to `before`, or `None` without a baseline.
    #[must_use]
    pub fn relative(name: impl Into<String>, before: f64, after: f64, unit: &'static str) -> Option<Self> {
        percentage_change(before, after).map(|change| Self {
            name: name.into(),
            before,
            after,
            change,
            unit,
        })
    }
}

/// Write the largest increases and decreases among `changes`, `top_n` of each.
pub fn format_metric_changes<W: Write>(changes: &[MetricChange], top_n: usize, writer: &mut W) -> core::fmt::Result {
    let mut increases: Vec<&MetricChange> = changes.iter().filter(|c| c.change > 0.0).collect();
    let mut decreases: Vec<&MetricChange> = changes.iter().filter(|c| c.change < 0.0).collect();

    increases.sort_by(|a, b| b.change.abs().total_cmp(&a.change.abs()));
    decreases.sort_by(|a, b| b.change.abs().total_cmp(&a.change.abs()));

    writeln!(writer)?;
    writeln!(writer, "Top {top_n} Increases in Metrics:")?;
    if increases.is_empty() {
        writeln!(writer, "• No increases detected")?;
    }
    for c in increases.iter().take(top_n) {
        write_change(writer, c)?;
    }

    writeln!(writer)?;
    writeln!(writer, "Top {top_n} Decreases in Metrics:")?;
    if decreases.is_empty() {
        writeln!(writer, "• No decreases detected")?;
    }
    for c in decreases.iter().take(top_n) {
        write_change(writer, c)?;
    }

    Ok(())
}

fn write_change<W: Write>(writer: &mut W, c: &MetricChange) -> core::fmt::Result {
    writeln!(
        writer,
        "• {}: {:.2}{unit} → {:.2}{unit} ({:+.1}% change)",
        c.name,
        c.before,
        c.after,
        c.change,
        unit = c.unit
    )
}

/// Render a duration in days when it spans at least a day, otherwise in hours.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    let days = seconds / SECONDS_PER_DAY;
    if days >= 1.0 {
        format!("{days:.2} days")
    } else {
        format!("{:.2} hours", seconds / SECONDS_PER_HOUR)
    }
}
