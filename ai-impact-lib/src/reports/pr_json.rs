use crate::Result;
use crate::analysis::PrMetrics;
use chrono::NaiveDate;
use core::fmt::Write;
use ohno::IntoAppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Date window a PR metrics report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub author: Option<String>,
}

/// The PR metrics report as written by `prs` and read back by `compare-prs`.
///
/// `statistics` is kept as raw JSON since its keys depend on the configured AI tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrReport {
    #[serde(default)]
    pub analysis_date: String,
    pub period: Period,
    #[serde(default)]
    pub repository: Repository,
    #[serde(default)]
    pub filter: Filter,
    #[serde(default)]
    pub statistics: Value,
    #[serde(default)]
    pub prs: Vec<PrMetrics>,
}

impl PrReport {
    /// A whole-number statistic, zero when absent.
    #[must_use]
    pub fn statistic_u64(&self, key: &str) -> u64 {
        self.statistics.get(key).and_then(Value::as_u64).unwrap_or_default()
    }

    /// A fractional statistic, zero when absent.
    #[must_use]
    pub fn statistic_f64(&self, key: &str) -> f64 {
        self.statistics.get(key).and_then(Value::as_f64).unwrap_or_default()
    }

    /// Number of pull requests that used `tool`.
    #[must_use]
    pub fn tool_prs(&self, tool: &str) -> u64 {
        self.statistic_u64(&format!("{}_prs", tool.to_lowercase()))
    }
}

pub fn generate<W: Write>(report: &PrReport, writer: &mut W) -> Result<()> {
    write!(writer, "{}", serde_json::to_string_pretty(report)?)?;
    Ok(())
}

pub fn parse(text: &str) -> Result<PrReport> {
    serde_json::from_str(text).into_app_err("parsing PR metrics report")
}
