//! Report generation and parsing
//!
//! Single-run reports are written as text for people and JSON for tools. The Jira text
//! report and the PR JSON report double as the input of the phase comparisons, which read
//! them back from disk and lay the phases side by side.
//!
//! # Implementation Model
//!
//! - **Jira**: `jira_text` and `jira_json` render a [`JiraReport`]; `jira_parser` reads the
//!   text form back into a [`ParsedJiraReport`].
//! - **GitHub**: `pr_json` writes and reads a [`PrReport`]; `pr_text` renders its summary.
//! - **Comparisons**: `jira_comparison` and `pr_comparison` build a [`ComparisonTable`],
//!   which `tsv` and `excel` render.
//!
//! `common` holds the phase definition, user name normalization, and the change
//! formatting shared by both comparisons. `discovery` names report files and finds the
//! most recent ones.

mod common;
mod comparison_table;
mod discovery;
mod excel;
mod jira_comparison;
mod jira_json;
mod jira_parser;
mod jira_report;
mod jira_text;
mod pr_comparison;
mod pr_json;
mod pr_text;
mod tsv;

pub use common::Phase;
pub use comparison_table::{ComparisonTable, Line};
pub use discovery::{
    JIRA_COMPARISON_PREFIX, JIRA_REPORT_PREFIX, PR_COMPARISON_PREFIX, PR_METRICS_PREFIX, PR_REPORT_PREFIX, find_reports,
    report_file_name, report_owner, stamp_from_file_name,
};
pub use excel::generate as generate_xlsx;
pub use jira_comparison::{JiraComparison, build as build_jira_comparison};
pub use jira_json::generate as generate_jira_json;
pub use jira_parser::{ParsedJiraReport, parse as parse_jira_report};
pub use jira_report::JiraReport;
pub use jira_text::generate as generate_jira_text;
pub use pr_comparison::{PrComparison, build as build_pr_comparison};
pub use pr_json::{Filter, Period, PrReport, Repository, generate as generate_pr_json, parse as parse_pr_report};
pub use pr_text::generate as generate_pr_text;
pub use tsv::generate as generate_tsv;
