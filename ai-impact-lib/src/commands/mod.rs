//! Command-line interface and orchestration for ai-impact
//!
//! This module implements the CLI commands and ties the other modules together: it
//! parses arguments, loads the configuration, collects facts, runs the analysis, and
//! writes the reports.
//!
//! # Implementation Model
//!
//! ## Commands
//!
//! - **jira**: Fetch resolved issues with their changelogs, compute how long each one
//!   spent in every status, and write the Jira text report (plus optional JSON)
//! - **prs**: Fetch merged pull requests with their commits, reviews, and comments, and
//!   write the PR metrics JSON and text reports
//! - **compare-jira**: Read back the most recent Jira reports and lay them out per phase
//! - **compare-prs**: Read back the most recent PR metric reports and match them to the
//!   configured phases by date
//! - **init**: Generate a default configuration file
//!
//! ## Execution Flow
//!
//! The `run` function parses the command line with clap and routes to the command
//! handler. Every handler opens a `Session`, which sets up logging and loads the
//! configuration; command-line values take precedence over configured ones. Reports are
//! printed to the host's output and saved under the configured reports directory.
//!
//! `progress_reporter` drives the progress bar shown while the collectors page through
//! the remote APIs.

mod common;
mod compare_jira;
mod compare_prs;
mod config;
mod host;
mod init;
mod jira;
mod progress_reporter;
mod prs;
mod run;

#[cfg(debug_assertions)]
pub use config::Config;

pub use common::GlobalArgs;
pub use compare_jira::{CompareJiraArgs, compare_jira};
pub use compare_prs::{ComparePrsArgs, compare_prs};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use jira::{JiraArgs, analyze_jira};
pub use progress_reporter::ProgressReporter;
pub use prs::{PrsArgs, analyze_prs};
pub use run::run;
