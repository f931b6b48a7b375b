#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for ai-impact
//!
//! This library consolidates all functionality for the ai-impact tool, which collects
//! delivery metrics from Jira and GitHub and compares them across phases of AI tool adoption.
//!
//! # Module Organization
//!
//! - [`commands`]: Command-line interface and orchestration
//! - [`facts`]: Data collection from the Jira and GitHub REST APIs
//! - [`analysis`]: Per-issue state durations, per-PR metrics, and batch statistics
//! - [`reports`]: Text, JSON, TSV, and Excel report generation and parsing

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

pub type HashMap<K, V> = std::collections::HashMap<K, V, rustc_hash::FxBuildHasher>;
pub type HashSet<T> = std::collections::HashSet<T, rustc_hash::FxBuildHasher>;

#[cfg(any(debug_assertions, test))]
pub mod analysis;
#[cfg(not(any(debug_assertions, test)))]
mod analysis;

#[cfg(any(debug_assertions, test))]
pub mod commands;
#[cfg(not(any(debug_assertions, test)))]
mod commands;

#[cfg(any(debug_assertions, test))]
pub mod facts;
#[cfg(not(any(debug_assertions, test)))]
mod facts;

#[cfg(any(debug_assertions, test))]
pub mod reports;
#[cfg(not(any(debug_assertions, test)))]
mod reports;

pub use crate::commands::{Host, run};
