//! Jira issue collection.

mod client;
mod issue;
mod jql;
mod provider;

pub use client::Client;
pub use issue::{ChangeHistory, ChangeItem, Changelog, Issue, IssueFields, NamedValue, SearchResponse};
pub use jql::{IssueQuery, build_jql, build_story_jql, date_to_jql};
pub use provider::Provider;
