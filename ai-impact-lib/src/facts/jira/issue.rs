use crate::analysis::{IssueHistory, StatusChange, UNKNOWN_STATUS, parse_timestamp};
use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::Deserialize;
use serde_json::{Map, Value};

const LOG_TARGET: &str = "      jira";

const UNKNOWN_TYPE: &str = "Unknown";

/// One page of results from the search endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub start_at: u64,

    #[serde(default)]
    pub max_results: u64,

    #[serde(default)]
    pub total: u64,

    #[serde(default)]
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    #[serde(default)]
    pub key: CompactString,

    pub fields: IssueFields,

    #[serde(default)]
    pub changelog: Option<Changelog>,
}

/// The subset of issue fields requested from the search endpoint.
///
/// Timestamps stay as raw text so that a malformed value degrades one issue instead of
/// failing the whole page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueFields {
    #[serde(default)]
    pub created: Option<String>,

    #[serde(default)]
    pub resolutiondate: Option<String>,

    #[serde(default)]
    pub status: Option<NamedValue>,

    #[serde(default)]
    pub issuetype: Option<NamedValue>,

    /// Everything else, including instance-specific custom fields such as story points.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedValue {
    pub name: CompactString,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Changelog {
    #[serde(default)]
    pub histories: Vec<ChangeHistory>,
}

/// A set of field edits recorded together.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeHistory {
    #[serde(default)]
    pub created: Option<String>,

    #[serde(default)]
    pub items: Vec<ChangeItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeItem {
    pub field: CompactString,

    #[serde(default, rename = "fromString")]
    pub from_value: Option<CompactString>,

    #[serde(default, rename = "toString")]
    pub to_value: Option<CompactString>,
}

impl Issue {
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.fields.created.as_deref().and_then(parse_timestamp)
    }

    #[must_use]
    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.fields.resolutiondate.as_deref().and_then(parse_timestamp)
    }

    #[must_use]
    pub fn status_name(&self) -> &str {
        self.fields.status.as_ref().map_or(UNKNOWN_STATUS, |status| status.name.as_str())
    }

    #[must_use]
    pub fn issue_type(&self) -> &str {
        self.fields.issuetype.as_ref().map_or(UNKNOWN_TYPE, |kind| kind.name.as_str())
    }

    /// Story points recorded in the given custom field.
    ///
    /// Jira stores the value as a number, but some instances hand it back as a string.
    #[must_use]
    pub fn story_points(&self, field: &str) -> Option<f64> {
        match self.fields.other.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Extract the status history used for state-duration analysis.
    ///
    /// Only `status` field edits are kept. A history entry whose timestamp is missing or
    /// unparsable still contributes its status changes, without a timestamp, so the analysis
    /// can count them as skipped.
    #[must_use]
    pub fn history(&self) -> IssueHistory {
        let mut transitions = Vec::new();

        for entry in self.changelog.iter().flat_map(|changelog| &changelog.histories) {
            let timestamp = entry.created.as_deref().and_then(parse_timestamp);

            for item in entry.items.iter().filter(|item| item.field == "status") {
                let Some(to_status) = item.to_value.as_deref() else {
                    log::debug!(target: LOG_TARGET, "Ignoring status change without a target status in issue {}", self.key);
                    continue;
                };

                transitions.push(StatusChange::new(timestamp, item.from_value.as_deref(), to_status));
            }
        }

        IssueHistory {
            created_at: self.created_at(),
            resolved_at: self.resolved_at(),
            current_status: self.status_name().into(),
            transitions,
        }
    }
}
