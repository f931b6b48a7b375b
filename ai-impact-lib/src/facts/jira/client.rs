//! Jira REST API client
//!
//! Minimal client for the v2 search endpoint.

use super::SearchResponse;
use crate::Result;
use crate::facts::resilient_http::resilient_get;
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use url::Url;

const LOG_TARGET: &str = "      jira";

/// Fields requested for every issue, in addition to the story points field.
const BASE_FIELDS: &str = "created,resolutiondate,status,issuetype,timeoriginalestimate,timetracking";

#[derive(Debug, Clone)]
pub struct Client {
    client: reqwest::Client,
    search_url: Url,
    fields: String,
    timeout: Duration,
}

impl Client {
    /// Create a client for the Jira instance at `base_url`, authenticating with a bearer token.
    pub fn new(base_url: &str, token: Option<&str>, story_points_field: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = token {
            let mut auth_val = HeaderValue::from_str(&format!("Bearer {token}"))?;
            auth_val.set_sensitive(true);
            let _ = headers.insert(AUTHORIZATION, auth_val);
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("ai-impact/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        let search_url = Url::parse(&format!("{}/rest/api/2/search", base_url.trim_end_matches('/')))
            .into_app_err_with(|| format!("invalid Jira URL '{base_url}'"))?;

        let fields = if story_points_field.is_empty() {
            BASE_FIELDS.to_string()
        } else {
            format!("{BASE_FIELDS},{story_points_field}")
        };

        Ok(Self {
            client,
            search_url,
            fields,
            timeout,
        })
    }

    /// Run one page of a JQL search.
    pub async fn search(&self, jql: &str, start_at: u64, max_results: u64, expand: Option<&str>) -> Result<SearchResponse> {
        let mut url = self.search_url.clone();
        {
            let mut query = url.query_pairs_mut();
            let _ = query
                .append_pair("jql", jql)
                .append_pair("fields", &self.fields)
                .append_pair("startAt", &start_at.to_string())
                .append_pair("maxResults", &max_results.to_string());
            if let Some(expand) = expand {
                let _ = query.append_pair("expand", expand);
            }
        }

        log::debug!(target: LOG_TARGET, "GET {url}");

        let response = resilient_get(&self.client, url.as_str(), self.timeout).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::debug!(target: LOG_TARGET, "Jira error response: {body}");
            return Err(app_err!("Jira search failed with status {status}: {}", first_line(&body)));
        }

        response.json().await.into_app_err("parsing Jira search response")
    }
}

fn first_line(body: &str) -> &str {
    body.lines().next().unwrap_or_default()
}
