//! GitHub API client
//!
//! Minimal GitHub REST client scoped to a single repository.

use crate::facts::resilient_http::resilient_get;
use chrono::{DateTime, TimeDelta, Utc};
use core::time::Duration;
use ohno::{EnrichableExt, IntoAppError, app_err};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, RETRY_AFTER};
use serde::de::DeserializeOwned;
use url::Url;

const LOG_TARGET: &str = "    github";

const API_VERSION: &str = "2022-11-28";

/// Pause used when GitHub signals a rate limit without saying when it ends.
const DEFAULT_RATE_LIMIT_PAUSE_SECS: i64 = 60;

/// Rate limit information from response headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub remaining: usize,
    pub reset_at: DateTime<Utc>,
}

/// Result of a GitHub API call
#[derive(Debug)]
pub enum ApiResult<T> {
    /// Request succeeded
    Success(T, Option<RateLimitInfo>),

    /// Rate limited, retry after the reset time
    RateLimited(RateLimitInfo),

    /// The requested resource was not found (404)
    NotFound(Option<RateLimitInfo>),

    /// Request failed permanently
    Failed(ohno::AppError, Option<RateLimitInfo>),
}

#[derive(Debug, Clone)]
#[expect(clippy::struct_field_names, reason = "client field stores the underlying HTTP client")]
pub struct Client {
    client: reqwest::Client,
    repo_url: String,
    timeout: Duration,
}

impl Client {
    /// Create a client for `owner/repo` on the GitHub API at `api_url`.
    pub fn new(api_url: &str, owner: &str, repo: &str, token: Option<&str>, timeout: Duration) -> crate::Result<Self> {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        let _ = headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        if let Some(t) = token {
            let mut auth_val = HeaderValue::from_str(&format!("Bearer {t}"))?;
            auth_val.set_sensitive(true);
            let _ = headers.insert(AUTHORIZATION, auth_val);
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("ai-impact/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        let repo_url = format!("{}/repos/{owner}/{repo}", api_url.trim_end_matches('/'));
        let _ = Url::parse(&repo_url).into_app_err_with(|| format!("invalid GitHub API URL '{api_url}'"))?;

        Ok(Self { client, repo_url, timeout })
    }

    /// GET `{repo_url}/{path}` with the given query parameters and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> ApiResult<T> {
        let url = match Url::parse_with_params(&format!("{}/{path}", self.repo_url), query) {
            Ok(url) => url,
            Err(e) => return ApiResult::Failed(e.into(), None),
        };

        log::debug!(target: LOG_TARGET, "GET {url}");

        let resp = match resilient_get(&self.client, url.as_str(), self.timeout).await {
            Ok(r) => r,
            Err(e) => return ApiResult::Failed(e, None),
        };

        let rate_limit = extract_rate_limit_from_headers(resp.headers());
        let status = resp.status();

        if status.is_success() {
            return match resp.json().await {
                Ok(data) => ApiResult::Success(data, rate_limit),
                Err(e) => ApiResult::Failed(ohno::AppError::from(e).enrich_with(|| format!("decoding response from {url}")), rate_limit),
            };
        }

        if let Some(info) = classify_rate_limit(status, resp.headers(), rate_limit, Utc::now()) {
            return ApiResult::RateLimited(info);
        }

        if status == StatusCode::NOT_FOUND {
            return ApiResult::NotFound(rate_limit);
        }

        ApiResult::Failed(app_err!("GET {url} failed with status {status}"), rate_limit)
    }
}

/// Decide whether an error response is a rate limit, and when it lifts.
///
/// 429 is always a rate limit. 403 is one only when the quota is exhausted or GitHub asks
/// for a `retry-after` wait; otherwise it is a permission problem.
fn classify_rate_limit(
    status: StatusCode,
    headers: &HeaderMap,
    rate_limit: Option<RateLimitInfo>,
    now: DateTime<Utc>,
) -> Option<RateLimitInfo> {
    let retry_after = headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
        .map(|secs| RateLimitInfo {
            remaining: 0,
            reset_at: now + TimeDelta::seconds(secs),
        });

    let exhausted = rate_limit.filter(|rl| rl.remaining == 0);

    match status {
        StatusCode::TOO_MANY_REQUESTS => Some(retry_after.or(exhausted).unwrap_or(RateLimitInfo {
            remaining: 0,
            reset_at: now + TimeDelta::seconds(DEFAULT_RATE_LIMIT_PAUSE_SECS),
        })),
        StatusCode::FORBIDDEN => retry_after.or(exhausted),
        _ => None,
    }
}

/// Extract rate limit information from API response headers
fn extract_rate_limit_from_headers(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let remaining = headers.get("x-ratelimit-remaining")?.to_str().ok()?.parse::<usize>().ok()?;
    let reset_timestamp = headers.get("x-ratelimit-reset")?.to_str().ok()?.parse::<i64>().ok()?;
    let reset_at = DateTime::from_timestamp(reset_timestamp, 0)?;

    Some(RateLimitInfo { remaining, reset_at })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::github::{PullDetails, PullSummary};
    use crate::facts::resilient_http::DEFAULT_REQUEST_TIMEOUT;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_704_067_000, 0).unwrap()
    }

    #[test]
    fn test_extract_rate_limit_from_headers() {
        let mut headers = HeaderMap::new();
        let _ = headers.insert("x-ratelimit-remaining", HeaderValue::from_static("4999"));
        let _ = headers.insert("x-ratelimit-reset", HeaderValue::from_static("1704067200"));

        let rate_limit = extract_rate_limit_from_headers(&headers).unwrap();

        assert_eq!(rate_limit.remaining, 4999);
        assert_eq!(rate_limit.reset_at.timestamp(), 1_704_067_200);
    }

    #[test]
    fn test_extract_rate_limit_invalid_headers() {
        assert!(extract_rate_limit_from_headers(&HeaderMap::new()).is_none());

        let mut headers = HeaderMap::new();
        let _ = headers.insert("x-ratelimit-remaining", HeaderValue::from_static("invalid"));
        let _ = headers.insert("x-ratelimit-reset", HeaderValue::from_static("1704067200"));
        assert!(extract_rate_limit_from_headers(&headers).is_none());
    }

    #[test]
    fn test_forbidden_with_exhausted_quota_is_rate_limited() {
        let info = RateLimitInfo {
            remaining: 0,
            reset_at: DateTime::from_timestamp(1_704_067_200, 0).unwrap(),
        };

        let classified = classify_rate_limit(StatusCode::FORBIDDEN, &HeaderMap::new(), Some(info), now());
        assert_eq!(classified, Some(info));
    }

    #[test]
    fn test_forbidden_with_quota_left_is_not_rate_limited() {
        let info = RateLimitInfo {
            remaining: 10,
            reset_at: DateTime::from_timestamp(1_704_067_200, 0).unwrap(),
        };

        assert!(classify_rate_limit(StatusCode::FORBIDDEN, &HeaderMap::new(), Some(info), now()).is_none());
        assert!(classify_rate_limit(StatusCode::FORBIDDEN, &HeaderMap::new(), None, now()).is_none());
    }

    #[test]
    fn test_retry_after_header() {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(RETRY_AFTER, HeaderValue::from_static("30"));

        let classified = classify_rate_limit(StatusCode::FORBIDDEN, &headers, None, now()).unwrap();
        assert_eq!(classified.reset_at, now() + TimeDelta::seconds(30));
    }

    #[test]
    fn test_too_many_requests_without_headers_uses_default_pause() {
        let classified = classify_rate_limit(StatusCode::TOO_MANY_REQUESTS, &HeaderMap::new(), None, now()).unwrap();
        assert_eq!(classified.reset_at, now() + TimeDelta::seconds(DEFAULT_RATE_LIMIT_PAUSE_SECS));
    }

    #[tokio::test]
    async fn test_get_json_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/o/r/pulls/5"))
            .and(header("authorization", "Bearer tok"))
            .and(header("x-github-api-version", API_VERSION))
            .and(query_param("per_page", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{ "number": 5, "title": "t", "html_url": "", "created_at": "2024-10-01T00:00:00Z", "updated_at": "2024-10-01T00:00:00Z" }"#,
            ))
            .mount(&server)
            .await;

        let client = Client::new(&server.uri(), "o", "r", Some("tok"), DEFAULT_REQUEST_TIMEOUT).unwrap();
        let result: ApiResult<PullSummary> = client.get_json("pulls/5", &[("per_page", "100".to_string())]).await;

        match result {
            ApiResult::Success(pr, _) => assert_eq!(pr.number, 5),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_json_classifies_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/o/r/pulls/404"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/o/r/pulls/429"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "5"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/o/r/pulls/422"))
            .respond_with(ResponseTemplate::new(422))
            .mount(&server)
            .await;

        let client = Client::new(&server.uri(), "o", "r", None, DEFAULT_REQUEST_TIMEOUT).unwrap();

        let not_found: ApiResult<PullDetails> = client.get_json("pulls/404", &[]).await;
        assert!(matches!(not_found, ApiResult::NotFound(_)));

        let limited: ApiResult<PullDetails> = client.get_json("pulls/429", &[]).await;
        assert!(matches!(limited, ApiResult::RateLimited(_)));

        let failed: ApiResult<PullDetails> = client.get_json("pulls/422", &[]).await;
        assert!(matches!(failed, ApiResult::Failed(..)));
    }
}
