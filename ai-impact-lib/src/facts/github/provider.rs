use super::client::{ApiResult, Client, RateLimitInfo};
use super::{Comment, Commit, PullDetails, PullFacts, PullSummary, Review};
use crate::Result;
use crate::analysis::is_bot;
use crate::facts::{Progress, Throttler};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use compact_str::CompactString;
use core::time::Duration;
use futures_util::future::join_all;
use ohno::{IntoAppError, app_err};
use serde::de::DeserializeOwned;
use std::sync::Arc;

const LOG_TARGET: &str = "    github";
const PAGE_SIZE: usize = 100;
const MAX_PAGES: u32 = 50;
const MAX_RATE_LIMIT_WAIT_SECS: i64 = 3600;
const MIN_RATE_LIMIT_WAIT: Duration = Duration::from_secs(1);
const MAX_RATE_LIMIT_RETRIES: u32 = 5;

/// Macro to unwrap `ApiResult` or propagate rate limit/error
macro_rules! unwrap_or_return {
    ($expr:expr) => {
        match $expr {
            ApiResult::Success(data, rate_limit) => (data, rate_limit),
            ApiResult::RateLimited(rate_limit) => return ApiResult::RateLimited(rate_limit),
            ApiResult::NotFound(rate_limit) => return ApiResult::NotFound(rate_limit),
            ApiResult::Failed(e, rate_limit) => return ApiResult::Failed(e, rate_limit),
        }
    };
}

/// Collects merged pull requests and their review activity for one repository.
#[derive(Debug, Clone)]
pub struct Provider {
    client: Client,
    bot_users: Arc<[CompactString]>,
    throttler: Arc<Throttler>,
}

impl Provider {
    #[must_use]
    pub fn new(client: Client, bot_users: &[CompactString], max_concurrent_requests: usize) -> Self {
        Self {
            client,
            bot_users: bot_users.iter().map(|user| user.to_lowercase().into()).collect(),
            throttler: Throttler::new(max_concurrent_requests),
        }
    }

    /// List pull requests merged between `start` and `end`, both inclusive, that were not
    /// authored by a bot.
    ///
    /// Closed pull requests are listed most recently updated first, so listing stops at the
    /// first page whose oldest entry was last updated before `start`.
    pub async fn fetch_merged_prs(&self, start: NaiveDate, end: NaiveDate, progress: &dyn Progress) -> Result<Vec<PullSummary>> {
        let window_start = start.and_time(NaiveTime::MIN).and_utc();
        let window_end = end.and_time(NaiveTime::MIN).and_utc() + TimeDelta::days(1);

        let mut merged = Vec::new();
        for page in 1..=MAX_PAGES {
            log::debug!(target: LOG_TARGET, "Fetching closed pull requests page {page}");

            let query = [
                ("state", "closed".to_string()),
                ("sort", "updated".to_string()),
                ("direction", "desc".to_string()),
                ("per_page", PAGE_SIZE.to_string()),
                ("page", page.to_string()),
            ];

            let pulls: Vec<PullSummary> = self
                .get_with_retry("pulls", &query, progress)
                .await
                .into_app_err_with(|| format!("listing pull requests (page {page})"))?;

            if pulls.is_empty() {
                break;
            }

            let page_len = pulls.len();
            let oldest_update = pulls.iter().map(|pr| pr.updated_at).min();

            for pr in pulls {
                let Some(merged_at) = pr.merged_at else {
                    continue;
                };

                if is_bot(pr.author(), &self.bot_users) {
                    log::debug!(target: LOG_TARGET, "Skipping bot-authored PR #{} by {}", pr.number, pr.author());
                    continue;
                }

                if (window_start..window_end).contains(&merged_at) {
                    merged.push(pr);
                }
            }

            if page_len < PAGE_SIZE || oldest_update.is_some_and(|updated| updated < window_start) {
                break;
            }
        }

        log::info!(target: LOG_TARGET, "Found {} merged PR(s) between {start} and {end}", merged.len());
        Ok(merged)
    }

    /// Fetch commits, reviews, and comments for each pull request concurrently.
    ///
    /// A pull request whose data cannot be fetched is logged and left out of the result.
    pub async fn fetch_pull_facts(&self, pulls: Vec<PullSummary>, progress: &dyn Progress) -> Vec<PullFacts> {
        progress.set_total(pulls.len() as u64);

        let futures = pulls.into_iter().map(|summary| self.fetch_with_retry(summary, progress));
        join_all(futures).await.into_iter().flatten().collect()
    }

    async fn fetch_with_retry(&self, summary: PullSummary, progress: &dyn Progress) -> Option<PullFacts> {
        let number = summary.number;
        let mut rate_limit_retries = 0;

        loop {
            let permit = self.throttler.acquire().await;
            let result = self.fetch_pull(&summary).await;
            drop(permit);

            match result {
                ApiResult::Success(facts, _) => {
                    progress.advance(&format!("#{number}"));
                    return Some(facts);
                }
                ApiResult::RateLimited(rate_limit) if rate_limit_retries < MAX_RATE_LIMIT_RETRIES => {
                    rate_limit_retries += 1;
                    self.pause_for_rate_limit(rate_limit, progress);
                }
                ApiResult::RateLimited(_) => {
                    log::warn!(target: LOG_TARGET, "Giving up on PR #{number} after repeated rate limiting");
                    break;
                }
                ApiResult::NotFound(_) => {
                    log::warn!(target: LOG_TARGET, "PR #{number} disappeared while it was being analyzed");
                    break;
                }
                ApiResult::Failed(e, _) => {
                    log::error!(target: LOG_TARGET, "Could not analyze PR #{number}: {e:#}");
                    break;
                }
            }
        }

        progress.advance(&format!("#{number} (failed)"));
        None
    }

    async fn fetch_pull(&self, summary: &PullSummary) -> ApiResult<PullFacts> {
        let number = summary.number;

        // Sequential, so one permit never accounts for more than one in-flight request
        let (details, _) = unwrap_or_return!(self.client.get_json::<PullDetails>(&format!("pulls/{number}"), &[]).await);
        let (commits, _) = unwrap_or_return!(self.get_all_pages::<Commit>(&format!("pulls/{number}/commits")).await);
        let (reviews, _) = unwrap_or_return!(self.get_all_pages::<Review>(&format!("pulls/{number}/reviews")).await);
        let (review_comments, _) = unwrap_or_return!(self.get_all_pages::<Comment>(&format!("pulls/{number}/comments")).await);
        let (issue_comments, rate_limit) = unwrap_or_return!(self.get_all_pages::<Comment>(&format!("issues/{number}/comments")).await);

        log::debug!(
            target: LOG_TARGET,
            "PR #{number}: {} commit(s), {} review(s), {} comment(s)",
            commits.len(),
            reviews.len(),
            review_comments.len() + issue_comments.len()
        );

        ApiResult::Success(
            PullFacts {
                summary: summary.clone(),
                details,
                commits,
                reviews,
                review_comments,
                issue_comments,
            },
            rate_limit,
        )
    }

    async fn get_all_pages<T: DeserializeOwned>(&self, path: &str) -> ApiResult<Vec<T>> {
        let mut all = Vec::new();
        let mut latest_rate_limit = None;

        for page in 1..=MAX_PAGES {
            let query = [("per_page", PAGE_SIZE.to_string()), ("page", page.to_string())];
            let (items, rate_limit): (Vec<T>, _) = unwrap_or_return!(self.client.get_json(path, &query).await);
            latest_rate_limit = rate_limit.or(latest_rate_limit);

            let done = items.len() < PAGE_SIZE;
            all.extend(items);
            if done {
                break;
            }
        }

        ApiResult::Success(all, latest_rate_limit)
    }

    /// Single request that waits out rate limits, used for the sequential listing.
    async fn get_with_retry<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)], progress: &dyn Progress) -> Result<T> {
        for _ in 0..=MAX_RATE_LIMIT_RETRIES {
            let permit = self.throttler.acquire().await;
            let result = self.client.get_json(path, query).await;
            drop(permit);

            match result {
                ApiResult::Success(data, _) => return Ok(data),
                ApiResult::RateLimited(rate_limit) => self.pause_for_rate_limit(rate_limit, progress),
                ApiResult::NotFound(_) => return Err(app_err!("repository not found or not accessible")),
                ApiResult::Failed(e, _) => return Err(e),
            }
        }

        Err(app_err!("still rate limited after {MAX_RATE_LIMIT_RETRIES} retries"))
    }

    fn pause_for_rate_limit(&self, rate_limit: RateLimitInfo, progress: &dyn Progress) {
        let now = Utc::now();
        let wait_until = rate_limit.reset_at.min(now + TimeDelta::seconds(MAX_RATE_LIMIT_WAIT_SECS));
        let wait = (wait_until - now).to_std().unwrap_or(Duration::ZERO).max(MIN_RATE_LIMIT_WAIT);

        if self.throttler.pause_for(wait) {
            let formatted_time = local_time(wait_until);
            log::warn!(target: LOG_TARGET, "Hit GitHub rate limit, pausing requests until {formatted_time}");
            if !log::log_enabled!(log::Level::Warn) {
                progress.println(&format!("GitHub rate limit exceeded: Waiting until {formatted_time}..."));
            }
        }
    }
}

fn local_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&chrono::Local).format("%T").to_string()
}
