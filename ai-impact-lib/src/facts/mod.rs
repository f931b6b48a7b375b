//! Data collection from the Jira and GitHub REST APIs
//!
//! Each service gets its own submodule with the same shape: a `Client` that knows how to
//! issue one request and classify the response, and a `Provider` that drives pagination,
//! concurrency, and rate-limit handling on top of it.
//!
//! # Implementation Model
//!
//! - **Jira**: the search endpoint is paged sequentially. The first request learns the total
//!   number of matches; later pages expand the changelog so that every issue carries its full
//!   status history.
//! - **GitHub**: merged pull requests are listed newest-updated first until a page falls
//!   entirely before the requested window. Per-PR details (commits, reviews, comments) are
//!   fetched concurrently through a [`Throttler`] that the whole pool pauses on when the API
//!   reports a rate limit.
//!
//! All requests go through [`resilient_http::resilient_get`], which retries transient network
//! and server failures with exponential backoff.

pub mod github;
pub mod jira;
mod progress;
pub(crate) mod resilient_http;
mod throttler;

pub use progress::Progress;
pub use throttler::Throttler;
