//! GitHub pull request collection.

mod client;
mod provider;
mod pull;

pub use client::{ApiResult, Client, RateLimitInfo};
pub use provider::Provider;
pub use pull::{Comment, Commit, CommitDetail, PullDetails, PullFacts, PullSummary, Review, ReviewState, User};
