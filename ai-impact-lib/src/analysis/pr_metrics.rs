//! Per pull request metrics.
//!
//! AI assistance is detected from commit trailers. Review activity is counted twice: once
//! including everybody and once restricted to human participants, where bots and comments
//! addressed to the review bot are left out.

use crate::HashSet;
use crate::facts::github::{Comment, PullFacts, Review, ReviewState, User};
use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

const SECONDS_PER_HOUR: f64 = 3600.0;
const HOURS_PER_DAY: f64 = 24.0;

/// Review bodies shorter than this are treated as a plain approval.
const MIN_SUBSTANTIVE_APPROVAL_LEN: usize = 10;

const APPROVAL_PHRASES: &[&str] = &["lgtm", "approved", "approve", "👍", ":+1:", "looks good"];

/// Comments addressed to the review bot are conversations with a bot, not human review.
const REVIEW_BOT_MENTION: &str = "@coderabbit";

const AI_TRAILERS: &[&str] = &["assisted-by:", "co-authored-by:"];

/// Whether `login` belongs to an automated account.
///
/// Matches the configured bot list case-insensitively, plus any GitHub App account.
#[must_use]
pub fn is_bot(login: &str, bot_users: &[CompactString]) -> bool {
    login.ends_with("[bot]") || bot_users.iter().any(|bot| bot.eq_ignore_ascii_case(login))
}

/// AI tools found in a pull request's commits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AiDetection {
    /// Tools named in at least one trailer, sorted.
    pub tools: Vec<CompactString>,

    /// Commits that carry at least one trailer for a known tool.
    pub ai_commits: u64,
}

/// Scan commit messages for `Assisted-by: <tool>` and `Co-Authored-By: <tool>` trailers.
///
/// A commit counts once even when it names several tools.
#[must_use]
pub fn detect_ai_tools<'a>(messages: impl IntoIterator<Item = &'a str>, tools: &[CompactString]) -> AiDetection {
    let mut found: HashSet<&CompactString> = HashSet::default();
    let mut ai_commits = 0;

    for message in messages {
        let message = message.to_lowercase();
        let mut marked = false;

        for tool in tools {
            let tool_lower = tool.to_lowercase();
            let named = AI_TRAILERS.iter().any(|trailer| {
                message
                    .match_indices(trailer)
                    .filter_map(|(pos, _)| message.get(pos + trailer.len()..))
                    .any(|rest| rest.trim_start().starts_with(tool_lower.as_str()))
            });

            if named {
                let _ = found.insert(tool);
                marked = true;
            }
        }

        if marked {
            ai_commits += 1;
        }
    }

    let mut tools: Vec<CompactString> = found.into_iter().cloned().collect();
    tools.sort_unstable();
    AiDetection { tools, ai_commits }
}

/// Whether a review is a bare approval with no real feedback in it.
#[must_use]
pub fn is_approval_only(review: &Review) -> bool {
    if review.state != ReviewState::Approved {
        return false;
    }

    let body = review.body.as_deref().unwrap_or_default().trim();
    body.is_empty() || body.chars().count() < MIN_SUBSTANTIVE_APPROVAL_LEN || APPROVAL_PHRASES.contains(&body.to_lowercase().as_str())
}

/// Knows which accounts are bots and which AI tools to look for.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    bot_users: &'a [CompactString],
    ai_tools: &'a [CompactString],
}

impl<'a> Classifier<'a> {
    #[must_use]
    pub const fn new(bot_users: &'a [CompactString], ai_tools: &'a [CompactString]) -> Self {
        Self { bot_users, ai_tools }
    }

    #[must_use]
    pub fn is_bot(&self, user: Option<&User>) -> bool {
        user.is_some_and(|user| is_bot(&user.login, self.bot_users))
    }

    fn is_human_comment(&self, user: Option<&User>, body: &str) -> bool {
        user.is_some() && !self.is_bot(user) && !body.to_lowercase().contains(REVIEW_BOT_MENTION)
    }

    fn human_comments(&self, comments: &[Comment]) -> u64 {
        count(
            comments
                .iter()
                .filter(|c| self.is_human_comment(c.user.as_ref(), c.body.as_deref().unwrap_or_default())),
        )
    }
}

/// Metrics for one merged pull request, as stored in the JSON report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrMetrics {
    pub pr_number: u64,
    pub title: String,
    pub author: CompactString,
    pub created_at: DateTime<Utc>,
    pub merged_at: DateTime<Utc>,
    pub url: String,

    pub has_ai_assistance: bool,
    pub ai_tools: Vec<CompactString>,
    pub ai_commits_count: u64,
    pub total_commits: u64,
    pub ai_percentage: f64,

    pub time_to_merge_hours: f64,
    pub time_to_merge_days: f64,
    pub time_to_first_review_hours: Option<f64>,

    pub changes_requested_count: u64,
    pub approvals_count: u64,
    pub reviewers_count: u64,
    pub reviewers: Vec<CompactString>,
    pub review_comments_count: u64,
    pub issue_comments_count: u64,
    pub total_comments_count: u64,

    /// All comments plus review bodies that say more than a bare approval.
    pub substantive_comments_count: u64,

    pub human_reviewers_count: u64,
    pub human_reviewers: Vec<CompactString>,
    pub human_review_comments_count: u64,
    pub human_issue_comments_count: u64,
    pub human_total_comments_count: u64,
    pub human_substantive_comments_count: u64,

    pub additions: u64,
    pub deletions: u64,
    pub changed_files: u64,
}

impl PrMetrics {
    /// Derive the metrics of a merged pull request from its collected facts.
    ///
    /// Returns `None` for a pull request that was never merged.
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "commit counts are far below f64 precision limits")]
    pub fn compute(facts: &PullFacts, classifier: &Classifier<'_>) -> Option<Self> {
        let summary = &facts.summary;
        let merged_at = summary.merged_at?;
        let created_at = summary.created_at;

        let ai = detect_ai_tools(facts.commits.iter().map(|c| c.commit.message.as_str()), classifier.ai_tools);
        let total_commits = facts.commits.len() as u64;
        let ai_percentage = if total_commits == 0 {
            0.0
        } else {
            ai.ai_commits as f64 / total_commits as f64 * 100.0
        };

        let time_to_merge_hours = hours_between(created_at, merged_at);
        let time_to_first_review_hours = facts
            .reviews
            .iter()
            .filter_map(|review| review.submitted_at)
            .min()
            .map(|first| hours_between(created_at, first));

        let reviews = &facts.reviews;
        let reviewers = sorted_logins(reviews.iter().filter_map(|r| r.user.as_ref()));
        let human_reviewers = sorted_logins(
            reviews
                .iter()
                .filter_map(|r| r.user.as_ref())
                .filter(|user| !classifier.is_bot(Some(user))),
        );

        let mut substantive_reviews = 0;
        let mut human_substantive_reviews = 0;
        for review in reviews {
            let body = review.body.as_deref().unwrap_or_default().trim();
            if body.is_empty() || is_approval_only(review) {
                continue;
            }

            substantive_reviews += 1;
            if classifier.is_human_comment(review.user.as_ref(), body) {
                human_substantive_reviews += 1;
            }
        }

        let review_comments_count = facts.review_comments.len() as u64;
        let issue_comments_count = facts.issue_comments.len() as u64;
        let total_comments_count = review_comments_count + issue_comments_count;

        let human_review_comments_count = classifier.human_comments(&facts.review_comments);
        let human_issue_comments_count = classifier.human_comments(&facts.issue_comments);
        let human_total_comments_count = human_review_comments_count + human_issue_comments_count;

        Some(Self {
            pr_number: summary.number,
            title: summary.title.clone(),
            author: summary.author().into(),
            created_at,
            merged_at,
            url: summary.html_url.clone(),

            has_ai_assistance: !ai.tools.is_empty(),
            ai_tools: ai.tools,
            ai_commits_count: ai.ai_commits,
            total_commits,
            ai_percentage,

            time_to_merge_hours,
            time_to_merge_days: time_to_merge_hours / HOURS_PER_DAY,
            time_to_first_review_hours,

            changes_requested_count: count(reviews.iter().filter(|r| r.state == ReviewState::ChangesRequested)),
            approvals_count: count(reviews.iter().filter(|r| r.state == ReviewState::Approved)),
            reviewers_count: reviewers.len() as u64,
            reviewers,
            review_comments_count,
            issue_comments_count,
            total_comments_count,
            substantive_comments_count: total_comments_count + substantive_reviews,

            human_reviewers_count: human_reviewers.len() as u64,
            human_reviewers,
            human_review_comments_count,
            human_issue_comments_count,
            human_total_comments_count,
            human_substantive_comments_count: human_total_comments_count + human_substantive_reviews,

            additions: facts.details.additions,
            deletions: facts.details.deletions,
            changed_files: facts.details.changed_files,
        })
    }

    /// Whether the given tool was detected, ignoring case.
    #[must_use]
    pub fn used_tool(&self, tool: &str) -> bool {
        self.ai_tools.iter().any(|t| t.eq_ignore_ascii_case(tool))
    }
}

#[expect(clippy::cast_precision_loss, reason = "durations in seconds are far below f64 precision limits")]
fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_seconds() as f64 / SECONDS_PER_HOUR
}

fn sorted_logins<'a>(users: impl Iterator<Item = &'a User>) -> Vec<CompactString> {
    let mut logins: Vec<CompactString> = users.map(|user| user.login.clone()).collect();
    logins.sort_unstable();
    logins.dedup();
    logins
}

fn count<T>(iter: impl Iterator<Item = T>) -> u64 {
    iter.count() as u64
}
