use super::{Client, Issue};
use crate::Result;
use crate::facts::Progress;
use ohno::IntoAppError;

const LOG_TARGET: &str = "      jira";

const CHANGELOG_EXPANSION: &str = "changelog";

/// Fetches every issue matching a JQL query, one page at a time.
#[derive(Debug, Clone)]
pub struct Provider {
    client: Client,
    page_size: u64,
}

impl Provider {
    #[must_use]
    pub fn new(client: Client, page_size: u64) -> Self {
        Self {
            client,
            page_size: page_size.max(1),
        }
    }

    /// Number of issues matching the query.
    pub async fn count(&self, jql: &str) -> Result<u64> {
        let page = self
            .client
            .search(jql, 0, 1, None)
            .await
            .into_app_err_with(|| format!("counting issues for query '{jql}'"))?;
        Ok(page.total)
    }

    /// Fetch all matching issues with their changelogs.
    ///
    /// Failing to count the matches is an error. A page that fails after that ends the fetch
    /// early with a warning, returning what was collected so far.
    pub async fn fetch_all(&self, jql: &str, progress: &dyn Progress) -> Result<Vec<Issue>> {
        let total = self.count(jql).await?;
        log::info!(target: LOG_TARGET, "{total} issue(s) match '{jql}'");

        let mut issues = Vec::with_capacity(usize::try_from(total).unwrap_or_default());
        if total == 0 {
            return Ok(issues);
        }

        progress.set_total(total);

        let mut start_at = 0;
        while start_at < total {
            let end = (start_at + self.page_size).min(total);
            log::debug!(target: LOG_TARGET, "Fetching issues {start_at} to {end}");

            match self.client.search(jql, start_at, self.page_size, Some(CHANGELOG_EXPANSION)).await {
                Ok(page) if !page.issues.is_empty() => {
                    for issue in page.issues {
                        progress.advance(&issue.key);
                        issues.push(issue);
                    }
                }
                Ok(_) => {
                    log::warn!(target: LOG_TARGET, "Jira returned no issues for the page starting at {start_at}, stopping");
                    break;
                }
                Err(e) => {
                    log::warn!(target: LOG_TARGET, "Could not fetch the page starting at {start_at}, stopping: {e:#}");
                    break;
                }
            }

            start_at += self.page_size;
        }

        Ok(issues)
    }
}
