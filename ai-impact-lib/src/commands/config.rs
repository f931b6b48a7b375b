use crate::facts::resilient_http::DEFAULT_REQUEST_TIMEOUT;
use crate::reports::Phase;
use crate::{HashSet, Result};
use camino::{Utf8Path, Utf8PathBuf};
use compact_str::CompactString;
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use url::Url;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// Configuration file looked up in the current directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "impact.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub jira: JiraConfig,

    #[serde(default)]
    pub github: GithubConfig,

    #[serde(default)]
    pub reports: ReportsConfig,

    #[serde(default)]
    pub comparison: ComparisonConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct JiraConfig {
    /// Base URL of the Jira instance
    pub url: String,

    /// Project key used when `--project` is not given
    pub project: String,

    /// Custom field holding story points
    pub story_points_field: String,

    /// Issues fetched per search request
    pub page_size: u64,

    /// Status filter used when no resolution dates are given
    pub default_status: String,

    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            project: String::new(),
            story_points_field: "customfield_12310243".to_string(),
            page_size: 50,
            default_status: "Done".to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GithubConfig {
    pub api_url: String,
    pub owner: String,
    pub repo: String,

    /// Pull requests whose details are fetched at the same time
    pub max_concurrent_requests: usize,

    /// Accounts left out of human review metrics
    pub bot_users: Vec<CompactString>,

    /// Tools detected from commit trailers
    pub ai_tools: Vec<CompactString>,

    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            owner: String::new(),
            repo: String::new(),
            max_concurrent_requests: 10,
            bot_users: ["coderabbit", "coderabbitai", "dependabot", "renovate", "github-actions", "red-hat-konflux"]
                .into_iter()
                .map(CompactString::from)
                .collect(),
            ai_tools: vec!["Claude".into(), "Cursor".into()],
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportsConfig {
    /// Directory holding the `jira` and `github` report folders
    pub output_dir: Utf8PathBuf,

    /// Most recent reports included in a comparison
    pub max_compared_reports: usize,

    /// Largest increases and decreases listed in a Jira comparison
    pub top_changes: usize,

    /// Average entries per issue above which a status is flagged for rework
    pub rework_threshold: f64,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            output_dir: Utf8PathBuf::from("reports"),
            max_compared_reports: 4,
            top_changes: 5,
            rework_threshold: 1.5,
        }
    }
}

impl ReportsConfig {
    #[must_use]
    pub fn jira_dir(&self) -> Utf8PathBuf {
        self.output_dir.join("jira")
    }

    #[must_use]
    pub fn github_dir(&self) -> Utf8PathBuf {
        self.output_dir.join("github")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComparisonConfig {
    /// Phases filled by Jira reports in order
    pub jira_phases: Vec<Phase>,

    /// Phases matched to GitHub reports by their dates
    pub github_phases: Vec<Phase>,

    /// Statuses whose average time is compared
    pub states: Vec<String>,

    /// Statuses whose re-entry rate is compared
    pub reentry_states: Vec<String>,

    pub issue_types: Vec<String>,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        fn strings(values: &[&str]) -> Vec<String> {
            values.iter().map(ToString::to_string).collect()
        }

        Self {
            jira_phases: Vec::new(),
            github_phases: Vec::new(),
            states: strings(&["New", "To Do", "In Progress", "Review", "Release Pending", "Waiting"]),
            reentry_states: strings(&["To Do", "In Progress", "Review", "Waiting"]),
            issue_types: strings(&["Story", "Task", "Bug", "Epic"]),
        }
    }
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// Without an explicit path, `impact.toml` in `base_dir` is used when it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated
    pub fn load(base_dir: &Utf8Path, config_path: Option<&Utf8PathBuf>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading configuration file '{path}'"))?;
            (path.clone(), text)
        } else {
            let path = base_dir.join(DEFAULT_CONFIG_FILE);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Ok(Self::default());
                }
                Err(e) => return Err(e).into_app_err_with(|| format!("reading configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        config.validate()?;

        Ok(config)
    }

    /// Save the default configuration to a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if a value is out of range or inconsistent
    pub fn validate(&self) -> Result<()> {
        if !self.jira.url.is_empty() {
            let _ = Url::parse(&self.jira.url).into_app_err_with(|| format!("jira.url '{}' is not a valid URL", self.jira.url))?;
        }

        let _ = Url::parse(&self.github.api_url).into_app_err_with(|| format!("github.api_url '{}' is not a valid URL", self.github.api_url))?;

        if self.jira.page_size == 0 {
            return Err(app_err!("jira.page_size must be at least 1"));
        }

        if self.github.max_concurrent_requests == 0 {
            return Err(app_err!("github.max_concurrent_requests must be at least 1"));
        }

        if self.reports.max_compared_reports < 2 {
            return Err(app_err!(
                "reports.max_compared_reports must be at least 2, got {}",
                self.reports.max_compared_reports
            ));
        }

        if self.reports.rework_threshold <= 0.0 {
            return Err(app_err!(
                "reports.rework_threshold must be positive, got {}",
                self.reports.rework_threshold
            ));
        }

        validate_phases("comparison.jira_phases", &self.comparison.jira_phases)?;
        validate_phases("comparison.github_phases", &self.comparison.github_phases)?;

        Ok(())
    }
}

fn validate_phases(key: &str, phases: &[Phase]) -> Result<()> {
    let mut names = HashSet::default();

    for phase in phases {
        if phase.end < phase.start {
            return Err(app_err!(
                "{key}: phase '{}' ends ({}) before it starts ({})",
                phase.name,
                phase.end,
                phase.start
            ));
        }

        if !names.insert(phase.name.as_str()) {
            return Err(app_err!("{key}: phase '{}' is defined more than once", phase.name));
        }
    }

    Ok(())
}
