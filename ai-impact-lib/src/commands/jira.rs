use super::Host;
use super::common::{GlobalArgs, Session, required};
use crate::Result;
use crate::analysis::{IssueStats, StateSummary, Velocity, compute};
use crate::facts::Progress;
use crate::facts::jira::{Client, Issue, IssueQuery, Provider, build_jql, build_story_jql};
use crate::reports::{JIRA_REPORT_PREFIX, JiraReport, generate_jira_json, generate_jira_text, report_file_name};
use camino::Utf8PathBuf;
use chrono::{Local, Utc};
use clap::Args;
use std::io::Write;

const LOG_TARGET: &str = "  commands";

#[derive(Args, Debug)]
pub struct JiraArgs {
    /// Only include issues resolved on or after this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub start: Option<String>,

    /// Only include issues resolved on or before this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub end: Option<String>,

    /// Status filter used when no dates are given (default from configuration)
    #[arg(long, value_name = "STATUS")]
    pub status: Option<String>,

    /// Jira project key
    #[arg(long, value_name = "KEY", env = "JIRA_PROJECT_KEY")]
    pub project: Option<String>,

    /// Only include issues assigned to this user
    #[arg(long, value_name = "USER")]
    pub assignee: Option<String>,

    /// Also write the analysis as JSON to this file
    #[arg(long, value_name = "PATH", help_heading = "Report Output")]
    pub json: Option<Utf8PathBuf>,

    /// Base URL of the Jira instance
    #[arg(long, value_name = "URL", env = "JIRA_URL")]
    pub jira_url: Option<String>,

    /// Jira personal access token
    #[arg(long, value_name = "TOKEN", env = "JIRA_API_TOKEN", hide_env_values = true)]
    pub jira_token: Option<String>,
}

/// Analyze resolved issues of a project and write the Jira report.
pub async fn analyze_jira<H: Host>(host: &mut H, global: &GlobalArgs, args: &JiraArgs) -> Result<()> {
    let mut session = Session::new(host, global)?;
    let config = session.config.jira.clone();

    let url = required(args.jira_url.as_deref(), &config.url, "--jira-url", "jira.url")?;
    let project = required(args.project.as_deref(), &config.project, "--project", "jira.project")?;

    let today = Local::now().date_naive();
    let query = IssueQuery {
        project,
        start: args.start.as_deref(),
        end: args.end.as_deref(),
        status: Some(args.status.as_deref().unwrap_or(&config.default_status)),
        assignee: args.assignee.as_deref(),
    };

    let jql = build_jql(&query, today);
    let story_jql = build_story_jql(project, query.start, query.end, today);
    log::info!(target: LOG_TARGET, "Analyzing issues matching '{jql}'");

    let client = Client::new(url, args.jira_token.as_deref(), &config.story_points_field, config.request_timeout)?;
    let provider = Provider::new(client, config.page_size);

    let progress = session.progress();
    let fetched = fetch_issues(&provider, &jql, &story_jql, &progress).await;
    progress.done();
    let (issues, stories) = fetched?;
    if issues.is_empty() {
        let _ = writeln!(session.host().error(), "No issues match '{jql}'");
    }

    let now = Utc::now();
    let durations: Vec<_> = issues.iter().map(|issue| compute(&issue.history(), now)).collect();
    let states: StateSummary = durations.iter().collect();
    log::info!(
        target: LOG_TARGET,
        "Analyzed {} issue(s), {} excluded, {} stories for velocity",
        states.analyzed_issues(),
        states.excluded_issues(),
        stories.len()
    );

    let report = JiraReport {
        generated_at: Local::now(),
        project: project.to_string(),
        assignee: args.assignee.clone(),
        start: args.start.clone(),
        end: args.end.clone(),
        status: args.status.clone(),
        jql,
        story_jql,
        stats: IssueStats::compute(&issues),
        states,
        velocity: Velocity::compute(&stories, &config.story_points_field),
        rework_threshold: session.config.reports.rework_threshold,
    };

    let mut text = String::new();
    generate_jira_text(&report, &mut text)?;
    let _ = write!(session.host().output(), "{text}");

    let file_name = report_file_name(JIRA_REPORT_PREFIX, args.assignee.as_deref(), &report.generated_at, "txt");
    let path = session.config.reports.jira_dir().join(file_name);
    session.save("Report", &path, text)?;

    if let Some(json_path) = &args.json {
        let mut json = String::new();
        generate_jira_json(&report, &mut json)?;
        session.save("JSON report", json_path, json)?;
    }

    Ok(())
}

async fn fetch_issues(provider: &Provider, jql: &str, story_jql: &str, progress: &dyn Progress) -> Result<(Vec<Issue>, Vec<Issue>)> {
    progress.set_phase("Issues");
    let issues = provider.fetch_all(jql, progress).await?;

    progress.set_phase("Stories");
    let stories = provider.fetch_all(story_jql, progress).await?;

    Ok((issues, stories))
}
