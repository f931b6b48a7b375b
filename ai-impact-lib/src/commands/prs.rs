use super::Host;
use super::common::{GlobalArgs, Session, output_path, required};
use crate::Result;
use crate::analysis::{Classifier, PrMetrics, PrStatistics};
use crate::facts::Progress;
use crate::facts::github::{Client, Provider, PullFacts};
use crate::reports::{
    Filter, PR_METRICS_PREFIX, PR_REPORT_PREFIX, Period, PrReport, Repository, generate_pr_json, generate_pr_text, report_file_name,
};
use camino::Utf8PathBuf;
use chrono::{Local, NaiveDate};
use clap::Args;
use ohno::app_err;
use std::io::Write;

const LOG_TARGET: &str = "  commands";

#[derive(Args, Debug)]
pub struct PrsArgs {
    /// First day of the merge window (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub start: NaiveDate,

    /// Last day of the merge window (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub end: NaiveDate,

    /// Only include pull requests opened by this GitHub user
    #[arg(long, value_name = "LOGIN")]
    pub author: Option<String>,

    /// Write the JSON report to this file instead of the reports directory, skipping the text report
    #[arg(long, value_name = "PATH", help_heading = "Report Output")]
    pub output: Option<Utf8PathBuf>,

    /// Repository owner
    #[arg(long, value_name = "OWNER", env = "GITHUB_REPO_OWNER")]
    pub owner: Option<String>,

    /// Repository name
    #[arg(long, value_name = "NAME", env = "GITHUB_REPO_NAME")]
    pub repo: Option<String>,

    /// GitHub personal access token
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,
}

/// Collect metrics for pull requests merged in a date window and write the PR reports.
pub async fn analyze_prs<H: Host>(host: &mut H, global: &GlobalArgs, args: &PrsArgs) -> Result<()> {
    if args.end < args.start {
        return Err(app_err!("--end ({}) is before --start ({})", args.end, args.start));
    }

    let mut session = Session::new(host, global)?;
    let config = session.config.github.clone();

    let owner = required(args.owner.as_deref(), &config.owner, "--owner", "github.owner")?;
    let repo = required(args.repo.as_deref(), &config.repo, "--repo", "github.repo")?;

    let client = Client::new(&config.api_url, owner, repo, args.github_token.as_deref(), config.request_timeout)?;
    let provider = Provider::new(client, &config.bot_users, config.max_concurrent_requests);

    let progress = session.progress();
    let fetched = fetch_pulls(&provider, args, &progress).await;
    progress.done();
    let facts = fetched?;
    if facts.is_empty() {
        let _ = writeln!(
            session.host().error(),
            "No merged pull requests found in {owner}/{repo} between {} and {}",
            args.start,
            args.end
        );
    }

    let classifier = Classifier::new(&config.bot_users, &config.ai_tools);
    let prs: Vec<PrMetrics> = facts.iter().filter_map(|f| PrMetrics::compute(f, &classifier)).collect();
    let stats = PrStatistics::compute(&prs, &config.ai_tools);
    log::info!(
        target: LOG_TARGET,
        "Computed metrics for {} pull request(s), {} AI-assisted",
        stats.total_prs,
        stats.ai_assisted_prs
    );

    let generated_at = Local::now();
    let report = PrReport {
        analysis_date: generated_at.to_rfc3339(),
        period: Period {
            start_date: args.start,
            end_date: args.end,
        },
        repository: Repository {
            owner: owner.to_string(),
            name: repo.to_string(),
        },
        filter: Filter {
            author: args.author.clone(),
        },
        statistics: stats.to_json(),
        prs,
    };

    let mut text = String::new();
    generate_pr_text(&report, &stats, generated_at, &mut text)?;
    let _ = write!(session.host().output(), "{text}");

    let github_dir = session.config.reports.github_dir();
    let author = args.author.as_deref();

    let mut json = String::new();
    generate_pr_json(&report, &mut json)?;
    let json_path = output_path(
        args.output.as_ref(),
        &github_dir,
        &report_file_name(PR_METRICS_PREFIX, author, &generated_at, "json"),
    );
    session.save("JSON report", &json_path, json)?;

    if args.output.is_none() {
        let text_path = github_dir.join(report_file_name(PR_REPORT_PREFIX, author, &generated_at, "txt"));
        session.save("Report", &text_path, text)?;
    }

    Ok(())
}

async fn fetch_pulls(provider: &Provider, args: &PrsArgs, progress: &dyn Progress) -> Result<Vec<PullFacts>> {
    progress.set_phase("Listing");
    let mut pulls = provider.fetch_merged_prs(args.start, args.end, progress).await?;

    if let Some(author) = &args.author {
        pulls.retain(|pull| pull.author() == author.as_str());
        log::info!(target: LOG_TARGET, "{} pull request(s) by '{author}'", pulls.len());
    }

    progress.set_phase("Reviewing");
    Ok(provider.fetch_pull_facts(pulls, progress).await)
}
