use super::Host;
use super::common::{GlobalArgs, Session, output_path};
use crate::Result;
use crate::reports::{
    PR_COMPARISON_PREFIX, PR_METRICS_PREFIX, PrComparison, build_pr_comparison, find_reports, generate_tsv, generate_xlsx,
    parse_pr_report, report_file_name,
};
use camino::Utf8PathBuf;
use chrono::Local;
use clap::Args;
use ohno::{IntoAppError, app_err};
use std::fs;
use std::io::Write;

const LOG_TARGET: &str = "  commands";

#[derive(Args, Debug)]
pub struct ComparePrsArgs {
    /// Compare the reports of this author instead of the repository-wide reports
    #[arg(long, value_name = "LOGIN")]
    pub author: Option<String>,

    /// Repository owner shown in the header
    #[arg(long, value_name = "OWNER", env = "GITHUB_REPO_OWNER")]
    pub owner: Option<String>,

    /// Repository name shown in the header
    #[arg(long, value_name = "NAME", env = "GITHUB_REPO_NAME")]
    pub repo: Option<String>,

    /// Write the comparison to this file instead of the reports directory
    #[arg(long, value_name = "PATH", help_heading = "Report Output")]
    pub output: Option<Utf8PathBuf>,

    /// Also write the comparison as an Excel workbook to this file
    #[arg(long, value_name = "PATH", help_heading = "Report Output")]
    pub excel: Option<Utf8PathBuf>,
}

/// Compare the most recent PR metric reports against the configured phases and write the result as TSV.
pub fn compare_prs<H: Host>(host: &mut H, global: &GlobalArgs, args: &ComparePrsArgs) -> Result<()> {
    let mut session = Session::new(host, global)?;
    let github_dir = session.config.reports.github_dir();
    let author = args.author.as_deref();

    let files = find_reports(
        &github_dir,
        PR_METRICS_PREFIX,
        author,
        "json",
        session.config.reports.max_compared_reports,
    )?;

    let mut reports = Vec::with_capacity(files.len());
    for file in &files {
        log::info!(target: LOG_TARGET, "Reading '{file}'");
        let text = fs::read_to_string(file).into_app_err_with(|| format!("reading report '{file}'"))?;
        reports.push(parse_pr_report(&text).map_err(|e| app_err!("report '{file}': {e}"))?);
    }

    let github = &session.config.github;
    let owner = pick(args.owner.as_deref(), &github.owner);
    let repo = pick(args.repo.as_deref(), &github.repo);
    let repository = match (owner, repo) {
        (Some(owner), Some(repo)) => format!("{owner}/{repo}"),
        _ => "N/A".to_string(),
    };

    let now = Local::now();
    let options = PrComparison {
        author,
        repository: &repository,
        phases: &session.config.comparison.github_phases,
        ai_tools: &github.ai_tools,
        generated_on: now.date_naive(),
    };
    let table = build_pr_comparison(&reports, &options)?;

    let mut tsv = String::new();
    generate_tsv(&table, &mut tsv)?;
    let _ = write!(session.host().output(), "{tsv}");

    let path = output_path(
        args.output.as_ref(),
        &github_dir,
        &report_file_name(PR_COMPARISON_PREFIX, author, &now, "tsv"),
    );
    session.save("Comparison", &path, tsv)?;

    if let Some(excel_path) = &args.excel {
        let mut workbook = Vec::new();
        generate_xlsx(&table, "PR Comparison", &mut workbook)?;
        session.save("Excel workbook", excel_path, workbook)?;
    }

    Ok(())
}

fn pick<'v>(arg: Option<&'v str>, configured: &'v str) -> Option<&'v str> {
    arg.filter(|value| !value.is_empty())
        .or_else(|| Some(configured).filter(|value| !value.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick() {
        assert_eq!(pick(Some("acme"), "other"), Some("acme"));
        assert_eq!(pick(None, "other"), Some("other"));
        assert_eq!(pick(Some(""), ""), None);
    }
}
