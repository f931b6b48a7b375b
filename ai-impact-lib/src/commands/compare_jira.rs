use super::Host;
use super::common::{GlobalArgs, Session, output_path};
use crate::Result;
use crate::analysis::file_stamp;
use crate::reports::{
    JIRA_COMPARISON_PREFIX, JIRA_REPORT_PREFIX, JiraComparison, build_jira_comparison, find_reports, generate_tsv, generate_xlsx,
    parse_jira_report, report_owner, stamp_from_file_name,
};
use camino::Utf8PathBuf;
use chrono::Local;
use clap::Args;
use ohno::IntoAppError;
use std::fs;
use std::io::Write;

const LOG_TARGET: &str = "  commands";

#[derive(Args, Debug)]
pub struct CompareJiraArgs {
    /// Compare the reports of this assignee instead of the team-wide reports
    #[arg(long, value_name = "USER")]
    pub assignee: Option<String>,

    /// Jira project key shown in the header
    #[arg(long, value_name = "KEY", env = "JIRA_PROJECT_KEY")]
    pub project: Option<String>,

    /// Write the comparison to this file instead of the reports directory
    #[arg(long, value_name = "PATH", help_heading = "Report Output")]
    pub output: Option<Utf8PathBuf>,

    /// Also write the comparison as an Excel workbook to this file
    #[arg(long, value_name = "PATH", help_heading = "Report Output")]
    pub excel: Option<Utf8PathBuf>,
}

/// Compare the most recent Jira reports phase by phase and write the result as TSV.
pub fn compare_jira<H: Host>(host: &mut H, global: &GlobalArgs, args: &CompareJiraArgs) -> Result<()> {
    let mut session = Session::new(host, global)?;
    let jira_dir = session.config.reports.jira_dir();
    let assignee = args.assignee.as_deref();

    let files = find_reports(
        &jira_dir,
        JIRA_REPORT_PREFIX,
        assignee,
        "txt",
        session.config.reports.max_compared_reports,
    )?;

    let mut reports = Vec::with_capacity(files.len());
    for file in &files {
        log::info!(target: LOG_TARGET, "Reading '{file}'");
        let text = fs::read_to_string(file).into_app_err_with(|| format!("reading report '{file}'"))?;
        reports.push(parse_jira_report(&text));
    }

    let now = Local::now();
    let project = args
        .project
        .as_deref()
        .filter(|p| !p.is_empty())
        .or_else(|| Some(session.config.jira.project.as_str()).filter(|p| !p.is_empty()))
        .unwrap_or("N/A");

    let comparison = &session.config.comparison;
    let options = JiraComparison {
        assignee,
        project,
        phases: &comparison.jira_phases,
        states: &comparison.states,
        reentry_states: &comparison.reentry_states,
        issue_types: &comparison.issue_types,
        top_changes: session.config.reports.top_changes,
        generated_on: now.date_naive(),
    };
    let table = build_jira_comparison(&reports, &options)?;

    let mut tsv = String::new();
    generate_tsv(&table, &mut tsv)?;
    let _ = write!(session.host().output(), "{tsv}");

    // the comparison carries the stamp of the newest report it covers
    let stamp = files
        .last()
        .and_then(|file| stamp_from_file_name(file))
        .map_or_else(|| file_stamp(&now), ToString::to_string);
    let file_name = format!("{JIRA_COMPARISON_PREFIX}_{}_{stamp}.tsv", report_owner(assignee));
    let path = output_path(args.output.as_ref(), &jira_dir, &file_name);
    session.save("Comparison", &path, tsv)?;

    if let Some(excel_path) = &args.excel {
        let mut workbook = Vec::new();
        generate_xlsx(&table, "Jira Comparison", &mut workbook)?;
        session.save("Excel workbook", excel_path, workbook)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::common::{ColorMode, LogLevel};
    use crate::commands::host::TestHost;

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_compare_jira_requires_phases() {
        let tmp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        let config = root.join("impact.toml");
        let jira_dir = root.join("reports").join("jira");
        fs::create_dir_all(&jira_dir).unwrap();
        fs::write(&config, format!("[reports]\noutput_dir = '{}'\n", root.join("reports"))).unwrap();
        for stamp in ["20250101_090000", "20250201_090000"] {
            fs::write(jira_dir.join(format!("jira_report_general_{stamp}.txt")), "Total issues: 3\n").unwrap();
        }

        let global = GlobalArgs {
            log_level: LogLevel::None,
            color: ColorMode::Never,
            config: Some(config),
        };
        let args = CompareJiraArgs {
            assignee: None,
            project: None,
            output: None,
            excel: None,
        };

        let mut host = TestHost::default();
        let err = compare_jira(&mut host, &global, &args).unwrap_err();
        assert!(err.to_string().contains("jira_phases"));
    }
}
