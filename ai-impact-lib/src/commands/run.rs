//! Command dispatch logic for ai-impact

use super::{
    CompareJiraArgs, ComparePrsArgs, GlobalArgs, InitArgs, JiraArgs, PrsArgs, analyze_jira, analyze_prs, compare_jira, compare_prs,
    init_config,
};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "ai-impact", version, author, long_about = None)]
#[command(about = "Measure how AI-assisted development changes Jira and GitHub delivery metrics")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze how long resolved Jira issues spent in each status
    Jira(Box<JiraArgs>),
    /// Collect AI adoption and review metrics for merged pull requests
    Prs(Box<PrsArgs>),
    /// Compare the most recent Jira reports across phases
    CompareJira(CompareJiraArgs),
    /// Compare the most recent PR metric reports across phases
    ComparePrs(ComparePrsArgs),
    /// Generate a default configuration file
    Init(InitArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// # Errors
///
/// Returns an error if command parsing fails or if the executed command fails
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    let cli = Cli::parse_from(args);

    match &cli.command {
        Command::Jira(jira_args) => analyze_jira(host, &cli.global, jira_args).await,
        Command::Prs(prs_args) => analyze_prs(host, &cli.global, prs_args).await,
        Command::CompareJira(compare_args) => compare_jira(host, &cli.global, compare_args),
        Command::ComparePrs(compare_args) => compare_prs(host, &cli.global, compare_args),
        Command::Init(init_args) => init_config(host, init_args),
    }
}
