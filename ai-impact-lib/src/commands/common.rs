//! Setup and output handling shared by all commands.

use super::config::Config;
use super::{Host, ProgressReporter};
use crate::Result;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, ValueEnum};
use core::time::Duration;
use ohno::IntoAppError;
use owo_colors::OwoColorize;
use std::fs;
use std::io::{IsTerminal, Write};

/// Color mode configuration for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Always use colors
    Always,

    /// Never use colors
    Never,

    /// Use colors if the output is a terminal, otherwise don't use colors
    Auto,
}

impl ColorMode {
    fn enabled(self, is_terminal: impl FnOnce() -> bool) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => is_terminal(),
        }
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

/// Options accepted by every command
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none", global = true)]
    pub log_level: LogLevel,

    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Path to configuration file (default is `impact.toml` in the current directory)
    #[arg(long, short = 'c', value_name = "PATH", global = true)]
    pub config: Option<Utf8PathBuf>,
}

/// State shared by the data collection and comparison commands.
pub struct Session<'a, H: Host> {
    pub config: Config,
    host: &'a mut H,
    log_level: LogLevel,
    color: ColorMode,
}

impl<'a, H: Host> Session<'a, H> {
    /// Set up logging and load the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded
    pub fn new(host: &'a mut H, args: &GlobalArgs) -> Result<Self> {
        init_logging(args.log_level);
        let config = Config::load(Utf8Path::new("."), args.config.as_ref())?;

        Ok(Self {
            config,
            host,
            log_level: args.log_level,
            color: args.color,
        })
    }

    /// A progress bar that only shows up when logging is off and the work takes a while.
    #[must_use]
    pub fn progress(&self) -> ProgressReporter {
        let delay = if self.log_level == LogLevel::None {
            Duration::from_millis(300)
        } else {
            Duration::from_hours(365 * 24)
        };

        ProgressReporter::new(delay, self.color.enabled(|| std::io::stderr().is_terminal()))
    }

    pub fn host(&mut self) -> &mut H {
        self.host
    }

    /// Write `contents` to `path`, creating parent directories, and tell the user where it went.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or the file cannot be written
    pub fn save(&mut self, what: &str, path: &Utf8Path, contents: impl AsRef<[u8]>) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_str().is_empty()
        {
            fs::create_dir_all(parent).into_app_err_with(|| format!("creating directory '{parent}'"))?;
        }

        fs::write(path, contents).into_app_err_with(|| format!("writing {what} to '{path}'"))?;

        let colors = self.color.enabled(|| std::io::stdout().is_terminal());
        if colors {
            let _ = writeln!(self.host.output(), "{} {what} saved to {}", "✓".green().bold(), path.bold());
        } else {
            let _ = writeln!(self.host.output(), "✓ {what} saved to {path}");
        }

        Ok(())
    }
}

/// Initialize logger based on log level
///
/// Only the first call in a process takes effect.
pub fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .try_init();
}

/// `explicit` when given, otherwise `file_name` inside `dir`.
#[must_use]
pub fn output_path(explicit: Option<&Utf8PathBuf>, dir: &Utf8Path, file_name: &str) -> Utf8PathBuf {
    explicit.cloned().unwrap_or_else(|| dir.join(file_name))
}

/// A required setting taken from the command line or, failing that, the configuration.
///
/// # Errors
///
/// Returns an error naming both sources when neither provides a value
pub fn required<'v>(arg: Option<&'v str>, configured: &'v str, flag: &str, key: &str) -> Result<&'v str> {
    arg.filter(|value| !value.is_empty())
        .or_else(|| Some(configured).filter(|value| !value.is_empty()))
        .ok_or_else(|| ohno::app_err!("{flag} is required, pass it on the command line or set '{key}' in the configuration"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_mode() {
        assert!(ColorMode::Always.enabled(|| false));
        assert!(!ColorMode::Never.enabled(|| true));
        assert!(ColorMode::Auto.enabled(|| true));
        assert!(!ColorMode::Auto.enabled(|| false));
    }

    #[test]
    fn test_output_path() {
        let dir = Utf8Path::new("reports/jira");
        assert_eq!(output_path(None, dir, "a.txt"), Utf8PathBuf::from("reports/jira/a.txt"));

        let explicit = Utf8PathBuf::from("out.txt");
        assert_eq!(output_path(Some(&explicit), dir, "a.txt"), explicit);
    }

    #[test]
    fn test_required() {
        assert_eq!(required(Some("KFLUXUI"), "OTHER", "--project", "jira.project").unwrap(), "KFLUXUI");
        assert_eq!(required(None, "OTHER", "--project", "jira.project").unwrap(), "OTHER");
        assert_eq!(required(Some(""), "OTHER", "--project", "jira.project").unwrap(), "OTHER");

        let err = required(None, "", "--project", "jira.project").unwrap_err();
        assert!(err.to_string().contains("jira.project"));
    }
}
