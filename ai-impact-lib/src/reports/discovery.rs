//! Naming and locating report files on disk.
//!
//! Reports are named `<prefix>_<who>_<YYYYMMDD_HHMMSS>.<ext>`, where `who` is the normalized
//! user name or `general` for team-wide runs, so sorting by name sorts by creation time.

use super::common::normalize_username;
use crate::Result;
use crate::analysis::file_stamp;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, TimeZone};
use ohno::{IntoAppError, app_err};
use regex::Regex;
use std::sync::LazyLock;

const LOG_TARGET: &str = "   reports";

static STAMP_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_(\d{8}_\d{6})\.[A-Za-z]+$").expect("invalid regex"));

pub const JIRA_REPORT_PREFIX: &str = "jira_report";
pub const JIRA_COMPARISON_PREFIX: &str = "jira_comparison";
pub const PR_METRICS_PREFIX: &str = "pr_metrics";
pub const PR_REPORT_PREFIX: &str = "pr_report";
pub const PR_COMPARISON_PREFIX: &str = "pr_comparison";

/// The file-name component identifying whose data a report holds.
#[must_use]
pub fn report_owner(user: Option<&str>) -> &str {
    user.map_or("general", normalize_username)
}

/// File name for a report written at `when`.
#[must_use]
pub fn report_file_name<Tz: TimeZone>(prefix: &str, user: Option<&str>, when: &DateTime<Tz>, extension: &str) -> String
where
    Tz::Offset: core::fmt::Display,
{
    format!("{prefix}_{}_{}.{extension}", report_owner(user), file_stamp(when))
}

/// The `YYYYMMDD_HHMMSS` stamp embedded in a report file name.
#[must_use]
pub fn stamp_from_file_name(path: &Utf8Path) -> Option<&str> {
    let name = path.file_name()?;
    STAMP_REGEX.captures(name)?.get(1).map(|m| m.as_str())
}

/// Find the most recent reports for `user` in `dir`, oldest first.
///
/// At most `max` reports are returned; fewer than two is an error since there would be
/// nothing to compare.
pub fn find_reports(dir: &Utf8Path, prefix: &str, user: Option<&str>, extension: &str, max: usize) -> Result<Vec<Utf8PathBuf>> {
    let name_prefix = format!("{prefix}_{}_", report_owner(user));
    let suffix = format!(".{extension}");
    let name_regex = Regex::new(&format!(r"^{}\d{{8}}_\d{{6}}{}$", regex::escape(&name_prefix), regex::escape(&suffix)))
        .into_app_err_with(|| format!("building the report name pattern for '{name_prefix}*{suffix}'"))?;

    let entries = dir
        .read_dir_utf8()
        .into_app_err_with(|| format!("reading report directory '{dir}'"))?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.into_app_err_with(|| format!("reading report directory '{dir}'"))?;
        let name = entry.file_name();
        if name_regex.is_match(name) {
            found.push(entry.into_path());
        }
    }

    found.sort_unstable();
    if found.len() > max {
        let _ = found.drain(..found.len() - max);
    }

    log::debug!(target: LOG_TARGET, "Found {} '{name_prefix}*{suffix}' report(s) in '{dir}'", found.len());

    if found.len() < 2 {
        return Err(app_err!(
            "need at least 2 '{name_prefix}*{suffix}' reports in '{dir}' for a comparison, found {}",
            found.len()
        ));
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::fs;

    fn touch(dir: &Utf8Path, name: &str) {
        fs::write(dir.join(name), "").unwrap();
    }

    fn temp_dir() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_report_file_name() {
        let when = Utc.with_ymd_and_hms(2024, 10, 2, 8, 5, 9).unwrap();

        assert_eq!(
            report_file_name(JIRA_REPORT_PREFIX, Some("rh-ee-jdoe@example.com"), &when, "txt"),
            "jira_report_jdoe_20241002_080509.txt"
        );
        assert_eq!(
            report_file_name(PR_METRICS_PREFIX, None, &when, "json"),
            "pr_metrics_general_20241002_080509.json"
        );
    }

    #[test]
    fn test_stamp_from_file_name() {
        assert_eq!(
            stamp_from_file_name(Utf8Path::new("reports/jira/jira_report_general_20240105_101500.txt")),
            Some("20240105_101500")
        );
        assert_eq!(stamp_from_file_name(Utf8Path::new("jira_report_general.txt")), None);
        assert_eq!(stamp_from_file_name(Utf8Path::new("notes_2024_01.txt")), None);
    }

    #[test]
    fn test_find_reports_keeps_most_recent() {
        let (_guard, dir) = temp_dir();
        for stamp in ["20240101_000000", "20240201_000000", "20240301_000000", "20240401_000000"] {
            touch(&dir, &format!("jira_report_jdoe_{stamp}.txt"));
        }
        touch(&dir, "jira_report_general_20240501_000000.txt");
        touch(&dir, "jira_report_jdoe_20240601_000000.json");
        touch(&dir, "jira_report_jdoe_latest.txt");

        let found = find_reports(&dir, JIRA_REPORT_PREFIX, Some("jdoe-2"), "txt", 3).unwrap();
        let names: Vec<&str> = found.iter().filter_map(|p| p.file_name()).collect();

        assert_eq!(
            names,
            [
                "jira_report_jdoe_20240201_000000.txt",
                "jira_report_jdoe_20240301_000000.txt",
                "jira_report_jdoe_20240401_000000.txt",
            ]
        );
    }

    #[test]
    fn test_find_reports_ignores_other_users_with_same_prefix() {
        let (_guard, dir) = temp_dir();
        touch(&dir, "jira_report_jdoe_20240101_000000.txt");
        touch(&dir, "jira_report_jdoe_20240301_000000.txt");
        touch(&dir, "jira_report_jdoe_smith_20240201_000000.txt");
        touch(&dir, "jira_report_jdoe_20240401_000000.txt.bak");

        let found = find_reports(&dir, JIRA_REPORT_PREFIX, Some("jdoe"), "txt", 4).unwrap();
        let names: Vec<&str> = found.iter().filter_map(|p| p.file_name()).collect();

        assert_eq!(
            names,
            ["jira_report_jdoe_20240101_000000.txt", "jira_report_jdoe_20240301_000000.txt"]
        );
    }

    #[test]
    fn test_find_reports_needs_two() {
        let (_guard, dir) = temp_dir();
        touch(&dir, "pr_metrics_general_20240101_000000.json");

        let err = find_reports(&dir, PR_METRICS_PREFIX, None, "json", 4).unwrap_err();
        assert!(err.to_string().contains("found 1"));
    }

    #[test]
    fn test_find_reports_missing_directory() {
        let (_guard, dir) = temp_dir();
        let _ = find_reports(&dir.join("missing"), PR_METRICS_PREFIX, None, "json", 4).unwrap_err();
    }
}
