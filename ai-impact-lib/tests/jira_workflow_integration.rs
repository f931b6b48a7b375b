//! Integration test for the `jira` and `compare-jira` commands.
//!
//! The Jira search endpoint is served by wiremock, and all reports land in a temporary
//! directory named by the configuration file.

use ai_impact_lib::Host;
use camino::Utf8PathBuf;
use std::fs;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test host that captures output to in-memory buffers.
struct TestHost {
    output_buf: Vec<u8>,
    error_buf: Vec<u8>,
}

impl TestHost {
    const fn new() -> Self {
        Self {
            output_buf: Vec::new(),
            error_buf: Vec::new(),
        }
    }

    fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.output_buf).into_owned()
    }
}

impl Host for TestHost {
    fn output(&mut self) -> impl std::io::Write {
        &mut self.output_buf
    }

    fn error(&mut self) -> impl std::io::Write {
        &mut self.error_buf
    }
}

const ISSUE: &str = r#"{
    "key": "KFLUXUI-101",
    "fields": {
        "created": "2025-01-02T09:00:00.000+0000",
        "resolutiondate": "2025-01-07T09:00:00.000+0000",
        "status": { "name": "Done" },
        "issuetype": { "name": "Story" },
        "customfield_12310243": 5.0
    },
    "changelog": {
        "histories": [
            { "created": "2025-01-03T09:00:00.000+0000", "items": [{ "field": "status", "fromString": "New", "toString": "In Progress" }] },
            { "created": "2025-01-06T09:00:00.000+0000", "items": [{ "field": "status", "fromString": "In Progress", "toString": "Review" }] },
            { "created": "2025-01-07T09:00:00.000+0000", "items": [{ "field": "status", "fromString": "Review", "toString": "Done" }] }
        ]
    }
}"#;

async fn mock_jira() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/search"))
        .and(query_param("maxResults", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{ "total": 1, "issues": [] }"#))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/search"))
        .and(query_param("startAt", "0"))
        .and(query_param("expand", "changelog"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(r#"{{ "total": 1, "issues": [{ISSUE}] }}"#)))
        .mount(&server)
        .await;

    server
}

fn reports_in(dir: &Utf8PathBuf, prefix: &str) -> Vec<Utf8PathBuf> {
    let mut found: Vec<Utf8PathBuf> = dir
        .read_dir_utf8()
        .expect("read report directory")
        .map(|entry| entry.expect("directory entry").into_path())
        .filter(|p| p.file_name().is_some_and(|name| name.starts_with(prefix)))
        .collect();
    found.sort();
    found
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
async fn test_jira_report_then_comparison() {
    let server = mock_jira().await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).expect("UTF-8 temp dir");
    let reports_dir = root.join("reports");
    let jira_dir = reports_dir.join("jira");
    let config_path = root.join("impact.toml");
    let json_path = root.join("analysis.json");

    fs::write(
        &config_path,
        format!(
            r#"
[reports]
output_dir = '{reports_dir}'

[[comparison.jira_phases]]
name = "No AI"
start = "2024-10-01"
end = "2024-12-31"

[[comparison.jira_phases]]
name = "Cursor"
start = "2025-01-01"
end = "2025-03-31"
"#
        ),
    )
    .expect("write config");

    let uri = server.uri();
    let mut host = TestHost::new();
    let result = ai_impact_lib::run(
        &mut host,
        [
            "ai-impact",
            "jira",
            "--jira-url",
            uri.as_str(),
            "--jira-token",
            "secret",
            "--project",
            "KFLUXUI",
            "--start",
            "2025-01-01",
            "--end",
            "2025-01-31",
            "--json",
            json_path.as_str(),
            "--config",
            config_path.as_str(),
            "--color",
            "never",
        ],
    )
    .await;

    assert!(result.is_ok(), "jira command failed: {result:?}");

    let output = host.output_str();
    assert!(output.contains("JIRA Data Analysis Report"));
    assert!(output.contains("Project: KFLUXUI"));
    assert!(output.contains("In Progress"));
    assert!(output.contains("Report saved to"));

    let saved = reports_in(&jira_dir, "jira_report_general_");
    assert_eq!(saved.len(), 1);
    let text = fs::read_to_string(&saved[0]).expect("read text report");
    assert!(output.contains(&text));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json_path).expect("read JSON")).expect("valid JSON");
    assert!(json.is_object());

    // a second report from an earlier run
    fs::copy(&saved[0], jira_dir.join("jira_report_general_20241231_120000.txt")).expect("copy report");

    let mut host = TestHost::new();
    let result = ai_impact_lib::run(
        &mut host,
        ["ai-impact", "compare-jira", "--config", config_path.as_str(), "--color", "never"],
    )
    .await;

    assert!(result.is_ok(), "compare-jira command failed: {result:?}");

    let output = host.output_str();
    assert!(output.contains("No AI"));
    assert!(output.contains("Cursor"));

    let comparisons = reports_in(&jira_dir, "jira_comparison_general_");
    assert_eq!(comparisons.len(), 1);

    let report_stamp = saved[0].file_name().and_then(|name| name.strip_prefix("jira_report_general_")).expect("stamp");
    let comparison_stamp = comparisons[0]
        .file_name()
        .and_then(|name| name.strip_prefix("jira_comparison_general_"))
        .expect("stamp");
    assert_eq!(report_stamp.trim_end_matches(".txt"), comparison_stamp.trim_end_matches(".tsv"));
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
async fn test_compare_jira_needs_two_reports() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).expect("UTF-8 temp dir");
    let jira_dir = root.join("reports").join("jira");
    fs::create_dir_all(&jira_dir).expect("create report directory");
    fs::write(jira_dir.join("jira_report_jdoe_20250101_090000.txt"), "Total: 1 issues\n").expect("write report");

    let config_path = root.join("impact.toml");
    fs::write(&config_path, format!("[reports]\noutput_dir = '{}'\n", root.join("reports"))).expect("write config");

    let mut host = TestHost::new();
    let result = ai_impact_lib::run(
        &mut host,
        [
            "ai-impact",
            "compare-jira",
            "--assignee",
            "jdoe@example.com",
            "--config",
            config_path.as_str(),
        ],
    )
    .await;

    let err = result.expect_err("a single report cannot be compared");
    assert!(err.to_string().contains("found 1"));
}
