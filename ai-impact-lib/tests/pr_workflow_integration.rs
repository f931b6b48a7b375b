//! Integration test for the `prs` and `compare-prs` commands.
//!
//! The GitHub REST API is served by wiremock: two merged pull requests, one per month,
//! the second written with AI assistance.

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

fn pull(number: u64, author: &str, created: &str, merged: &str) -> String {
    format!(
        r#"{{ "number": {number}, "title": "PR {number}", "user": {{ "login": "{author}" }},
             "html_url": "https://github.com/acme/widgets/pull/{number}",
             "created_at": "{created}", "updated_at": "{merged}", "merged_at": "{merged}" }}"#
    )
}

async fn mount_json(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mock_github() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/pulls"))
        .and(query_param("state", "closed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "[{}, {}, {}]",
            pull(2, "alice", "2025-02-10T09:00:00Z", "2025-02-12T09:00:00Z"),
            pull(3, "dependabot[bot]", "2025-02-01T09:00:00Z", "2025-02-01T10:00:00Z"),
            pull(1, "bob", "2025-01-10T09:00:00Z", "2025-01-14T09:00:00Z"),
        )))
        .mount(&server)
        .await;

    for number in [1, 2] {
        let base = format!("/repos/acme/widgets/pulls/{number}");
        mount_json(&server, &base, r#"{ "additions": 120, "deletions": 30, "changed_files": 4 }"#).await;
        mount_json(&server, &format!("{base}/comments"), "[]").await;
        mount_json(
            &server,
            &format!("/repos/acme/widgets/issues/{number}/comments"),
            r#"[{ "user": { "login": "coderabbitai" }, "body": "Walkthrough of the changes in this pull request" }]"#,
        )
        .await;
    }

    mount_json(&server, "/repos/acme/widgets/pulls/1/commits", r#"[{ "commit": { "message": "Fix pagination" } }]"#).await;
    mount_json(
        &server,
        "/repos/acme/widgets/pulls/2/commits",
        r#"[{ "commit": { "message": "Add export\n\nAssisted-by: Claude" } }, { "commit": { "message": "Address review" } }]"#,
    )
    .await;

    mount_json(
        &server,
        "/repos/acme/widgets/pulls/1/reviews",
        r#"[{ "id": 11, "user": { "login": "carol" }, "body": "", "state": "APPROVED", "submitted_at": "2025-01-11T09:00:00Z" }]"#,
    )
    .await;
    mount_json(
        &server,
        "/repos/acme/widgets/pulls/2/reviews",
        r#"[{ "id": 21, "user": { "login": "carol" }, "body": "Please add a test for the empty case", "state": "CHANGES_REQUESTED", "submitted_at": "2025-02-10T15:00:00Z" },
            { "id": 22, "user": { "login": "carol" }, "body": "", "state": "APPROVED", "submitted_at": "2025-02-11T09:00:00Z" }]"#,
    )
    .await;

    server
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
async fn test_pr_reports_then_comparison() {
    let server = mock_github().await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).expect("UTF-8 temp dir");
    let reports_dir = root.join("reports");
    let github_dir = reports_dir.join("github");
    let config_path = root.join("impact.toml");

    fs::write(
        &config_path,
        format!(
            r#"
[github]
api_url = '{}'
owner = "acme"
repo = "widgets"

[reports]
output_dir = '{reports_dir}'

[[comparison.github_phases]]
name = "No AI"
start = "2025-01-01"
end = "2025-01-31"

[[comparison.github_phases]]
name = "Claude"
start = "2025-02-01"
end = "2025-02-28"
"#,
            server.uri()
        ),
    )
    .expect("write config");

    let months = [
        ("2025-01-01", "2025-01-31", "pr_metrics_general_20250201_080000.json"),
        ("2025-02-01", "2025-02-28", "pr_metrics_general_20250301_080000.json"),
    ];

    for (start, end, file_name) in months {
        let output = github_dir.join(file_name);
        let mut host = TestHost::new();
        let result = ai_impact_lib::run(
            &mut host,
            [
                "ai-impact",
                "prs",
                "--start",
                start,
                "--end",
                end,
                "--output",
                output.as_str(),
                "--config",
                config_path.as_str(),
                "--color",
                "never",
            ],
        )
        .await;

        assert!(result.is_ok(), "prs command failed: {result:?}");
        let printed = host.output_str();
        assert!(printed.contains("acme/widgets"));
        assert!(printed.contains(&format!("JSON report saved to {output}")));

        let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).expect("read JSON")).expect("valid JSON");
        let prs = report["prs"].as_array().expect("prs array");
        assert_eq!(prs.len(), 1, "one pull request merged in {start}..{end}");
    }

    let february: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(github_dir.join(months[1].2)).expect("read JSON")).expect("valid JSON");
    assert_eq!(february["prs"][0]["pr_number"].as_u64(), Some(2));
    assert_eq!(february["prs"][0]["has_ai_assistance"].as_bool(), Some(true));
    assert_eq!(february["statistics"]["ai_assisted_prs"].as_u64(), Some(1));

    let excel_path = root.join("comparison.xlsx");
    let mut host = TestHost::new();
    let result = ai_impact_lib::run(
        &mut host,
        [
            "ai-impact",
            "compare-prs",
            "--excel",
            excel_path.as_str(),
            "--config",
            config_path.as_str(),
            "--color",
            "never",
        ],
    )
    .await;

    assert!(result.is_ok(), "compare-prs command failed: {result:?}");

    let output = host.output_str();
    assert!(output.contains("No AI"));
    assert!(output.contains("Claude"));
    assert!(output.contains("acme/widgets"));

    let workbook = fs::read(&excel_path).expect("read workbook");
    assert!(workbook.starts_with(b"PK"), "xlsx files are zip archives");
}

#[tokio::test]
async fn test_prs_rejects_reversed_window() {
    let mut host = TestHost::new();
    let result = ai_impact_lib::run(
        &mut host,
        ["ai-impact", "prs", "--start", "2025-02-01", "--end", "2025-01-01", "--owner", "acme", "--repo", "widgets"],
    )
    .await;

    let err = result.expect_err("end before start");
    assert!(err.to_string().contains("before --start"));
}
