//! End-to-end tests for the tt-core binary.
//!
//! Every command runs with an isolated config directory so a developer's
//! own protocol.json never leaks into assertions.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const LABELS: [&str; 6] = ["A1", "A2", "A3", "B1", "B2", "B3"];

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Workspace {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, content).expect("write fixture");
        path
    }

    /// `total` records for `session`, the first `correct` answering correctly.
    fn records(&self, name: &str, session: &str, total: usize, correct: usize) -> PathBuf {
        let rows: Vec<Value> = (0..total)
            .map(|i| {
                json!({
                    "record_id": format!("{}-r{:03}", session, i),
                    "session_id": session,
                    "group": LABELS[i % 6],
                    "submitted_answer": if i < correct { "417" } else { "233" },
                    "correct_answer": "417",
                    "submitted_at": format!("2024-05-01T09:{:02}:00Z", i % 60),
                    "submitter": format!("panelist {}", i),
                })
            })
            .collect();
        self.write(name, &serde_json::to_string(&rows).expect("serialize"))
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("tt-core").expect("tt-core binary should exist");
        cmd.env("XDG_CONFIG_HOME", self.dir.path())
            .env_remove("TRIANGLE_TEST_CONFIG")
            .env_remove("RUST_LOG")
            .env("TT_LOG", "off");
        cmd
    }
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 path")
}

mod verdict {
    use super::*;

    #[test]
    fn correct_count_at_threshold_fails_with_code_1() {
        let ws = Workspace::new();
        let records = ws.records("records.json", "s1", 36, 18);
        let output = ws
            .cmd()
            .args(["verdict", "--records", path_arg(&records)])
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(1));
        let body = stdout_json(&output);
        let verdict = &body["report"]["verdict"];
        assert_eq!(verdict["threshold"], 18);
        assert_eq!(verdict["observed_correct"], 18);
        assert_eq!(verdict["significant"], true);
        assert_eq!(verdict["pass"], false);
        assert_eq!(body["session_id"], "s1");
        assert_eq!(body["config"]["source"]["resolution"], "default");
    }

    #[test]
    fn below_threshold_passes() {
        let ws = Workspace::new();
        let records = ws.records("records.json", "s1", 36, 5);
        ws.cmd()
            .args(["verdict", "--records", path_arg(&records), "--format", "summary"])
            .assert()
            .code(0)
            .stdout(predicate::str::contains("[s1] PASS 5/36 correct (threshold 18"));
    }

    #[test]
    fn short_sample_reports_shortage() {
        let ws = Workspace::new();
        let records = ws.records("records.json", "s1", 30, 0);
        let output = ws
            .cmd()
            .args(["verdict", "--records", path_arg(&records)])
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(1));
        let verdict = &stdout_json(&output)["report"]["verdict"];
        assert_eq!(verdict["count_shortage"], true);
        assert!(verdict["count_shortage_warning"]
            .as_str()
            .unwrap()
            .contains("Only 30 of 36"));
    }

    #[test]
    fn similarity_test_from_flag() {
        let ws = Workspace::new();
        let records = ws.records("records.json", "s1", 42, 10);
        let output = ws
            .cmd()
            .args([
                "verdict",
                "--records",
                path_arg(&records),
                "--test-type",
                "similarity test",
            ])
            .output()
            .unwrap();
        let verdict = &stdout_json(&output)["report"]["verdict"];
        assert_eq!(verdict["expected_total"], 42);
        assert_eq!(verdict["threshold"], 17);
        assert_eq!(output.status.code(), Some(0));
    }

    #[test]
    fn protocol_file_sets_group_size() {
        let ws = Workspace::new();
        let protocol = ws.write("protocol.json", r#"{"group_size": 8}"#);
        let records = ws.records("records.json", "s1", 48, 0);
        let output = ws
            .cmd()
            .args([
                "--config",
                path_arg(&protocol),
                "verdict",
                "--records",
                path_arg(&records),
            ])
            .output()
            .unwrap();
        let body = stdout_json(&output);
        assert_eq!(body["report"]["verdict"]["expected_total"], 48);
        assert_eq!(body["report"]["verdict"]["threshold"], 22);
        assert_eq!(body["config"]["source"]["resolution"], "cli");
    }

    #[test]
    fn markdown_output() {
        let ws = Workspace::new();
        let records = ws.records("records.json", "s1", 36, 18);
        ws.cmd()
            .args(["verdict", "--records", path_arg(&records), "--format", "md"])
            .assert()
            .code(1)
            .stdout(
                predicate::str::contains("# Triangle Test s1")
                    .and(predicate::str::contains("## Groups"))
                    .and(predicate::str::contains("✗ FAIL")),
            );
    }

    #[test]
    fn picks_most_recent_session_unless_told_otherwise() {
        let ws = Workspace::new();
        let old = std::fs::read_to_string(ws.records("a.json", "old", 36, 0)).unwrap();
        let mut rows: Vec<Value> = serde_json::from_str(&old).unwrap();
        rows.push(json!({
            "record_id": "new-1", "session_id": "new", "group": "A1",
            "submitted_answer": "1", "correct_answer": "1",
            "submitted_at": "2024-06-01T09:00:00Z"
        }));
        let records = ws.write("mixed.json", &serde_json::to_string(&rows).unwrap());

        let output = ws
            .cmd()
            .args(["verdict", "--records", path_arg(&records)])
            .output()
            .unwrap();
        assert_eq!(stdout_json(&output)["session_id"], "new");

        let output = ws
            .cmd()
            .args(["verdict", "--records", path_arg(&records), "--session", "old"])
            .output()
            .unwrap();
        let body = stdout_json(&output);
        assert_eq!(body["session_id"], "old");
        assert_eq!(body["ingest"]["sessions_seen"], 2);
    }
}

mod errors {
    use super::*;

    #[test]
    fn empty_records_exit_15() {
        let ws = Workspace::new();
        let records = ws.write("records.json", "[]");
        ws.cmd()
            .args(["verdict", "--records", path_arg(&records)])
            .assert()
            .code(15)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("\"code\":20"));
    }

    #[test]
    fn unknown_session_exit_15() {
        let ws = Workspace::new();
        let records = ws.records("records.json", "s1", 36, 0);
        ws.cmd()
            .args([
                "verdict",
                "--records",
                path_arg(&records),
                "--session",
                "nope",
                "--format",
                "md",
            ])
            .assert()
            .code(15)
            .stderr(predicate::str::contains("no response records for session nope"));
    }

    #[test]
    fn malformed_records_exit_10() {
        let ws = Workspace::new();
        let records = ws.write("records.json", "{ not json");
        ws.cmd()
            .args(["verdict", "--records", path_arg(&records)])
            .assert()
            .code(10);
    }

    #[test]
    fn missing_records_file_exit_21() {
        let ws = Workspace::new();
        ws.cmd()
            .args(["verdict", "--records", path_arg(&ws.path("absent.json"))])
            .assert()
            .code(21);
    }

    #[test]
    fn invalid_protocol_exit_11() {
        let ws = Workspace::new();
        let protocol = ws.write("protocol.json", r#"{"schema_version": "9.0.0"}"#);
        ws.cmd()
            .args(["config", "validate", path_arg(&protocol)])
            .assert()
            .code(11);
    }

    #[test]
    fn unknown_flag_exit_10() {
        Workspace::new()
            .cmd()
            .args(["threshold", "--bogus"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("error"));
    }
}

mod lookups {
    use super::*;

    #[test]
    fn threshold_command() {
        let ws = Workspace::new();
        let output = ws
            .cmd()
            .args(["threshold", "--sample-size", "40"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let body = stdout_json(&output);
        assert_eq!(body["threshold"], 19);
        assert_eq!(body["test_type"], "difference test");
        assert_eq!(body["out_of_domain"], false);
    }

    #[test]
    fn threshold_clamps_out_of_domain() {
        let ws = Workspace::new();
        let output = ws
            .cmd()
            .args([
                "threshold",
                "--sample-size",
                "-4",
                "--test-type",
                "similarity test",
            ])
            .output()
            .unwrap();
        let body = stdout_json(&output);
        assert_eq!(body["threshold"], 17);
        assert_eq!(body["clamped_sample_size"], 42);
        assert_eq!(body["out_of_domain"], true);
    }

    #[test]
    fn table_command_lists_domain() {
        let ws = Workspace::new();
        let output = ws.cmd().args(["table"]).output().unwrap();
        let body = stdout_json(&output);
        assert_eq!(body["rows"].as_array().unwrap().len(), 37);
        assert_eq!(body["rows"][0]["threshold"], 18);
        assert_eq!(body["rule"]["min_group_size"], 6);
    }

    #[test]
    fn seeded_sheet_is_reproducible() {
        let ws = Workspace::new();
        let run = || {
            ws.cmd()
                .args(["sheet", "--session", "s9", "--seed", "1234"])
                .output()
                .unwrap()
        };
        let first = run();
        let second = run();
        assert!(first.status.success());
        assert_eq!(first.stdout, second.stdout);
        let body = stdout_json(&first);
        assert_eq!(body["groups"].as_array().unwrap().len(), 6);
        assert_eq!(body["groups"][0]["qr_payload"], "s9|A1");
    }

    #[test]
    fn config_show_reports_defaults() {
        let ws = Workspace::new();
        let output = ws.cmd().args(["config", "show"]).output().unwrap();
        let body = stdout_json(&output);
        assert_eq!(body["config"]["source"]["resolution"], "default");
        assert_eq!(body["protocol"]["test_type"], "difference test");
    }
}

mod logging {
    use super::*;

    #[test]
    fn tt_log_off_silences_rust_log() {
        let ws = Workspace::new();
        ws.cmd()
            .env("RUST_LOG", "info")
            .env("TT_LOG", "off")
            .args(["threshold", "--sample-size", "40"])
            .assert()
            .success()
            .stderr(predicate::str::is_empty());
    }

    #[test]
    fn log_level_flag_silences_rust_log() {
        let ws = Workspace::new();
        ws.cmd()
            .env("RUST_LOG", "info")
            .env_remove("TT_LOG")
            .args(["--log-level", "off", "threshold", "--sample-size", "40"])
            .assert()
            .success()
            .stderr(predicate::str::is_empty());
    }

    #[test]
    fn rust_log_applies_when_nothing_overrides_it() {
        let ws = Workspace::new();
        ws.cmd()
            .env("RUST_LOG", "info")
            .env_remove("TT_LOG")
            .args(["threshold", "--sample-size", "40"])
            .assert()
            .success()
            .stderr(predicate::str::contains("tt-core started"));
    }
}
