use std::path::{Path, PathBuf};

use assert_cmd::Command;
use oscshark_core::synth::{CaptureBuilder, OscArg, encode_osc_message, udp_ipv4_frame};
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("oscshark"))
}

fn osc_frame(source: [u8; 4], address: &str, args: &[OscArg]) -> Vec<u8> {
    let payload = encode_osc_message(address, args);
    udp_ipv4_frame(source, [10, 0, 0, 2], 9000, 8000, &payload).expect("udp frame")
}

/// Two sources: 10.0.0.1 sends `/test 42` and `/meter/1`, 10.0.0.3 sends `/fader 0.5`.
fn write_capture(dir: &Path, name: &str) -> PathBuf {
    let capture = CaptureBuilder::new()
        .section()
        .interface(1)
        .packet(1_000_000, &osc_frame([10, 0, 0, 1], "/test", &[OscArg::Int(42)]))
        .packet(
            1_250_000,
            &osc_frame([10, 0, 0, 3], "/fader", &[OscArg::Float(0.5)]),
        )
        .packet(1_500_000, &osc_frame([10, 0, 0, 1], "/meter/1", &[OscArg::Int(-3)]))
        .build();
    let path = dir.join(name);
    std::fs::write(&path, capture).expect("write capture");
    path
}

#[test]
fn missing_arguments_fail_with_usage() {
    cmd().assert().failure().stderr(contains("Usage"));
}

#[test]
fn csv_rows_go_to_stdout() {
    let temp = TempDir::new().expect("tempdir");
    let capture = write_capture(temp.path(), "show.pcapng");

    cmd()
        .arg(&capture)
        .assert()
        .success()
        .stdout(
            contains("1970-01-01 00:00:01.000,10.0.0.1,10.0.0.2,/test,42")
                .and(contains("1970-01-01 00:00:01.500,10.0.0.1,10.0.0.2,/meter/1,-3"))
                .and(contains("1970-01-01 00:00:01.250,10.0.0.3,10.0.0.2,/fader,0.5")),
        );
}

#[test]
fn json_report_groups_sources() {
    let temp = TempDir::new().expect("tempdir");
    let capture = write_capture(temp.path(), "show.pcapng");

    let output = cmd()
        .arg(&capture)
        .arg("--format")
        .arg("json")
        .arg("--pretty")
        .output()
        .expect("run");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(json["report_version"], 1);
    assert_eq!(json["tool"]["name"], "oscshark");
    assert_eq!(json["capture_summary"]["messages_kept"], 3);
    let sources = json["sources"].as_array().expect("sources");
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0]["source_ip"], "10.0.0.1");
    assert_eq!(sources[0]["messages"].as_array().expect("messages").len(), 2);
    assert_eq!(sources[1]["messages"][0]["address"], "/fader");
}

#[test]
fn allow_and_deny_flags_filter_addresses() {
    let temp = TempDir::new().expect("tempdir");
    let capture = write_capture(temp.path(), "show.pcapng");

    cmd()
        .arg(&capture)
        .arg("--deny")
        .arg("^/meter")
        .assert()
        .success()
        .stdout(contains("/test").and(contains("/fader")).and(contains("/meter").not()));

    cmd()
        .arg(&capture)
        .arg("--allow")
        .arg("^/fader$")
        .assert()
        .success()
        .stdout(contains("/fader").and(contains("/test").not()));
}

#[test]
fn filter_file_is_merged_with_flags() {
    let temp = TempDir::new().expect("tempdir");
    let capture = write_capture(temp.path(), "show.pcapng");
    let filters = temp.path().join("filters.json");
    std::fs::write(&filters, r#"{ "deny": ["^/test$"] }"#).expect("write filters");

    cmd()
        .arg(&capture)
        .arg("--filters")
        .arg(&filters)
        .arg("--deny")
        .arg("meter")
        .assert()
        .success()
        .stdout(
            contains("/fader")
                .and(contains("/test").not())
                .and(contains("/meter").not()),
        );
}

#[test]
fn invalid_pattern_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let capture = write_capture(temp.path(), "show.pcapng");

    cmd()
        .arg(&capture)
        .arg("--allow")
        .arg("(")
        .assert()
        .code(2)
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn bad_input_does_not_stop_the_others() {
    let temp = TempDir::new().expect("tempdir");
    let capture = write_capture(temp.path(), "show.pcapng");
    let missing = temp.path().join("missing.pcapng");
    let garbage = temp.path().join("garbage.pcapng");
    std::fs::write(&garbage, [0xffu8; 13]).expect("write garbage");

    cmd()
        .arg(&missing)
        .arg(&garbage)
        .arg(&capture)
        .assert()
        .code(2)
        .stdout(contains("/test"))
        .stderr(
            contains("input file not found")
                .and(contains("garbage.pcapng"))
                .and(contains("hint:")),
        );
}

#[test]
fn output_dir_writes_one_csv_per_source() {
    let temp = TempDir::new().expect("tempdir");
    let capture = write_capture(temp.path(), "show.pcapng");
    let out = temp.path().join("out");

    cmd()
        .arg(&capture)
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(contains("/test").not())
        .stderr(contains("OK:"));

    let first = std::fs::read_to_string(out.join("show-10.0.0.1.csv")).expect("first source");
    assert_eq!(first.lines().count(), 2);
    assert!(first.starts_with("1970-01-01 00:00:01.000,10.0.0.1,10.0.0.2,/test,42"));
    let second = std::fs::read_to_string(out.join("show-10.0.0.3.csv")).expect("second source");
    assert_eq!(second.trim_end(), "1970-01-01 00:00:01.250,10.0.0.3,10.0.0.2,/fader,0.5");
}

#[test]
fn output_dir_writes_json_report_quietly() {
    let temp = TempDir::new().expect("tempdir");
    let capture = write_capture(temp.path(), "show.pcapng");
    let out = temp.path().join("out");

    cmd()
        .arg(&capture)
        .arg("--format")
        .arg("json")
        .arg("--output-dir")
        .arg(&out)
        .arg("--quiet")
        .assert()
        .success()
        .stderr(contains("OK:").not());

    let text = std::fs::read_to_string(out.join("show.json")).expect("report");
    let json: Value = serde_json::from_str(&text).expect("valid json");
    assert_eq!(json["sources"].as_array().expect("sources").len(), 2);
}

#[test]
fn glob_pattern_expands_to_every_capture() {
    let temp = TempDir::new().expect("tempdir");
    write_capture(temp.path(), "a.pcapng");
    write_capture(temp.path(), "b.pcapng");
    let pattern = temp.path().join("*.pcapng");

    let output = cmd().arg(&pattern).output().expect("run");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert_eq!(stdout.matches("/test").count(), 2);
}

#[test]
fn glob_without_matches_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let pattern = temp.path().join("*.pcapng");

    cmd()
        .arg(&pattern)
        .assert()
        .code(2)
        .stderr(contains("no files match pattern").and(contains("hint:")));
}
