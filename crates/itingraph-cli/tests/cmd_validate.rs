//! Integration tests for `itingraph validate`.
#![allow(clippy::expect_used)]

use std::io::Write as _;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

/// Path to the compiled `itingraph` binary.
fn itingraph_bin() -> PathBuf {
    let mut path = std::env::current_exe().expect("current exe");
    // current_exe is …/deps/cmd_validate-<hash>; the binary is one level up.
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("itingraph");
    path
}

/// Path to a shared fixture file.
fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("../../tests/fixtures");
    path.push(name);
    path
}

fn validate(args: &[&str]) -> Output {
    Command::new(itingraph_bin())
        .arg("validate")
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run itingraph validate")
}

fn validate_fixture(name: &str, extra: &[&str]) -> Output {
    let path = fixture(name);
    let mut args = vec![path.to_str().expect("path")];
    args.extend_from_slice(extra);
    validate(&args)
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// Valid itineraries (exit 0)
// ---------------------------------------------------------------------------

#[test]
fn round_trip_exits_0() {
    let out = validate_fixture("round-trip.json", &[]);
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "valid (1 cycle)\n");
    assert!(stderr(&out).contains("0 errors, 0 warnings"), "stderr: {}", stderr(&out));
}

#[test]
fn chain_has_no_cycles() {
    let out = validate_fixture("chain.json", &[]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout(&out), "valid (0 cycles)\n");
}

#[test]
fn self_loop_exits_0() {
    let out = validate_fixture("self-loop.json", &[]);
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
}

#[test]
fn tour_node_warns_but_passes() {
    let out = validate_fixture("tour-unknown.json", &[]);
    assert_eq!(out.status.code(), Some(0));
    let err = stderr(&out);
    assert!(err.contains("[W] NRM-01"), "stderr: {err}");
    assert!(err.contains("[W] NRM-02"), "stderr: {err}");
}

// ---------------------------------------------------------------------------
// Invalid itineraries (exit 1)
// ---------------------------------------------------------------------------

#[test]
fn time_paradox_exits_1_with_cycle() {
    let out = validate_fixture("time-paradox.json", &[]);
    assert_eq!(out.status.code(), Some(1), "stderr: {}", stderr(&out));
    assert_eq!(
        stdout(&out),
        "invalid: SFO (2024-01-05) → JFK (2024-01-05) → JFK (2024-01-01) → SFO (2024-01-01)\n"
    );
    let err = stderr(&out);
    assert!(err.contains("[E] CYC-01"), "stderr: {err}");
    assert!(err.contains("edge \"e2\""), "stderr: {err}");
}

#[test]
fn strict_rejects_inverted_range() {
    let out = validate_fixture("inverted-range.json", &["--strict"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("NRM-05"), "stderr: {}", stderr(&out));
    assert!(out.stdout.is_empty());
}

#[test]
fn clamp_policy_accepts_inverted_range() {
    let out = validate_fixture(
        "inverted-range.json",
        &["--strict", "--date-range-policy", "clamp"],
    );
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
}

#[test]
fn cycle_limit_fails_closed() {
    let out = validate_fixture("round-trip.json", &["--max-cycles", "0"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("CYC-02"), "stderr: {}", stderr(&out));
}

// ---------------------------------------------------------------------------
// Input failures (exit 2)
// ---------------------------------------------------------------------------

#[test]
fn malformed_json_exits_2() {
    let out = validate_fixture("malformed.json", &[]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("line"), "stderr: {}", stderr(&out));
    assert!(out.stdout.is_empty());
}

#[test]
fn missing_file_exits_2() {
    let out = validate(&["/no/such/itinerary.json"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("not found"), "stderr: {}", stderr(&out));
}

#[test]
fn oversized_file_exits_2() {
    let out = validate_fixture("round-trip.json", &["--max-file-size", "16"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("too large"), "stderr: {}", stderr(&out));
}

#[test]
fn bad_date_format_exits_2() {
    let out = validate_fixture("round-trip.json", &["--date-format", "%Q"]);
    assert_eq!(out.status.code(), Some(2), "stderr: {}", stderr(&out));
}

// ---------------------------------------------------------------------------
// Output modes
// ---------------------------------------------------------------------------

#[test]
fn json_format_emits_result_object() {
    let out = validate_fixture("time-paradox.json", &["--format", "json"]);
    assert_eq!(out.status.code(), Some(1));
    let v: serde_json::Value =
        serde_json::from_str(stdout(&out).trim()).expect("stdout is one JSON object");
    assert_eq!(v["valid"], false);
    assert!(v["invalidCycle"].is_array());
    for line in stderr(&out).lines().filter(|l| l.starts_with('{')) {
        serde_json::from_str::<serde_json::Value>(line).expect("NDJSON line");
    }
}

#[test]
fn quiet_suppresses_summary() {
    let out = validate_fixture("round-trip.json", &["--quiet"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(out.stderr.is_empty(), "stderr: {}", stderr(&out));
}

#[test]
fn no_color_output_has_no_escape_codes() {
    let out = validate_fixture("time-paradox.json", &["--no-color"]);
    assert!(!stderr(&out).contains('\x1b'));
}

#[test]
fn reads_document_from_stdin() {
    let content = std::fs::read(fixture("time-paradox.json")).expect("read fixture");
    let mut child = Command::new(itingraph_bin())
        .args(["validate", "-"])
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn itingraph");
    child
        .stdin
        .take()
        .expect("stdin handle")
        .write_all(&content)
        .expect("write stdin");
    let out = child.wait_with_output().expect("wait");
    assert_eq!(out.status.code(), Some(1));
    assert!(stdout(&out).starts_with("invalid: SFO"));
}

#[test]
fn edge_without_dates_uses_fallback_date() {
    let mut f = tempfile::NamedTempFile::new().expect("temp file");
    f.write_all(
        br#"{ "nodes": [{ "id": "a", "airports": ["PDX"] }],
              "edges": [{ "id": "loop", "source": "a", "target": "a" }] }"#,
    )
    .expect("write temp file");
    let out = validate(&[
        f.path().to_str().expect("path"),
        "--fallback-date",
        "2024-05-06",
    ]);
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("NRM-04"), "stderr: {}", stderr(&out));
}

#[test]
fn empty_date_range_warns_and_uses_fallback_date() {
    let out = validate_fixture("empty-date-range.json", &["--fallback-date", "2024-08-01"]);
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("[W] NRM-04"), "stderr: {}", stderr(&out));

    let late = validate_fixture("empty-date-range.json", &["--fallback-date", "2024-08-20"]);
    assert_eq!(late.status.code(), Some(1), "stderr: {}", stderr(&late));
}

#[test]
fn strict_rejects_empty_date_range() {
    let out = validate_fixture("empty-date-range.json", &["--strict"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("NRM-05"), "stderr: {}", stderr(&out));
    assert!(out.stdout.is_empty());
}
