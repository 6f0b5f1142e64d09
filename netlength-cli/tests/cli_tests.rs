//! CLI integration tests

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

/// Build command for the netlength-cli binary (finds it in target/debug when run via cargo test).
fn netlength_cli() -> Command {
    cargo_bin_cmd!("netlength-cli")
}

/// Path to netlength library test fixtures (relative to workspace).
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("netlength")
        .join("tests")
        .join("fixtures")
}

#[test]
fn test_cli_help() {
    let mut cmd = netlength_cli();

    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("HyperLynx"));
}

#[test]
fn test_cli_version() {
    let mut cmd = netlength_cli();

    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_trace_human() {
    let mut cmd = netlength_cli();

    cmd.arg("trace")
        .arg(fixtures_dir().join("ddr_usb.hyp"))
        .arg("DDR_.*,USB.*");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("DDR_DQ0-U1-U2"))
        .stdout(predicate::str::contains("DDR_DQ1-U1-U2"))
        .stdout(predicate::str::contains("USB_D+-J3-U1"))
        .stdout(predicate::str::contains("300.000"));
}

#[test]
fn test_cli_trace_count_vias() {
    let mut cmd = netlength_cli();

    cmd.arg("trace")
        .arg(fixtures_dir().join("via_transition.hyp"))
        .arg("SIG1")
        .arg("--count-vias");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("SIG1-U1-J1"))
        .stdout(predicate::str::contains("304.000"))
        .stdout(predicate::str::contains("counted"));
}

#[test]
fn test_cli_trace_no_matching_nets() {
    let mut cmd = netlength_cli();

    cmd.arg("trace")
        .arg(fixtures_dir().join("ddr_usb.hyp"))
        .arg("^PCIE_.*");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No connected paths found"));
}

#[test]
fn test_cli_trace_json_output() {
    let mut cmd = netlength_cli();

    cmd.arg("trace")
        .arg(fixtures_dir().join("via_transition.hyp"))
        .arg(".*")
        .arg("--format")
        .arg("json");

    let output = cmd.assert().success().get_output().stdout.clone();
    let value: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON");
    assert_eq!(value["summary"]["total_paths"], 1);
    assert_eq!(value["results"][0]["paths"][0]["display_name"], "SIG1-U1-J1");
}

#[test]
fn test_cli_trace_csv_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("lengths.csv");
    let mut cmd = netlength_cli();

    cmd.arg("trace")
        .arg(fixtures_dir().join("ddr_usb.hyp"))
        .arg("DDR_DQ1")
        .arg("-f")
        .arg("csv")
        .arg("-o")
        .arg(&out);

    cmd.assert().success().stdout(predicate::str::is_empty());

    let content = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines, vec!["Name,Length", "DDR_DQ1-U1-U2,300.0"]);
}

#[test]
fn test_cli_nets_listing() {
    let mut cmd = netlength_cli();

    cmd.arg("nets")
        .arg(fixtures_dir().join("ddr_usb.hyp"))
        .arg("DDR_.*");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("DDR_DQ0"))
        .stdout(predicate::str::contains("DDR_DQ1"))
        .stdout(predicate::str::contains("USB_D+").not());
}

#[test]
fn test_cli_project_csv() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(fixtures_dir().join("ddr_usb.hyp"), dir.path().join("a.hyp")).unwrap();
    std::fs::copy(fixtures_dir().join("via_transition.hyp"), dir.path().join("b.hyp")).unwrap();
    let mut cmd = netlength_cli();

    cmd.arg("project")
        .arg(dir.path())
        .arg("SIG1,USB.*")
        .arg("-f")
        .arg("csv");

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("File,Name,Length"))
        .stdout(predicate::str::contains("USB_D+-J3-U1,50.0"))
        .stdout(predicate::str::contains("SIG1-U1-J1,300.0"));
}

#[test]
fn test_cli_project_csv_single_file_keeps_file_column() {
    let dir = tempfile::tempdir().unwrap();
    let board = dir.path().join("b.hyp");
    std::fs::copy(fixtures_dir().join("via_transition.hyp"), &board).unwrap();
    let mut cmd = netlength_cli();

    cmd.arg("project").arg(dir.path()).arg("SIG1").arg("-f").arg("csv");

    let output = cmd.assert().success().get_output().stdout.clone();
    let content = String::from_utf8(output).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "File,Name,Length");
    assert!(lines[1].ends_with("b.hyp,SIG1-U1-J1,300.0"), "row was {}", lines[1]);
}

#[test]
fn test_cli_trace_csv_empty_keeps_header() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("empty.csv");
    let mut cmd = netlength_cli();

    cmd.arg("trace")
        .arg(fixtures_dir().join("ddr_usb.hyp"))
        .arg("^PCIE_.*")
        .arg("-f")
        .arg("csv")
        .arg("-o")
        .arg(&out);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("No connected paths found"));

    let content = std::fs::read_to_string(&out).unwrap();
    assert_eq!(content.lines().collect::<Vec<_>>(), vec!["Name,Length"]);
}

#[test]
fn test_cli_trace_csv_with_meta() {
    let board = fixtures_dir().join("via_transition.hyp");
    let mut cmd = netlength_cli();

    cmd.arg("trace")
        .arg(&board)
        .arg("SIG1,CLK")
        .arg("--count-vias")
        .arg("-f")
        .arg("csv")
        .arg("--with-meta");

    let output = cmd.assert().success().get_output().stdout.clone();
    let content = String::from_utf8(output).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], format!("# File,{}", board.display()));
    assert_eq!(lines[1], "# Nets,\"SIG1,CLK\"");
    assert!(lines[2].starts_with("# Date,"));
    assert_eq!(lines[3], "# Via length,true");
    assert_eq!(lines[4], "Name,Length");
    assert_eq!(lines[5], "SIG1-U1-J1,304.0");
}

#[test]
fn test_cli_project_stops_on_malformed_board() {
    let mut cmd = netlength_cli();

    cmd.arg("project").arg(fixtures_dir());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_cli_missing_file() {
    let mut cmd = netlength_cli();

    cmd.arg("trace").arg("nonexistent.hyp").arg(".*");

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_cli_invalid_pattern() {
    let mut cmd = netlength_cli();

    cmd.arg("trace")
        .arg(fixtures_dir().join("ddr_usb.hyp"))
        .arg("DDR_(");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid net pattern"));
}

#[test]
fn test_cli_malformed_board() {
    let mut cmd = netlength_cli();

    cmd.arg("trace")
        .arg(fixtures_dir().join("malformed.hyp"))
        .arg(".*");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("line 5"));
}
