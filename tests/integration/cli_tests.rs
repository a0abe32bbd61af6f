//! Integration tests for the CLI binary.
//!
//! Drives the `hc` binary end to end against a temporary state file.
//!
//! This test is registered as a [[test]] in the healthchain-cli crate
//! so that CARGO_BIN_EXE_hc is available.

use std::path::Path;
use std::process::{Command, Output};

/// Get a Command pointing to the `hc` binary.
fn hc_binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_hc"))
}

/// Run `hc --state STATE ARGS...`.
fn hc(state: &Path, args: &[&str]) -> Output {
    hc_binary()
        .arg("--state")
        .arg(state)
        .args(args)
        .output()
        .expect("failed to execute hc")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn assert_ok(output: &Output) {
    assert!(
        output.status.success(),
        "hc should succeed, stderr: {}",
        stderr(output)
    );
}

#[test]
fn cli_responds_to_help() {
    let output = hc_binary()
        .arg("--help")
        .output()
        .expect("failed to execute hc --help");

    assert_ok(&output);
    let out = stdout(&output);
    assert!(
        out.contains("hc") || out.contains("Healthchain") || out.contains("Usage"),
        "hc --help output should contain usage information, got: {out}"
    );
}

#[test]
fn cli_responds_to_version() {
    let output = hc_binary()
        .arg("--version")
        .output()
        .expect("failed to execute hc --version");

    assert_ok(&output);
    assert!(stdout(&output).contains("0.1"));
}

#[test]
fn cli_exits_with_error_on_unknown_flag() {
    let output = hc_binary()
        .arg("--nonexistent-flag")
        .output()
        .expect("failed to execute hc");

    assert!(
        !output.status.success(),
        "hc with unknown flag should exit with error"
    );
}

#[test]
fn cli_requires_init() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.json");
    let output = hc(&state, &["--as", "@org", "balance"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("hc init"));
}

#[test]
fn cli_full_enrollment_flow() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.json");

    assert_ok(&hc(&state, &["init"]));
    let again = hc(&state, &["init"]);
    assert!(!again.status.success(), "second init must not clobber state");

    assert_ok(&hc(&state, &["fund", "@client", "10"]));
    assert_ok(&hc(&state, &["--as", "@org", "org", "register", "Clinic"]));

    let out = hc(&state, &["--as", "@org", "agent", "register", "@medic", "123"]);
    assert_ok(&out);
    assert!(stdout(&out).contains("AgentRegistered"));

    let out = hc(
        &state,
        &[
            "--as", "@client", "--value", "1", "subject", "register", "asthma", "shellfish",
            "A-", "@org",
        ],
    );
    assert_ok(&out);
    assert!(stdout(&out).contains("SubjectRegistered"));

    let out = hc(&state, &["account", "@org"]);
    assert_ok(&out);
    assert_eq!(stdout(&out).trim(), "1");
    let out = hc(&state, &["account", "@client"]);
    assert_eq!(stdout(&out).trim(), "9");

    let out = hc(&state, &["--as", "@medic", "subject", "show", "@client"]);
    assert_ok(&out);
    let shown = stdout(&out);
    assert!(shown.contains("asthma"));
    assert!(shown.contains("A-"));

    assert_ok(&hc(&state, &["--as", "@org", "subject", "delete", "@client"]));
    let out = hc(&state, &["--as", "@medic", "subject", "show", "@client"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("subject not found"));
}

#[test]
fn cli_deposit_and_balance() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.json");

    assert_ok(&hc(&state, &["init"]));
    assert_ok(&hc(&state, &["fund", "@saver", "50"]));
    assert_ok(&hc(&state, &["--as", "@saver", "--value", "20", "deposit"]));
    assert_ok(&hc(&state, &["--as", "@saver", "--value", "5", "deposit"]));

    let out = hc(&state, &["--as", "@saver", "balance"]);
    assert_ok(&out);
    assert_eq!(stdout(&out).trim(), "25");

    let out = hc(&state, &["--as", "@other", "balance"]);
    assert_eq!(stdout(&out).trim(), "0");

    let out = hc(&state, &["events", "--json"]);
    assert_ok(&out);
    assert_eq!(stdout(&out).lines().count(), 2);
    assert!(stdout(&out).contains("DepositMade"));
}

#[test]
fn cli_rejects_unauthorized_delete() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.json");

    assert_ok(&hc(&state, &["init"]));
    assert_ok(&hc(&state, &["--as", "@org", "org", "register", "Clinic"]));
    assert_ok(&hc(&state, &["--as", "@other", "org", "register", "Other"]));
    assert_ok(&hc(&state, &["--as", "@org", "agent", "register", "@medic", "1"]));

    let out = hc(&state, &["--as", "@other", "agent", "delete", "@medic"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("only the sponsoring organization"));

    let out = hc(&state, &["--as", "@org", "org", "roster"]);
    assert_ok(&out);
    assert!(stdout(&out).contains("Agents (1)"));
}

#[test]
fn cli_org_show_reports_bad_caller() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.json");

    assert_ok(&hc(&state, &["init"]));
    assert_ok(&hc(&state, &["--as", "@org", "org", "register", "Clinic"]));

    let out = hc(&state, &["org", "show", "@org"]);
    assert_ok(&out);
    assert!(stdout(&out).contains("Clinic"));

    let out = hc(&state, &["--as", "garbage", "org", "show", "@org"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("invalid identity 'garbage'"));
}
