//! CLI contract tests: subcommands, text output, JSON envelope, exit codes.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

/// Get the CLI command
#[allow(deprecated)]
fn cli() -> Command {
    let mut cmd = Command::cargo_bin("cas_cli").unwrap();
    // Keep a stray fourier.toml in the working directory out of the tests
    cmd.args(["--config", "/nonexistent/fourier.toml"]);
    cmd
}

fn json_of(args: &[&str]) -> (Value, bool) {
    let output = cli().args(args).output().expect("Failed to run CLI");
    let stdout = String::from_utf8(output.stdout).unwrap();
    let json: Value = serde_json::from_str(&stdout).expect("Invalid JSON output");
    (json, output.status.success())
}

#[test]
fn test_help_lists_subcommands() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fourier"))
        .stdout(predicate::str::contains("simplify"))
        .stdout(predicate::str::contains("integrate"));
}

#[test]
fn test_fourier_truncated_text() {
    cli()
        .args(["fourier", "x", "--from", "-1", "--to", "1", "--terms", "1"])
        .assert()
        .success()
        .stdout("2 * sin(pi * x) / pi\n");
}

#[test]
fn test_fourier_symbolic_text() {
    cli()
        .args(["fourier", "1", "--from", "0", "--to", "2*pi", "--symbolic"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn test_fourier_coefficients_are_listed() {
    cli()
        .args([
            "fourier",
            "x^2",
            "--from",
            "-1",
            "--to",
            "1",
            "--terms",
            "1",
            "--coefficients",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("A_1 = -4 / pi^2"))
        .stdout(predicate::str::contains("B_1 = 0"));
}

#[test]
fn test_fourier_reversed_interval_fails() {
    cli()
        .args(["fourier", "x", "--from", "1", "--to", "0", "--terms", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "interval_sup cannot be less than interval_inf",
        ));
}

#[test]
fn test_fourier_json_envelope() {
    let (json, ok) = json_of(&[
        "fourier", "x", "--from", "-1", "--to", "1", "--terms", "1", "--json",
    ]);
    assert!(ok);
    assert_eq!(json["ok"], true);
    assert_eq!(json["command"], "fourier");
    assert_eq!(json["input"], "x");
    assert_eq!(json["result"], "2 * sin(pi * x) / pi");
}

#[test]
fn test_json_error_envelope() {
    let (json, ok) = json_of(&["fourier", "tan(x)", "--from", "0", "--to", "1", "--json"]);
    assert!(!ok);
    assert_eq!(json["ok"], false);
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("Cannot integrate"));
    assert!(json.get("result").is_none());
}

#[test]
fn test_terms_conflicts_with_symbolic() {
    cli()
        .args([
            "fourier", "x", "--from", "0", "--to", "1", "--terms", "2", "--symbolic",
        ])
        .assert()
        .failure();
}

#[test]
fn test_simplify_with_steps() {
    cli()
        .args(["simplify", "cos(pi) + ln(e)", "--steps"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[Evaluate Trigonometric Functions]"))
        .stdout(predicate::str::ends_with("0\n"));
}

#[test]
fn test_integrate_definite() {
    cli()
        .args(["integrate", "x*sin(x)", "--from", "0", "--to", "pi"])
        .assert()
        .success()
        .stdout("pi\n");
}

#[test]
fn test_integrate_requires_both_bounds() {
    cli()
        .args(["integrate", "x", "--from", "0"])
        .assert()
        .failure();
}

#[test]
fn test_parse_error_is_reported() {
    cli()
        .args(["simplify", "2 +"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse '2 +'"));
}
