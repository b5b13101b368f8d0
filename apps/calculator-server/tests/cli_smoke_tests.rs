#![allow(clippy::unwrap_used, clippy::expect_used)]

//! CLI smoke tests for the calculator-server binary
//!
//! These tests verify the command line surface: help and version output,
//! configuration validation, and the effective-config dump.

use std::process::{Command, Stdio};

use tempfile::TempDir;

/// Helper to run the calculator-server binary with given arguments
fn run_calculator_server(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_calculator-server"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("CALC__SERVER__LISTEN_ADDR")
        .env_remove("CALC__SERVER__STATUS_ADDR")
        .env_remove("CALC__LOGGING__LEVEL")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute calculator-server")
}

fn write_config(dir: &TempDir, content: &str) -> String {
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, content).expect("Failed to write config file");
    path.to_str().unwrap().to_owned()
}

#[test]
fn test_cli_help_command() {
    let output = run_calculator_server(&["--help"]);

    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Usage:"),
        "Should contain usage information"
    );
    assert!(stdout.contains("run"), "Should contain 'run' subcommand");
    assert!(stdout.contains("check"), "Should contain 'check' subcommand");
    assert!(stdout.contains("--config"), "Should mention config option");
    assert!(stdout.contains("--listen-addr"), "Should mention listen address option");
}

#[test]
fn test_cli_version_command() {
    let output = run_calculator_server(&["--version"]);

    assert!(output.status.success(), "Version command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("calculator-server"), "Should contain binary name");
    assert!(
        stdout.chars().any(|c| c.is_ascii_digit()),
        "Should contain version numbers"
    );
}

#[test]
fn test_cli_invalid_command() {
    let output = run_calculator_server(&["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error") || stderr.contains("unrecognized"),
        "Should contain error message about invalid command: {stderr}"
    );
}

#[test]
fn test_cli_config_validation_missing_file() {
    let output = run_calculator_server(&["--config", "/nonexistent/config.yaml", "check"]);

    assert!(
        !output.status.success(),
        "Should fail when config file doesn't exist"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("does not exist"),
        "Should indicate config file not found: {stderr}"
    );
}

#[test]
fn test_cli_config_validation_invalid_yaml() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(&temp_dir, "invalid: yaml: content: [unclosed");

    let output = run_calculator_server(&["--config", &config_path, "check"]);

    assert!(!output.status.success(), "Should fail with invalid YAML");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("invalid configuration"),
        "Should report the configuration problem: {stderr}"
    );
}

#[test]
fn test_cli_config_validation_valid_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        &temp_dir,
        r#"
server:
  listen_addr: "127.0.0.1:18080"
  status_addr: "127.0.0.1:15000"
  shutdown_timeout: "2s"
logging:
  level: warn
  format: text
"#,
    );

    let output = run_calculator_server(&["--config", &config_path, "check"]);

    if !output.status.success() {
        eprintln!("STDERR: {}", String::from_utf8_lossy(&output.stderr));
    }
    assert!(output.status.success(), "Should succeed with valid config");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Configuration is valid"), "{stdout}");
    assert!(stdout.contains("127.0.0.1:18080"), "{stdout}");
}

#[test]
fn test_cli_invalid_listen_address() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(&temp_dir, "server:\n  listen_addr: \"not-an-address\"\n");

    let output = run_calculator_server(&["--config", &config_path, "check"]);

    assert!(
        !output.status.success(),
        "Should fail with invalid listen address"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("address") || stderr.contains("invalid"),
        "Should mention address parsing issue: {stderr}"
    );
}

#[test]
fn test_cli_missing_tls_material_fails_check() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        &temp_dir,
        "tls:\n  cert_path: /nonexistent/server.pem\n  key_path: /nonexistent/server.key\n",
    );

    let output = run_calculator_server(&["--config", &config_path, "check"]);

    assert!(!output.status.success(), "Should fail without TLS files");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("TLS certificate"), "{stderr}");
}

#[test]
fn test_cli_print_config_is_yaml() {
    let output = run_calculator_server(&["--print-config", "--listen-addr", "127.0.0.1:9999"]);

    assert!(output.status.success(), "print-config should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value =
        serde_saphyr::from_str(&stdout).expect("Output should be valid YAML");
    assert_eq!(parsed["server"]["listen_addr"], "127.0.0.1:9999");
    assert_eq!(parsed["server"]["shutdown_timeout"], "5s");
    assert_eq!(parsed["logging"]["level"], "info");
}

#[test]
fn test_cli_env_override_reaches_config() {
    let output = Command::new(env!("CARGO_BIN_EXE_calculator-server"))
        .arg("--print-config")
        .env("CALC__SERVER__STATUS_ADDR", "127.0.0.1:5555")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute calculator-server");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("127.0.0.1:5555"), "{stdout}");
}

#[test]
fn test_cli_verbose_flag_raises_level() {
    let output = run_calculator_server(&["-vv", "--print-config"]);

    assert!(output.status.success(), "Verbose print-config should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("debug"), "{stdout}");
}

#[test]
fn test_shipped_sample_config_is_valid() {
    let sample = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/calculator.yaml");
    let output = run_calculator_server(&["--config", sample, "check"]);

    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0.0.0.0:8080"), "{stdout}");
}
