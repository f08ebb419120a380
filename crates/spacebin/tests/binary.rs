//! Runs the `spacebin` binary against temporary configuration files.

use std::io::Write;
use std::process::{Command, Output};

use tempfile::NamedTempFile;

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{content}").unwrap();
    file.flush().unwrap();
    file
}

fn run(args: &[&str], vars: &[(&str, &str)]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_spacebin"))
        .args(args)
        .env_clear()
        .envs(vars.iter().copied())
        .output()
        .unwrap()
}

#[test]
fn prints_resolved_toml() {
    let file = config_file("[documents]\nid_length = 10\n");
    let path = file.path().to_str().unwrap();

    let output = run(&["--config", path], &[("SPACEBIN_SERVER_PORT", "8080")]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("port = 8080"));
    assert!(stdout.contains("host = \"0.0.0.0\""));
    assert!(stdout.contains("id_length = 10"));
}

#[test]
fn prints_json() {
    let file = config_file("");
    let path = file.path().to_str().unwrap();

    let output = run(&["-c", path, "--format", "json"], &[]);
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["server"]["port"], 9000);
    assert_eq!(value["server"]["ratelimits"]["duration"], 300_000);
}

#[test]
fn invalid_value_exits_non_zero() {
    let file = config_file("[security]\nuse_cors = \"maybe\"\n");
    let path = file.path().to_str().unwrap();

    let output = run(&["--config", path], &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("security.use_cors"));
}

#[test]
fn dotenv_flag_reads_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".env"),
        "SPACEBIN_SERVER_PORT=7000\nSPACEBIN_SERVER_HOST=10.0.0.5\n",
    )
    .unwrap();
    let file = config_file("");

    let output = Command::new(env!("CARGO_BIN_EXE_spacebin"))
        .args(["--dotenv", "--config", file.path().to_str().unwrap()])
        .current_dir(dir.path())
        .env_clear()
        .env("SPACEBIN_SERVER_PORT", "8080")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("port = 8080"));
    assert!(stdout.contains("host = \"10.0.0.5\""));
}

#[test]
fn dotenv_is_ignored_without_flag() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".env"), "SPACEBIN_SERVER_PORT=7000\n").unwrap();
    let file = config_file("");

    let output = Command::new(env!("CARGO_BIN_EXE_spacebin"))
        .args(["--config", file.path().to_str().unwrap()])
        .current_dir(dir.path())
        .env_clear()
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout).unwrap().contains("port = 9000"));
}

#[test]
fn missing_file_exits_non_zero() {
    let output = run(&["--config", "/nonexistent/spacebin.toml"], &[]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn bad_argument_exits_with_usage_error() {
    let output = run(&["--bogus"], &[]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn version_flag() {
    let output = run(&["--version"], &[]);
    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout).unwrap().starts_with("spacebin "));
}
