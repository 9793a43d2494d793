//! Integration tests for the `relief` binary's command-line surface.
//!
//! These exercise argument parsing and the error paths that don't require a
//! real ONNX model file on disk; full detect+recognize runs are covered by
//! `relief-core`'s in-process tests against a fake backend.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_relief"))
}

#[test]
fn help_lists_both_subcommands() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn process_requires_at_least_one_image() {
    cli().arg("process").assert().failure();
}

#[test]
fn process_reports_missing_image_file() {
    cli()
        .arg("process")
        .arg("/nonexistent/path/to/image.png")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nonexistent").or(predicate::str::contains("model")));
}

#[test]
fn serve_help_shows_bind_flag() {
    cli()
        .arg("serve")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--bind"));
}

#[test]
fn unknown_subcommand_fails() {
    cli().arg("not-a-real-command").assert().failure();
}

#[test]
fn malformed_config_file_reports_parse_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{{ not valid json").unwrap();

    cli()
        .arg("--config")
        .arg(file.path())
        .arg("process")
        .arg("anything.png")
        .assert()
        .failure()
        .stderr(predicate::str::contains("parsing config file"));
}
