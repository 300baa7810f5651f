mod support;

use std::fs;

use predicates::prelude::*;

use support::{new_command_with_temp_home, settings_dir, write_settings};

#[test]
fn root_help_lists_only_shipped_commands() {
    let (mut command, _temp_home) = new_command_with_temp_home();
    command
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: sublingo"))
        .stdout(predicate::str::contains("--diagnostics"))
        .stdout(predicate::str::contains("doctor"))
        .stdout(predicate::str::contains("translate").not())
        .stdout(predicate::str::contains("settings").not());
}

#[test]
fn doctor_help_runs_without_settings() {
    let (mut command, _temp_home) = new_command_with_temp_home();
    command
        .args(["doctor", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Run settings and server checks"));
}

#[test]
fn doctor_runs_without_settings_file() {
    let (mut command, _temp_home) = new_command_with_temp_home();
    command
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("Check"))
        .stdout(predicate::str::contains("resolves"))
        .stdout(predicate::str::contains("reachable"))
        .stdout(predicate::str::contains("passed"));
}

#[test]
fn doctor_reports_broken_settings() {
    let (mut command, temp_home) = new_command_with_temp_home();
    write_settings(temp_home.path(), "version = 7\nprovider = 'groq'\nuse_ai = true\n");

    command
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("unsupported"))
        .stdout(predicate::str::contains("FAIL"));
}

#[test]
fn unknown_subcommands_are_rejected() {
    for subcommand in ["translate", "settings", "upload"] {
        let (mut command, _temp_home) = new_command_with_temp_home();
        command
            .arg(subcommand)
            .assert()
            .failure()
            .stderr(predicate::str::contains("unrecognized subcommand"));
    }
}

#[test]
fn root_command_is_gated_on_invalid_settings_before_tui() {
    let (mut command, temp_home) = new_command_with_temp_home();
    write_settings(temp_home.path(), "this is not [ valid toml");

    command
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid settings at"))
        .stderr(predicate::str::contains("settings.toml"));
}

#[test]
fn invalid_server_url_fails_before_tui() {
    let (mut command, _temp_home) = new_command_with_temp_home();
    command
        .env("SUBLINGO_SERVER", "not-a-url")
        .arg("doctor")
        .assert()
        .failure()
        .stderr(predicate::str::contains("must start with http"));
}

#[test]
fn doctor_with_diagnostics_creates_a_log_file() {
    let (mut command, temp_home) = new_command_with_temp_home();
    command
        .args(["--diagnostics", "doctor"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Diagnostics enabled:"));

    let diagnostics_dir = settings_dir(temp_home.path()).join("diagnostics");
    let logs: Vec<_> = fs::read_dir(&diagnostics_dir)
        .expect("diagnostics dir")
        .filter_map(Result::ok)
        .collect();
    assert_eq!(logs.len(), 1);
    let name = logs[0].file_name();
    let name = name.to_string_lossy();
    assert!(name.ends_with(".log"));
    assert!(
        name.trim_end_matches(".log").chars().all(|c| c.is_ascii_digit()),
        "log name should be a timestamp: {name}"
    );
}
