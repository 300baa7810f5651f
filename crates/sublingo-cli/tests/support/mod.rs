use std::fs;
use std::path::Path;

use assert_cmd::Command;
use tempfile::TempDir;

/// Command with an isolated HOME so tests never touch real settings.
pub fn new_command_with_temp_home() -> (Command, TempDir) {
    let temp_home = tempfile::tempdir().expect("temp home");
    let mut command = Command::cargo_bin("sublingo").expect("sublingo binary");
    command.env("HOME", temp_home.path());
    command.env_remove("SUBLINGO_SERVER");
    (command, temp_home)
}

pub fn settings_dir(home: &Path) -> std::path::PathBuf {
    home.join(".config").join("sublingo")
}

pub fn write_settings(home: &Path, contents: &str) {
    let dir = settings_dir(home);
    fs::create_dir_all(&dir).expect("settings dir");
    fs::write(dir.join("settings.toml"), contents).expect("write settings");
}
