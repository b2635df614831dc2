// tests/cli_test.rs
use std::fs;
use std::process::Command;

fn stamper() -> Command {
    Command::new(env!("CARGO_BIN_EXE_version-stamper"))
}

#[test]
fn test_version_stamper_help() {
    let output = stamper()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("version-stamper"));
    assert!(stdout.contains("--dry-run"));
    assert!(stdout.contains("--set-version"));
}

#[test]
fn test_version_stamper_version() {
    let output = stamper()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(
        stdout.trim(),
        format!("version-stamper {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn test_malformed_set_version_exits_with_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(
        temp_dir.path().join("index.html"),
        "<!-- Version: 1.9.9 -->\n",
    )
    .unwrap();

    let output = stamper()
        .args(["--yes", "--set-version", "abc", "--dir"])
        .arg(temp_dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("invalid version format 'abc'"));
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("index.html")).unwrap(),
        "<!-- Version: 1.9.9 -->\n"
    );
}

#[test]
fn test_dry_run_without_repository_leaves_files_alone() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(
        temp_dir.path().join("manifest.json"),
        "{\"version\": \"3.3\"}\n",
    )
    .unwrap();

    let output = stamper()
        .args(["--yes", "--dry-run", "--dir"])
        .arg(temp_dir.path())
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("3.3.1"));
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("manifest.json")).unwrap(),
        "{\"version\": \"3.3\"}\n"
    );
}
