//! Command-line behaviour that needs no PDF engine: usage errors and version.

#![cfg(feature = "cli")]

use std::process::Command;
use tempfile::TempDir;

fn markpdf() -> Command {
    Command::new(env!("CARGO_BIN_EXE_markpdf"))
}

#[test]
fn output_with_several_files_outside_merge_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.pdf");

    let result = markpdf()
        .current_dir(dir.path())
        .args(["a.md", "b.md", "-o"])
        .arg(&out)
        .output()
        .unwrap();

    assert_eq!(result.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("--merge"), "got: {stderr}");
    assert!(!out.exists());
}

#[test]
fn missing_input_is_a_usage_error() {
    let dir = TempDir::new().unwrap();

    let result = markpdf()
        .current_dir(dir.path())
        .args(["--no-progress", "nowhere.md"])
        .output()
        .unwrap();

    assert_eq!(result.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("File not found: 'nowhere.md'"), "got: {stderr}");
    assert!(!dir.path().join("nowhere.pdf").exists());
}

#[test]
fn non_markdown_input_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "# hi\n").unwrap();

    let result = markpdf()
        .current_dir(dir.path())
        .arg("notes.txt")
        .output()
        .unwrap();

    assert_eq!(result.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&result.stderr).contains("Expected a .md file"));
}

#[test]
fn short_v_prints_version() {
    let result = markpdf().arg("-v").output().unwrap();

    assert!(result.status.success());
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")), "got: {stdout}");
}

#[test]
fn missing_engine_exits_with_failure() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.md"), "# A\n").unwrap();

    let result = markpdf()
        .current_dir(dir.path())
        .args(["--no-progress", "--engine-path", "/definitely/not/an-engine", "a.md"])
        .env_remove("MARKPDF_ENGINE")
        .output()
        .unwrap();

    assert_eq!(result.status.code(), Some(1));
    assert!(!dir.path().join("a.pdf").exists());
}

#[test]
fn unreadable_source_found_during_conversion_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    // Passes the existence and extension checks, fails once it is read.
    std::fs::create_dir(dir.path().join("folder.md")).unwrap();

    let result = markpdf()
        .current_dir(dir.path())
        .args(["--no-progress", "folder.md"])
        .output()
        .unwrap();

    assert_eq!(result.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("Failed to read 'folder.md'"), "got: {stderr}");
    assert!(!dir.path().join("folder.pdf").exists());
}
