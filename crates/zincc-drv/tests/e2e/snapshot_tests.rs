//! Self-healing snapshot tests: capture CLI stdout/stderr and compare
//! against a saved baseline, updating it locally but failing hard in CI.

use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("e2e")
        .join("fixtures")
}

fn snapshots_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("e2e")
        .join("snapshots")
}

fn zincc_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_zincc"))
}

fn save_snapshot(name: &str, content: &str) {
    let snapshot_path = snapshots_dir().join(format!("{name}.snap"));
    fs::create_dir_all(snapshots_dir()).expect("failed to create snapshots directory");
    fs::write(snapshot_path, content).expect("failed to write snapshot");
}

fn assert_snapshot(name: &str, actual: &str) {
    let snapshot_path = snapshots_dir().join(format!("{name}.snap"));

    if let Ok(expected) = fs::read_to_string(&snapshot_path) {
        if actual.trim() != expected.trim() {
            if std::env::var("CI").is_ok() {
                panic!("snapshot mismatch for '{name}'.\nexpected:\n{expected}\n\nactual:\n{actual}");
            }
            eprintln!("snapshot '{name}' changed, updating");
            save_snapshot(name, actual);
        }
    } else {
        eprintln!("creating new snapshot '{name}'");
        save_snapshot(name, actual);
    }
}

#[test]
fn hello_world_disassembly_snapshot() {
    let input_path = fixtures_dir().join("hello_world.zn");

    let mut cmd = Command::new(zincc_bin());
    cmd.arg(&input_path).arg("--disassemble").arg("--emit-llvm");

    let output = cmd.output().expect("failed to execute command");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_snapshot("hello_world_disassembly", &stdout);
    assert!(output.status.success(), "compilation should succeed");
}

#[test]
fn arithmetic_disassembly_snapshot() {
    let input_path = fixtures_dir().join("arithmetic.zn");

    let mut cmd = Command::new(zincc_bin());
    cmd.arg(&input_path).arg("--disassemble").arg("--emit-llvm");

    let output = cmd.output().expect("failed to execute command");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_snapshot("arithmetic_disassembly", &stdout);
    assert!(output.status.success(), "compilation should succeed");
}

#[test]
fn invalid_syntax_error_snapshot() {
    let temp_dir = tempfile::TempDir::new().expect("failed to create temp directory");
    let output_path = temp_dir.path().join("invalid_syntax");
    let input_path = fixtures_dir().join("invalid_syntax.zn");

    let mut cmd = Command::new(zincc_bin());
    cmd.arg(&input_path).arg("-o").arg(&output_path);

    let output = cmd.output().expect("failed to execute command");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_snapshot("invalid_syntax_error", &stderr);
    assert!(!output.status.success(), "compilation should fail");
}

#[test]
fn sema_error_snapshot() {
    let temp_dir = tempfile::TempDir::new().expect("failed to create temp directory");
    let output_path = temp_dir.path().join("sema_error");
    let input_path = fixtures_dir().join("sema_error.zn");

    let mut cmd = Command::new(zincc_bin());
    cmd.arg(&input_path).arg("-o").arg(&output_path);

    let output = cmd.output().expect("failed to execute command");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_snapshot("sema_error", &stderr);
    assert!(!output.status.success(), "compilation should fail");
}

#[test]
fn cli_help_snapshot() {
    let mut cmd = Command::new(zincc_bin());
    cmd.arg("--help");

    let output = cmd.output().expect("failed to execute command");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_snapshot("cli_help", &stdout);
    assert!(output.status.success(), "help command should succeed");
}
