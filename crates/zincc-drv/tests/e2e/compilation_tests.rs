//! Full-pipeline compilation tests against real `.zn` fixtures: successful
//! compiles through both backends, parse/resolve error reporting, and
//! `--run`.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("e2e")
        .join("fixtures")
}

fn zincc_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_zincc"))
}

#[test]
fn hello_world_compiles_and_links() {
    let temp_dir = TempDir::new().expect("failed to create temp directory");
    let output_path = temp_dir.path().join("hello_world");
    let input_path = fixtures_dir().join("hello_world.zn");

    let mut cmd = Command::new(zincc_bin());
    cmd.arg(&input_path).arg("-o").arg(&output_path);

    cmd.assert().success();
    assert!(output_path.exists(), "output executable should exist");
}

#[test]
fn arithmetic_compiles() {
    let temp_dir = TempDir::new().expect("failed to create temp directory");
    let output_path = temp_dir.path().join("arithmetic");
    let input_path = fixtures_dir().join("arithmetic.zn");

    let mut cmd = Command::new(zincc_bin());
    cmd.arg(&input_path).arg("-o").arg(&output_path);

    cmd.assert().success();
    assert!(output_path.exists(), "output executable should exist");
}

#[test]
fn control_flow_compiles() {
    let temp_dir = TempDir::new().expect("failed to create temp directory");
    let output_path = temp_dir.path().join("control_flow");
    let input_path = fixtures_dir().join("control_flow.zn");

    let mut cmd = Command::new(zincc_bin());
    cmd.arg(&input_path).arg("-o").arg(&output_path);

    cmd.assert().success();
    assert!(output_path.exists(), "output executable should exist");
}

#[test]
fn functions_compile_and_link() {
    let temp_dir = TempDir::new().expect("failed to create temp directory");
    let output_path = temp_dir.path().join("functions");
    let input_path = fixtures_dir().join("functions.zn");

    let mut cmd = Command::new(zincc_bin());
    cmd.arg(&input_path).arg("-o").arg(&output_path);

    cmd.assert().success();
    assert!(output_path.exists(), "output executable should exist");
}

#[test]
fn unterminated_block_is_a_parse_error() {
    let temp_dir = TempDir::new().expect("failed to create temp directory");
    let output_path = temp_dir.path().join("invalid_syntax");
    let input_path = fixtures_dir().join("invalid_syntax.zn");

    let mut cmd = Command::new(zincc_bin());
    cmd.arg(&input_path).arg("-o").arg(&output_path);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("error"));
    assert!(
        !output_path.exists(),
        "no executable should exist for invalid code"
    );
}

#[test]
fn duplicate_function_is_a_resolve_error() {
    let temp_dir = TempDir::new().expect("failed to create temp directory");
    let output_path = temp_dir.path().join("sema_error");
    let input_path = fixtures_dir().join("sema_error.zn");

    let mut cmd = Command::new(zincc_bin());
    cmd.arg(&input_path).arg("-o").arg(&output_path);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("error"));
    assert!(
        !output_path.exists(),
        "no executable should exist for a semantic error"
    );
}

#[test]
fn file_not_found_is_reported() {
    let mut cmd = Command::new(zincc_bin());
    cmd.arg("/nonexistent/path/to/file.zn");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("error").or(predicate::str::contains("No such file")));
}

#[test]
fn emit_object_writes_an_object_file_without_linking() {
    let temp_dir = TempDir::new().expect("failed to create temp directory");
    let output_stem = temp_dir.path().join("hello");
    let input_path = fixtures_dir().join("hello_world.zn");

    let mut cmd = Command::new(zincc_bin());
    cmd.arg(&input_path)
        .arg("-o")
        .arg(&output_stem)
        .arg("--emit-object");

    cmd.assert().success();
    assert!(
        output_stem.with_extension("o").exists(),
        "the .o object file should be written"
    );
    assert!(!output_stem.exists(), "nothing should be linked");
}

#[test]
fn run_executes_the_freshly_built_binary_and_forwards_its_exit_code() {
    let temp_dir = TempDir::new().expect("failed to create temp directory");
    let output_path = temp_dir.path().join("factorial");
    let input_path = fixtures_dir().join("factorial.zn");

    let mut cmd = Command::new(zincc_bin());
    cmd.arg(&input_path)
        .arg("-o")
        .arg(&output_path)
        .arg("--run");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Factorial").and(predicate::str::contains("120")));
}
