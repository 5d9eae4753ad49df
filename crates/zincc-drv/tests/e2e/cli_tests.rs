//! CLI surface tests: help, version, basic compile flags, verbose mode.

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
fn help_lists_usage() {
    let mut cmd = Command::new(zincc_bin());
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Usage").or(predicate::str::contains("zincc")));
}

#[test]
fn version_prints_a_version_string() {
    let mut cmd = Command::new(zincc_bin());
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("zincc").or(predicate::str::contains("0.")));
}

#[test]
fn compiles_to_the_default_output_path() {
    let temp_dir = TempDir::new().expect("failed to create temp directory");
    let output_path = temp_dir.path().join("hello");
    let input_path = fixtures_dir().join("hello_world.zn");

    let mut cmd = Command::new(zincc_bin());
    cmd.arg(&input_path).arg("-o").arg(&output_path);

    cmd.assert().success();
    assert!(output_path.exists(), "output executable should exist");
}

#[test]
fn compiles_to_a_custom_output_directory() {
    let temp_dir = TempDir::new().expect("failed to create temp directory");
    let custom_output = temp_dir.path().join("custom_bin").join("my_program");
    let input_path = fixtures_dir().join("arithmetic.zn");

    std::fs::create_dir_all(custom_output.parent().unwrap())
        .expect("failed to create output directory");

    let mut cmd = Command::new(zincc_bin());
    cmd.arg(&input_path).arg("-o").arg(&custom_output);

    cmd.assert().success();
    assert!(
        custom_output.exists(),
        "output executable should exist at the custom path"
    );
}

#[test]
fn verbose_flag_emits_stage_tracing_on_stderr() {
    let temp_dir = TempDir::new().expect("failed to create temp directory");
    let output_path = temp_dir.path().join("verbose_output");
    let input_path = fixtures_dir().join("hello_world.zn");

    let mut cmd = Command::new(zincc_bin());
    cmd.arg(&input_path)
        .arg("-o")
        .arg(&output_path)
        .arg("--verbose");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("compiling").or(predicate::str::contains("lex")));
}

#[test]
fn emit_c_writes_the_translation_unit_instead_of_linking() {
    let temp_dir = TempDir::new().expect("failed to create temp directory");
    let output_stem = temp_dir.path().join("hello");
    let input_path = fixtures_dir().join("hello_world.zn");

    let mut cmd = Command::new(zincc_bin());
    cmd.arg(&input_path)
        .arg("-o")
        .arg(&output_stem)
        .arg("--emit-c");

    cmd.assert().success();
    assert!(
        output_stem.with_extension("c").exists(),
        "the .c translation unit should be written"
    );
    assert!(
        !output_stem.exists(),
        "no executable should be linked when --emit-c is passed"
    );
}

#[test]
fn disassemble_selects_the_bytecode_backend_and_prints_ir() {
    let input_path = fixtures_dir().join("arithmetic.zn");

    let mut cmd = Command::new(zincc_bin());
    cmd.arg(&input_path).arg("--disassemble").arg("--emit-llvm");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("fn main"));
}

#[test]
fn missing_input_file_fails_with_an_error() {
    let mut cmd = Command::new(zincc_bin());
    cmd.arg("/nonexistent/path/to/file.zn");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("error").or(predicate::str::contains("Error")));
}
