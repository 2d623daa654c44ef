// crates/pkgcheck-cli/tests/cli.rs
// ============================================================================
// Module: CLI Binary Tests
// Description: Runs the compiled `pkgcheck` binary for inspection commands.
// Purpose: Verify output, localization, and exit codes end to end.
// Dependencies: pkgcheck-cli binary, serde_json, tempfile
// ============================================================================

//! ## Overview
//! Drives `layout`, `can-run`, and `config validate` against temporary config
//! files. Full test runs are covered by the system-tests crate.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::path::Path;
use std::process::Command;
use std::process::Output;

use serde_json::Value;

fn pkgcheck(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pkgcheck"))
        .args(args)
        .current_dir(dir)
        .env_remove("PKGCHECK_CONFIG")
        .env_remove("PKGCHECK_LANG")
        .env_remove("PKGCHECK_LOG")
        .env_remove("PKGCHECK_TESTED_REFERENCE")
        .output()
        .expect("run pkgcheck")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn write_config(dir: &Path, content: &str) {
    std::fs::write(dir.join("pkgcheck.toml"), content).expect("write config");
}

#[test]
fn version_flag_prints_package_version() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = pkgcheck(dir.path(), &["--version"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), format!("pkgcheck {}", env!("CARGO_PKG_VERSION")));
}

#[test]
fn config_validate_accepts_valid_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_config(dir.path(), "[test]\nbinary = \"unit_test\"\n");
    let output = pkgcheck(dir.path(), &["config", "validate"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "Config is valid.");
}

#[test]
fn config_validate_rejects_unknown_fields() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_config(dir.path(), "[test]\nbinaries = \"unit_test\"\n");
    let output = pkgcheck(dir.path(), &["config", "validate"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to load config"));
}

#[test]
fn catalan_output_carries_disclaimer() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = pkgcheck(dir.path(), &["--lang", "ca", "config", "validate"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "La configuració és vàlida.");
    assert!(stderr(&output).contains("traduïda automàticament"));
}

#[test]
fn layout_json_reports_single_config_tree() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = pkgcheck(dir.path(), &["layout", "-s", "build_type=Debug", "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: Value = serde_json::from_str(&stdout(&output)).expect("json");
    let build_dir = value["layout"]["build_dir"].as_str().expect("build dir");
    assert!(Path::new(build_dir).ends_with("build/Debug"));
    let binary = value["binary"].as_str().expect("binary");
    assert!(Path::new(binary).starts_with(build_dir));
    assert_eq!(value["settings"]["build_type"], "Debug");
}

#[test]
fn layout_rejects_unknown_setting() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = pkgcheck(dir.path(), &["layout", "-s", "flavor=spicy"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Invalid target setting"));
}

#[test]
fn can_run_reports_baremetal_as_unavailable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = pkgcheck(dir.path(), &["can-run", "-s", "os=baremetal", "-s", "arch=cortex-m4f"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("Capability: unavailable"));
    assert!(text.contains("baremetal"));
}

#[test]
fn can_run_json_reports_native_host() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = pkgcheck(dir.path(), &["can-run", "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: Value = serde_json::from_str(&stdout(&output)).expect("json");
    assert_eq!(value["capability"]["kind"], "native");
    assert_eq!(value["can_execute"], true);
}

#[test]
fn can_run_uses_configured_emulator() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_config(
        dir.path(),
        "[execution]\nemulators = { \"armv7hf\" = [\"qemu-arm\", \"-L\", \"/usr/arm-linux-gnueabihf\"] }\n",
    );
    let output = pkgcheck(
        dir.path(),
        &["can-run", "--host-setting", "os=Linux", "--host-setting", "arch=x86_64", "-s", "os=Linux", "-s", "arch=armv7hf"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("Capability: emulated"));
    assert!(text.contains("Emulator: qemu-arm -L /usr/arm-linux-gnueabihf"));
}

#[test]
fn test_without_reference_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = pkgcheck(dir.path(), &["test"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("PKGCHECK_TESTED_REFERENCE"));
}
