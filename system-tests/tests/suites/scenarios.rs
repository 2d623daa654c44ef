// system-tests/tests/suites/scenarios.rs
// =============================================================================
// Module: Package Test Scenarios
// Description: Native, failing, cross, and unresolvable package test runs.
// Purpose: Confirm the CLI exit contract and step ordering end to end.
// Dependencies: system-tests helpers
// =============================================================================

use helpers::workspace::NATIVE_LINUX;
use helpers::workspace::Workspace;
use helpers::workspace::stderr;
use helpers::workspace::stdout;
use serde_json::Value;

use crate::helpers;

fn test_args<'a>(reference: &'a str, extra: &[&'a str]) -> Vec<&'a str> {
    let mut args = vec!["test", "--reference", reference];
    args.extend_from_slice(extra);
    args
}

#[test]
fn native_run_passes_when_binary_succeeds() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = Workspace::standard("native-pass")?;
    let output = workspace.pkgcheck(&test_args("libhal/4.1.0", NATIVE_LINUX))?;

    if output.status.code() != Some(0) {
        return Err(format!("expected exit 0, got {:?}: {}", output.status, stderr(&output)).into());
    }
    if !stdout(&output).contains("Test binary passed (exit code 0).") {
        return Err(format!("missing pass summary: {}", stdout(&output)).into());
    }
    let invocations = workspace.cmake_invocations();
    if invocations.len() != 2
        || !invocations[0].starts_with("-S ")
        || !invocations[1].starts_with("--build ")
    {
        return Err(format!("expected configure then build, got {invocations:?}").into());
    }
    if !invocations[0].contains("-DCMAKE_TOOLCHAIN_FILE=") {
        return Err(format!("configure must pass the toolchain file: {}", invocations[0]).into());
    }
    let record = workspace.binary_record().ok_or("test binary did not run")?;
    if !record.lines().any(|line| line.starts_with("cwd=") && line.ends_with("build/Release")) {
        return Err(format!("binary must run inside the build dir: {record}").into());
    }
    let lib_dir = workspace.repository_dir().join("libhal/4.1.0/lib");
    if !record.contains(&lib_dir.display().to_string()) {
        return Err(format!("loader path must include {}: {record}", lib_dir.display()).into());
    }
    Ok(())
}

#[test]
fn native_run_propagates_binary_failure() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = Workspace::standard("native-fail")?;
    workspace.install_binary(1)?;
    let output = workspace.pkgcheck(&test_args("libhal/4.1.0", NATIVE_LINUX))?;

    if output.status.code() != Some(1) {
        return Err(format!("expected exit 1, got {:?}", output.status).into());
    }
    if !stderr(&output).contains("failed at stage executed") {
        return Err(format!("missing failure message: {}", stderr(&output)).into());
    }
    if workspace.binary_record().is_none() {
        return Err("test binary should have run".into());
    }
    Ok(())
}

#[test]
fn native_run_mirrors_other_exit_codes() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = Workspace::standard("native-exit-3")?;
    workspace.install_binary(3)?;
    let output = workspace.pkgcheck(&test_args("libhal/4.1.0", NATIVE_LINUX))?;
    if output.status.code() != Some(3) {
        return Err(format!("expected exit 3, got {:?}", output.status).into());
    }
    Ok(())
}

#[test]
fn cross_run_builds_but_skips_execution() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = Workspace::standard("cross-skip")?;
    let output = workspace.pkgcheck(&test_args(
        "libhal/4.1.0",
        &["-s", "os=baremetal", "-s", "arch=cortex-m4f", "-s", "compiler.version=12"],
    ))?;

    if output.status.code() != Some(0) {
        return Err(format!("expected exit 0, got {:?}: {}", output.status, stderr(&output)).into());
    }
    if !stdout(&output).contains("not executed") {
        return Err(format!("missing skip summary: {}", stdout(&output)).into());
    }
    if workspace.cmake_invocations().len() != 2 {
        return Err("cross builds must still configure and build".into());
    }
    if workspace.binary_record().is_some() {
        return Err("test binary must not run on a cross build".into());
    }
    let toolchain = std::fs::read_to_string(
        workspace.build_dir("Release").join("generators/pkgcheck_toolchain.cmake"),
    )?;
    if !toolchain.contains("set(CMAKE_SYSTEM_NAME \"Generic\")") {
        return Err(format!("toolchain must target a generic system: {toolchain}").into());
    }
    Ok(())
}

#[test]
fn unresolvable_reference_stops_before_configure() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = Workspace::standard("unresolvable")?;
    let output = workspace.pkgcheck(&test_args("libmissing/1.0.0", NATIVE_LINUX))?;

    if output.status.code() != Some(1) {
        return Err(format!("expected exit 1, got {:?}", output.status).into());
    }
    if !stderr(&output).contains("dependency resolution failed") {
        return Err(format!("missing resolution error: {}", stderr(&output)).into());
    }
    if !workspace.cmake_invocations().is_empty() {
        return Err("cmake must not run when resolution fails".into());
    }
    if workspace.project_dir().join("build").exists() {
        return Err("no build tree may be created when resolution fails".into());
    }
    Ok(())
}

#[test]
fn reference_can_come_from_environment() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = Workspace::standard("env-reference")?;
    let mut args = vec!["test"];
    args.extend_from_slice(NATIVE_LINUX);
    let output =
        workspace.pkgcheck_with_env(&args, &[("PKGCHECK_TESTED_REFERENCE", "libhal/4.1.0")])?;
    if output.status.code() != Some(0) {
        return Err(format!("expected exit 0, got {:?}: {}", output.status, stderr(&output)).into());
    }
    Ok(())
}

#[test]
fn json_report_lists_every_stage() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = Workspace::standard("json-report")?;
    let mut args = test_args("libhal/4.1.0", NATIVE_LINUX);
    args.extend(["--format", "json"]);
    let output = workspace.pkgcheck(&args)?;
    if output.status.code() != Some(0) {
        return Err(format!("expected exit 0, got {:?}: {}", output.status, stderr(&output)).into());
    }
    let report: Value = serde_json::from_str(&stdout(&output))?;
    let stages: Vec<&str> = report["stages"]
        .as_array()
        .ok_or("stages must be an array")?
        .iter()
        .filter_map(Value::as_str)
        .collect();
    let expected = [
        "start",
        "dependencies_declared",
        "layout_computed",
        "configured",
        "built",
        "executed",
        "done",
    ];
    if stages != expected {
        return Err(format!("unexpected stages {stages:?}").into());
    }
    if report["outcome"]["status"] != "executed" || report["outcome"]["exit_code"] != 0 {
        return Err(format!("unexpected outcome {}", report["outcome"]).into());
    }
    if report["capability"]["kind"] != "native" {
        return Err(format!("unexpected capability {}", report["capability"]).into());
    }
    Ok(())
}
