// system-tests/tests/suites/failures.rs
// =============================================================================
// Module: Package Test Failures
// Description: Tool, artifact, and plan failures through the CLI.
// Purpose: Confirm each failing step stops the run and sets the exit code.
// Dependencies: system-tests helpers
// =============================================================================

use helpers::workspace::FakeCmake;
use helpers::workspace::NATIVE_LINUX;
use helpers::workspace::Workspace;
use helpers::workspace::stderr;

use crate::helpers;

fn run_native(workspace: &Workspace) -> Result<std::process::Output, String> {
    let mut args = vec!["test", "--reference", "libhal/4.1.0"];
    args.extend_from_slice(NATIVE_LINUX);
    workspace.pkgcheck(&args)
}

#[test]
fn configure_failure_stops_before_build() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = Workspace::standard("configure-fails")?;
    workspace.install_cmake(FakeCmake {
        configure_exit: 2,
        ..FakeCmake::default()
    })?;
    let output = run_native(&workspace)?;

    if output.status.code() != Some(2) {
        return Err(format!("expected exit 2, got {:?}", output.status).into());
    }
    if !stderr(&output).contains("failed at stage configured") {
        return Err(format!("missing configure failure: {}", stderr(&output)).into());
    }
    let invocations = workspace.cmake_invocations();
    if invocations.len() != 1 || invocations[0].starts_with("--build") {
        return Err(format!("build must not run after configure fails: {invocations:?}").into());
    }
    Ok(())
}

#[test]
fn build_failure_stops_before_execution() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = Workspace::standard("build-fails")?;
    workspace.install_cmake(FakeCmake {
        build_exit: 4,
        ..FakeCmake::default()
    })?;
    let output = run_native(&workspace)?;

    if output.status.code() != Some(4) {
        return Err(format!("expected exit 4, got {:?}", output.status).into());
    }
    if !stderr(&output).contains("failed at stage built") {
        return Err(format!("missing build failure: {}", stderr(&output)).into());
    }
    if workspace.binary_record().is_some() {
        return Err("test binary must not run after build fails".into());
    }
    Ok(())
}

#[test]
fn missing_binary_is_fatal() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = Workspace::standard("no-binary")?;
    workspace.install_cmake(FakeCmake {
        produce_binary: false,
        ..FakeCmake::default()
    })?;
    let output = run_native(&workspace)?;

    if output.status.code() != Some(1) {
        return Err(format!("expected exit 1, got {:?}", output.status).into());
    }
    if !stderr(&output).contains("test binary not found") {
        return Err(format!("missing artifact error: {}", stderr(&output)).into());
    }
    Ok(())
}

#[test]
fn tested_package_in_test_requires_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = Workspace::standard("requires-clash")?;
    workspace.write_config("[test]\nrequires = [\"boost-ext-ut/1.1.9\", \"libhal/4.0.0\"]\n")?;
    let output = run_native(&workspace)?;

    if output.status.code() != Some(1) {
        return Err(format!("expected exit 1, got {:?}", output.status).into());
    }
    if !stderr(&output).contains("names the package under test") {
        return Err(format!("missing plan error: {}", stderr(&output)).into());
    }
    if !workspace.cmake_invocations().is_empty() {
        return Err("cmake must not run for an invalid plan".into());
    }
    Ok(())
}

#[test]
fn missing_cmake_program_fails_to_start() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = Workspace::standard("no-cmake")?;
    std::fs::remove_file(workspace.cmake_path())?;
    let output = run_native(&workspace)?;

    if output.status.code() != Some(1) {
        return Err(format!("expected exit 1, got {:?}", output.status).into());
    }
    if !stderr(&output).contains("failed to start") {
        return Err(format!("missing spawn error: {}", stderr(&output)).into());
    }
    if workspace.binary_record().is_some() {
        return Err("test binary must not run without a build".into());
    }
    Ok(())
}
