// system-tests/tests/helpers/cli.rs
// ============================================================================
// Module: CLI Helpers
// Description: Shared helpers for locating and invoking the pkgcheck CLI.
// Purpose: Provide consistent CLI binary resolution across system-test suites.
// Dependencies: std::process, std::path, system-tests config
// ============================================================================

//! Helpers for invoking the pkgcheck CLI in system-tests.

use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;
use std::sync::OnceLock;

use system_tests::config::SystemTestConfig;

/// Environment variables the harness reads; cleared for every invocation.
const HARNESS_ENV: &[&str] =
    &["PKGCHECK_CONFIG", "PKGCHECK_LANG", "PKGCHECK_LOG", "PKGCHECK_TESTED_REFERENCE"];

/// Locates the pkgcheck CLI binary, building it if necessary.
pub fn cli_binary() -> Result<PathBuf, String> {
    let config = SystemTestConfig::load()?;
    if let Some(path) = config.cli_binary {
        if path.is_file() {
            return Ok(path);
        }
        return Err(format!("configured pkgcheck binary {} does not exist", path.display()));
    }
    if let Some(path) = resolve_cli_from_current_exe() {
        return Ok(path);
    }
    build_cli_binary()
}

/// Runs the CLI in `dir` with arguments and extra environment.
pub fn run_cli(
    binary: &Path,
    dir: &Path,
    args: &[&str],
    env: &[(&str, &str)],
) -> Result<Output, String> {
    let mut command = Command::new(binary);
    command.args(args).current_dir(dir);
    for key in HARNESS_ENV {
        command.env_remove(key);
    }
    for (key, value) in env {
        command.env(key, value);
    }
    command.output().map_err(|err| format!("run pkgcheck failed: {err}"))
}

fn resolve_cli_from_current_exe() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let profile_dir = exe.parent()?.parent()?;
    let candidate = profile_dir.join(format!("pkgcheck{}", exe_suffix()));
    if candidate.exists() { Some(candidate) } else { None }
}

fn target_dir_from_current_exe() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let profile_dir = exe.parent()?.parent()?;
    profile_dir.parent().map(PathBuf::from)
}

fn build_cli_binary() -> Result<PathBuf, String> {
    static BUILD_RESULT: OnceLock<Result<PathBuf, String>> = OnceLock::new();
    let result = BUILD_RESULT.get_or_init(|| {
        let Some(target_dir) = target_dir_from_current_exe() else {
            return Err("unable to resolve target dir from current exe".to_string());
        };
        let output = Command::new("cargo")
            .args(["build", "-p", "pkgcheck-cli", "--bin", "pkgcheck", "--target-dir"])
            .arg(&target_dir)
            .output()
            .map_err(|err| format!("spawn cargo build failed: {err}"))?;
        if !output.status.success() {
            return Err(format!(
                "cargo build pkgcheck-cli failed: {}",
                String::from_utf8_lossy(&output.stderr)
            ));
        }
        let candidate = target_dir.join("debug").join(format!("pkgcheck{}", exe_suffix()));
        if candidate.exists() {
            Ok(candidate)
        } else {
            Err("pkgcheck binary not found after build".to_string())
        }
    });
    result.clone()
}

const fn exe_suffix() -> &'static str {
    if cfg!(windows) { ".exe" } else { "" }
}
