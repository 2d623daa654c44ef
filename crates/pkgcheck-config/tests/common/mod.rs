// crates/pkgcheck-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for pkgcheck config tests.
// Purpose: Reduce duplication across integration tests for pkgcheck-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::path::Path;
use std::path::PathBuf;

use pkgcheck_config::ConfigError;
use pkgcheck_config::PkgcheckConfig;

/// Parses a TOML string into a validated `PkgcheckConfig`.
pub fn validated(toml_str: &str) -> Result<PkgcheckConfig, ConfigError> {
    let mut config = PkgcheckConfig::from_toml_str(toml_str)?;
    config.validate()?;
    Ok(config)
}

/// Writes `content` to `pkgcheck.toml` inside `dir` and returns the path.
pub fn write_config(dir: &Path, content: &[u8]) -> Result<PathBuf, String> {
    let path = dir.join("pkgcheck.toml");
    std::fs::write(&path, content).map_err(|err| err.to_string())?;
    Ok(path)
}

/// Asserts that `result` failed with a message containing `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> Result<(), String> {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}
