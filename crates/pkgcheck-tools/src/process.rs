// crates/pkgcheck-tools/src/process.rs
// ============================================================================
// Module: Process Execution
// Description: Blocking execution of external tools and the test binary.
// Purpose: Map child process outcomes onto tool errors and run statuses.
// Dependencies: pkgcheck-core, tracing
// ============================================================================

//! ## Overview
//! Children inherit the harness stdio so tool and test output stream straight
//! to the user. Environment overlays are applied to the child [`Command`]
//! only; the harness environment is never modified.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::process::Command;

use pkgcheck_core::BaseEnv;
use pkgcheck_core::BinaryRunner;
use pkgcheck_core::EnvOverlay;
use pkgcheck_core::RunInvocation;
use pkgcheck_core::RunStatus;
use pkgcheck_core::ToolError;

// ============================================================================
// SECTION: Tools
// ============================================================================

/// Runs an external tool to completion with an environment overlay.
///
/// # Errors
///
/// Returns [`ToolError::Spawn`] when the tool cannot start and
/// [`ToolError::Failed`] when it exits unsuccessfully.
pub fn run_tool(
    mut command: Command,
    program: &str,
    overlay: &EnvOverlay,
    base_env: &BaseEnv,
) -> Result<(), ToolError> {
    overlay.apply(&mut command, base_env);
    tracing::info!(program, args = ?command.get_args().collect::<Vec<_>>(), "running tool");
    let status = command.status().map_err(|err| ToolError::Spawn {
        program: program.to_string(),
        message: err.to_string(),
    })?;
    let status = RunStatus::from(status);
    if !status.success() {
        return Err(ToolError::Failed {
            program: program.to_string(),
            status,
        });
    }
    Ok(())
}

// ============================================================================
// SECTION: Binary Runner
// ============================================================================

/// Runs the test binary as a child process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Builds the command for an invocation, prefixing the emulator when set.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Spawn`] when the emulator command line is empty.
    pub fn command(invocation: &RunInvocation<'_>) -> Result<Command, ToolError> {
        let mut command = match invocation.emulator {
            Some(emulator) => {
                let (program, args) = emulator.split_first().ok_or_else(|| ToolError::Spawn {
                    program: invocation.program.display().to_string(),
                    message: "emulator command is empty".to_string(),
                })?;
                let mut command = Command::new(program);
                command.args(args);
                command.arg(invocation.program);
                command
            }
            None => Command::new(invocation.program),
        };
        command.current_dir(invocation.working_dir);
        invocation.env.apply(&mut command, invocation.base_env);
        Ok(command)
    }
}

impl BinaryRunner for ProcessRunner {
    fn run(&self, invocation: &RunInvocation<'_>) -> Result<RunStatus, ToolError> {
        let mut command = Self::command(invocation)?;
        let program = invocation.program.display().to_string();
        tracing::info!(
            program = %program,
            working_dir = %invocation.working_dir.display(),
            emulated = invocation.emulator.is_some(),
            "running test binary"
        );
        let status = command.status().map_err(|err| ToolError::Spawn {
            program,
            message: err.to_string(),
        })?;
        let status = RunStatus::from(status);
        tracing::info!(exit_code = status.exit_code(), "test binary finished");
        Ok(status)
    }
}
