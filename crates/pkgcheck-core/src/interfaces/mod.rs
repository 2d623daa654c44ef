// crates/pkgcheck-core/src/interfaces/mod.rs
// ============================================================================
// Module: pkgcheck Interfaces
// Description: Contracts for dependency resolution, building, and running.
// Purpose: Keep the orchestrator independent of concrete tools.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The orchestrator drives three external collaborators through these
//! traits: a [`DependencyResolver`], a [`BuildTool`], and a
//! [`BinaryRunner`]. Every call blocks until the collaborator finishes and
//! any error is fatal to the run. A [`RunObserver`] receives stage
//! transitions for logging.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::core::BaseEnv;
use crate::core::BuildLayout;
use crate::core::BuildSettings;
use crate::core::DependencyDeclaration;
use crate::core::EnvOverlay;
use crate::core::ExecutionCapability;
use crate::core::ExecutionContext;
use crate::core::PackageRef;
use crate::core::ResolvedGraph;
use crate::runtime::Stage;

// ============================================================================
// SECTION: Dependency Resolver
// ============================================================================

/// Dependency resolution errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No package matches the reference.
    #[error("package {reference} not found")]
    NotFound {
        /// Missing reference.
        reference: PackageRef,
    },
    /// Two requirements disagree on the same package.
    #[error("conflicting requirements for {name}: {existing} vs {requested}")]
    Conflict {
        /// Package name.
        name: String,
        /// Reference already selected.
        existing: PackageRef,
        /// Reference requested later.
        requested: PackageRef,
    },
    /// Requirements form a cycle.
    #[error("dependency cycle: {0}")]
    Cycle(String),
    /// Package does not support the target settings.
    #[error("package {reference} does not support {setting}={value}")]
    Incompatible {
        /// Package reference.
        reference: PackageRef,
        /// Setting name.
        setting: &'static str,
        /// Target value.
        value: String,
    },
    /// Pinned revision differs from the available revision.
    #[error("package {reference} revision mismatch (available {available})")]
    RevisionMismatch {
        /// Requested reference including its revision.
        reference: PackageRef,
        /// Revision present in the repository.
        available: String,
    },
    /// Package manifest is unreadable or invalid.
    #[error("invalid manifest for {reference}: {message}")]
    Manifest {
        /// Package reference.
        reference: PackageRef,
        /// Failure detail.
        message: String,
    },
    /// Repository I/O failure.
    #[error("package repository error: {0}")]
    Io(String),
}

/// Resolves declared dependencies into a package graph.
pub trait DependencyResolver {
    /// Resolves every declaration and its transitive requirements.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when any package is missing, conflicting, or
    /// incompatible with `settings`. No partial graph is returned.
    fn resolve(
        &self,
        declarations: &[DependencyDeclaration],
        settings: &BuildSettings,
    ) -> Result<ResolvedGraph, ResolveError>;
}

impl<T: DependencyResolver + ?Sized> DependencyResolver for &T {
    fn resolve(
        &self,
        declarations: &[DependencyDeclaration],
        settings: &BuildSettings,
    ) -> Result<ResolvedGraph, ResolveError> {
        (**self).resolve(declarations, settings)
    }
}

// ============================================================================
// SECTION: Tool Failures
// ============================================================================

/// Exit status of an external process.
///
/// # Invariants
/// - At most one of `code` and `signal` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunStatus {
    /// Exit code when the process exited normally.
    pub code: Option<i32>,
    /// Terminating signal number (Unix) when killed.
    pub signal: Option<i32>,
}

impl RunStatus {
    /// Status of a process that exited with `code`.
    #[must_use]
    pub const fn exited(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
        }
    }

    /// Status of a process terminated by `signal`.
    #[must_use]
    pub const fn signaled(signal: i32) -> Self {
        Self {
            code: None,
            signal: Some(signal),
        }
    }

    /// Returns true when the process exited with code zero.
    #[must_use]
    pub const fn success(self) -> bool {
        matches!(self.code, Some(0))
    }

    /// Returns the shell-style exit code (`128 + signal` for signals, `1` when
    /// neither is known).
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match (self.code, self.signal) {
            (Some(code), _) => code,
            (None, Some(signal)) => 128 + signal,
            (None, None) => 1,
        }
    }
}

impl From<std::process::ExitStatus> for RunStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = std::os::unix::process::ExitStatusExt::signal(&status);
        #[cfg(not(unix))]
        let signal = None;
        Self {
            code: status.code(),
            signal,
        }
    }
}

/// External tool failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    /// The tool could not be started.
    #[error("failed to start {program}: {message}")]
    Spawn {
        /// Program name or path.
        program: String,
        /// OS error detail.
        message: String,
    },
    /// The tool ran and reported failure.
    #[error("{program} failed with exit code {}", .status.exit_code())]
    Failed {
        /// Program name or path.
        program: String,
        /// Exit status.
        status: RunStatus,
    },
    /// Preparing tool inputs failed (for example writing generated files).
    #[error("{0}")]
    Prepare(String),
}

impl ToolError {
    /// Returns the exit code to propagate for this failure.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Failed {
                status,
                ..
            } => status.exit_code(),
            Self::Spawn {
                ..
            }
            | Self::Prepare(_) => 1,
        }
    }
}

// ============================================================================
// SECTION: Build Tool
// ============================================================================

/// Inputs for the configure step.
#[derive(Debug, Clone, Copy)]
pub struct ConfigureRequest<'a> {
    /// Package under test.
    pub tested: &'a PackageRef,
    /// Computed build layout.
    pub layout: &'a BuildLayout,
    /// Resolved dependencies.
    pub graph: &'a ResolvedGraph,
    /// Invocation context.
    pub context: &'a ExecutionContext,
    /// Environment overlay for build tools.
    pub build_env: &'a EnvOverlay,
    /// Environment overlay for running binaries (rendered for inspection).
    pub run_env: &'a EnvOverlay,
}

/// Inputs for the build step.
#[derive(Debug, Clone, Copy)]
pub struct BuildRequest<'a> {
    /// Computed build layout.
    pub layout: &'a BuildLayout,
    /// Invocation context.
    pub context: &'a ExecutionContext,
    /// Environment overlay for build tools.
    pub build_env: &'a EnvOverlay,
}

/// External build-configuration and build driver.
pub trait BuildTool {
    /// Configures the consumer project.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when configuration fails.
    fn configure(&self, request: &ConfigureRequest<'_>) -> Result<(), ToolError>;

    /// Builds the configured project.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when the build fails.
    fn build(&self, request: &BuildRequest<'_>) -> Result<(), ToolError>;
}

impl<T: BuildTool + ?Sized> BuildTool for &T {
    fn configure(&self, request: &ConfigureRequest<'_>) -> Result<(), ToolError> {
        (**self).configure(request)
    }

    fn build(&self, request: &BuildRequest<'_>) -> Result<(), ToolError> {
        (**self).build(request)
    }
}

// ============================================================================
// SECTION: Binary Runner
// ============================================================================

/// Inputs for running the test binary.
#[derive(Debug, Clone, Copy)]
pub struct RunInvocation<'a> {
    /// Binary to execute.
    pub program: &'a Path,
    /// Working directory (first binary output directory).
    pub working_dir: &'a Path,
    /// Run-time environment overlay.
    pub env: &'a EnvOverlay,
    /// Base environment snapshot the overlay resolves against.
    pub base_env: &'a BaseEnv,
    /// Emulator command line prefix, when execution is emulated.
    pub emulator: Option<&'a [String]>,
}

/// Executes the produced test binary.
pub trait BinaryRunner {
    /// Runs the binary to completion and returns its status.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Spawn`] when the binary cannot be started.
    fn run(&self, invocation: &RunInvocation<'_>) -> Result<RunStatus, ToolError>;
}

impl<T: BinaryRunner + ?Sized> BinaryRunner for &T {
    fn run(&self, invocation: &RunInvocation<'_>) -> Result<RunStatus, ToolError> {
        (**self).run(invocation)
    }
}

// ============================================================================
// SECTION: Observer
// ============================================================================

/// Receives orchestrator progress for logging.
pub trait RunObserver {
    /// Called after each stage transition.
    fn on_stage(&self, _stage: Stage) {}

    /// Called when execution is skipped.
    fn on_skip(&self, _capability: &ExecutionCapability) {}

    /// Called when the binary path is known and about to run.
    fn on_execute(&self, _program: &Path) {}
}

/// Observer that ignores all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

impl<T: RunObserver + ?Sized> RunObserver for &T {
    fn on_stage(&self, stage: Stage) {
        (**self).on_stage(stage);
    }

    fn on_skip(&self, capability: &ExecutionCapability) {
        (**self).on_skip(capability);
    }

    fn on_execute(&self, program: &Path) {
        (**self).on_execute(program);
    }
}
