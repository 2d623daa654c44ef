// crates/pkgcheck-core/src/runtime/orchestrator.rs
// ============================================================================
// Module: Package Test Orchestrator
// Description: Resolve, lay out, configure, build, and conditionally run.
// Purpose: Verify a package by building and running a consumer test binary.
// Dependencies: crate::{core, interfaces, runtime}, serde, thiserror, tracing
// ============================================================================

//! ## Overview
//! [`PackageTest::run`] executes one invocation against an immutable
//! [`ExecutionContext`]. Steps are strictly sequential and every external
//! step is fatal on error. The only non-fatal branch is the capability check:
//! when the host cannot run target binaries the invocation completes
//! successfully without invoking the binary.
//!
//! ## Invariants
//! - Configure and build never start unless dependency resolution succeeded.
//! - The binary runs at most once, after a successful build.
//! - Tool and binary exit codes propagate unchanged through [`TestError::exit_code`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::core::BuildLayout;
use crate::core::DependencyDeclaration;
use crate::core::EnvOverlay;
use crate::core::ExecutionCapability;
use crate::core::ExecutionContext;
use crate::core::LayoutError;
use crate::core::LayoutOptions;
use crate::core::PackageRef;
use crate::core::SkipReason;
use crate::interfaces::BinaryRunner;
use crate::interfaces::BuildRequest;
use crate::interfaces::BuildTool;
use crate::interfaces::ConfigureRequest;
use crate::interfaces::DependencyResolver;
use crate::interfaces::NoopObserver;
use crate::interfaces::ResolveError;
use crate::interfaces::RunInvocation;
use crate::interfaces::RunObserver;
use crate::interfaces::RunStatus;
use crate::interfaces::ToolError;
use crate::runtime::stage::Stage;
use crate::runtime::stage::StageError;
use crate::runtime::stage::StageTracker;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Pinned test framework every consumer test builds against by default.
pub const DEFAULT_TEST_FRAMEWORK: &str = "boost-ext-ut/1.1.9";
/// Default name of the produced test binary.
pub const DEFAULT_BINARY_NAME: &str = "unit_test";

// ============================================================================
// SECTION: Plan
// ============================================================================

/// Inputs for one package test.
///
/// # Invariants
/// - `tested` is supplied by the caller at run time; it is never a constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestPlan {
    /// Package under test.
    pub tested: PackageRef,
    /// Test-only dependencies (the pinned test framework).
    pub test_requires: Vec<PackageRef>,
    /// Layout inputs, including the consumer source directory.
    pub layout: LayoutOptions,
    /// Name of the produced test binary, without executable suffix.
    pub binary: String,
}

impl TestPlan {
    /// Creates a plan for `tested` with no test-only dependencies and the
    /// default binary name.
    #[must_use]
    pub fn new(tested: PackageRef, layout: LayoutOptions) -> Self {
        Self {
            tested,
            test_requires: Vec::new(),
            layout,
            binary: DEFAULT_BINARY_NAME.to_string(),
        }
    }

    /// Returns the dependency declarations in declaration order: the tested
    /// package first, then each test-only dependency.
    #[must_use]
    pub fn declarations(&self) -> Vec<DependencyDeclaration> {
        let mut declarations = Vec::with_capacity(1 + self.test_requires.len());
        declarations.push(DependencyDeclaration::requires(self.tested.clone()));
        declarations.extend(self.test_requires.iter().cloned().map(DependencyDeclaration::test_requires));
        declarations
    }
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// How the run step concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TestOutcome {
    /// The binary ran and exited successfully.
    Executed {
        /// Binary exit code.
        exit_code: i32,
    },
    /// The host cannot run the binary; nothing was executed.
    Skipped {
        /// Why execution was skipped.
        reason: SkipReason,
    },
}

/// Summary of a successful invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestReport {
    /// Package under test.
    pub tested: PackageRef,
    /// Capability verdict used for the run decision.
    pub capability: ExecutionCapability,
    /// Computed build layout.
    pub layout: BuildLayout,
    /// Expected test binary path.
    pub binary: PathBuf,
    /// Stages visited, starting with [`Stage::Start`].
    pub stages: Vec<Stage>,
    /// Run step result.
    pub outcome: TestOutcome,
}

impl TestReport {
    /// Returns the process exit code for this report.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self.outcome {
            TestOutcome::Executed {
                exit_code,
            } => exit_code,
            TestOutcome::Skipped {
                ..
            } => 0,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fatal package test failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TestError {
    /// Dependency resolution failed; nothing was configured or built.
    #[error("dependency resolution failed: {0}")]
    Resolution(#[from] ResolveError),
    /// Layout inputs were invalid.
    #[error("invalid build layout: {0}")]
    Layout(#[from] LayoutError),
    /// Configure step failed.
    #[error("configure step failed: {0}")]
    Configure(ToolError),
    /// Build step failed.
    #[error("build step failed: {0}")]
    Build(ToolError),
    /// Build succeeded but the test binary is absent.
    #[error("test binary not found at {}", .0.display())]
    MissingArtifact(PathBuf),
    /// Test binary could not be started.
    #[error("failed to run test binary: {0}")]
    Run(ToolError),
    /// Test binary exited unsuccessfully.
    #[error("test binary {} failed with exit code {}", .binary.display(), .status.exit_code())]
    BinaryFailed {
        /// Binary path.
        binary: PathBuf,
        /// Exit status.
        status: RunStatus,
    },
    /// The orchestrator attempted an illegal stage transition.
    #[error("internal error: {0}")]
    Internal(#[from] StageError),
}

impl TestError {
    /// Returns the exit code to propagate. Tool and binary failures keep
    /// their own non-zero code; everything else maps to `1`.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        let code = match self {
            Self::Configure(err) | Self::Build(err) | Self::Run(err) => err.exit_code(),
            Self::BinaryFailed {
                status,
                ..
            } => status.exit_code(),
            Self::Resolution(_) | Self::Layout(_) | Self::MissingArtifact(_) | Self::Internal(_) => 1,
        };
        if code == 0 { 1 } else { code }
    }

    /// Returns the stage that was being entered when the failure occurred.
    #[must_use]
    pub const fn failed_stage(&self) -> Stage {
        match self {
            Self::Resolution(_) => Stage::DependenciesDeclared,
            Self::Layout(_) => Stage::LayoutComputed,
            Self::Configure(_) => Stage::Configured,
            Self::Build(_) => Stage::Built,
            Self::MissingArtifact(_)
            | Self::Run(_)
            | Self::BinaryFailed {
                ..
            } => Stage::Executed,
            Self::Internal(err) => err.to,
        }
    }
}

// ============================================================================
// SECTION: Orchestrator
// ============================================================================

/// Package test orchestrator.
pub struct PackageTest<R, B, X, O = NoopObserver> {
    /// Dependency resolver.
    resolver: R,
    /// Configure and build driver.
    build_tool: B,
    /// Test binary runner.
    runner: X,
    /// Progress observer.
    observer: O,
}

impl<R, B, X> PackageTest<R, B, X, NoopObserver>
where
    R: DependencyResolver,
    B: BuildTool,
    X: BinaryRunner,
{
    /// Creates an orchestrator without an observer.
    #[must_use]
    pub const fn new(resolver: R, build_tool: B, runner: X) -> Self {
        Self {
            resolver,
            build_tool,
            runner,
            observer: NoopObserver,
        }
    }
}

impl<R, B, X, O> PackageTest<R, B, X, O>
where
    R: DependencyResolver,
    B: BuildTool,
    X: BinaryRunner,
    O: RunObserver,
{
    /// Replaces the progress observer.
    #[must_use]
    pub fn with_observer<P: RunObserver>(self, observer: P) -> PackageTest<R, B, X, P> {
        PackageTest {
            resolver: self.resolver,
            build_tool: self.build_tool,
            runner: self.runner,
            observer,
        }
    }

    /// Runs the package test.
    ///
    /// # Errors
    ///
    /// Returns [`TestError`] for the first failing step. Skipped execution is
    /// not an error.
    pub fn run(&self, plan: &TestPlan, context: &ExecutionContext) -> Result<TestReport, TestError> {
        let mut tracker = StageTracker::new();
        let target = context.target();

        let declarations = plan.declarations();
        tracing::debug!(
            tested = %plan.tested,
            declarations = declarations.len(),
            "resolving dependencies"
        );
        let graph = self.resolver.resolve(&declarations, target)?;
        self.enter(&mut tracker, Stage::DependenciesDeclared)?;

        let layout = BuildLayout::compute(&plan.layout, target)?;
        let binary = layout.binary_path(&plan.binary, target)?;
        self.enter(&mut tracker, Stage::LayoutComputed)?;

        let build_env = graph.build_environment();
        let run_env = graph.run_environment(&target.os);
        self.build_tool
            .configure(&ConfigureRequest {
                tested: &plan.tested,
                layout: &layout,
                graph: &graph,
                context,
                build_env: &build_env,
                run_env: &run_env,
            })
            .map_err(TestError::Configure)?;
        self.enter(&mut tracker, Stage::Configured)?;

        self.build_tool
            .build(&BuildRequest {
                layout: &layout,
                context,
                build_env: &build_env,
            })
            .map_err(TestError::Build)?;
        self.enter(&mut tracker, Stage::Built)?;

        let outcome = if context.can_execute() {
            let status = self.execute(&binary, &layout, &run_env, context)?;
            self.enter(&mut tracker, Stage::Executed)?;
            TestOutcome::Executed {
                exit_code: status.exit_code(),
            }
        } else {
            let reason = skip_reason(context.capability());
            tracing::info!(reason = %reason, "host cannot run target binaries; skipping execution");
            self.observer.on_skip(context.capability());
            self.enter(&mut tracker, Stage::SkippedExecution)?;
            TestOutcome::Skipped {
                reason,
            }
        };
        self.enter(&mut tracker, Stage::Done)?;

        Ok(TestReport {
            tested: plan.tested.clone(),
            capability: context.capability().clone(),
            layout,
            binary,
            stages: tracker.into_history(),
            outcome,
        })
    }

    /// Runs the built binary inside the first binary output directory.
    fn execute(
        &self,
        binary: &Path,
        layout: &BuildLayout,
        run_env: &EnvOverlay,
        context: &ExecutionContext,
    ) -> Result<RunStatus, TestError> {
        if !binary.is_file() {
            return Err(TestError::MissingArtifact(binary.to_path_buf()));
        }
        self.observer.on_execute(binary);
        let status = self
            .runner
            .run(&RunInvocation {
                program: binary,
                working_dir: layout.primary_bindir(),
                env: run_env,
                base_env: context.base_env(),
                emulator: context.capability().emulator(),
            })
            .map_err(TestError::Run)?;
        if !status.success() {
            return Err(TestError::BinaryFailed {
                binary: binary.to_path_buf(),
                status,
            });
        }
        Ok(status)
    }

    /// Advances the tracker and notifies the observer.
    fn enter(&self, tracker: &mut StageTracker, stage: Stage) -> Result<(), TestError> {
        tracker.advance(stage)?;
        tracing::debug!(stage = stage.as_str(), "stage entered");
        self.observer.on_stage(stage);
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Extracts the skip reason from an unavailable capability.
const fn skip_reason(capability: &ExecutionCapability) -> SkipReason {
    match capability {
        ExecutionCapability::Unavailable {
            reason,
        } => *reason,
        _ => SkipReason::Disabled,
    }
}
