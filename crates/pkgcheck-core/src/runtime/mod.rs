// crates/pkgcheck-core/src/runtime/mod.rs
// ============================================================================
// Module: pkgcheck Runtime
// Description: Package test orchestrator and its stage state machine.
// Purpose: Drive resolution, layout, configure, build, and run in order.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The runtime owns the only execution path for a package test. Every
//! surface (CLI, system tests) calls [`PackageTest::run`] so stage ordering
//! and failure semantics stay identical everywhere.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod orchestrator;
pub mod stage;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use orchestrator::DEFAULT_BINARY_NAME;
pub use orchestrator::DEFAULT_TEST_FRAMEWORK;
pub use orchestrator::PackageTest;
pub use orchestrator::TestError;
pub use orchestrator::TestOutcome;
pub use orchestrator::TestPlan;
pub use orchestrator::TestReport;
pub use stage::Stage;
pub use stage::StageError;
pub use stage::StageTracker;
