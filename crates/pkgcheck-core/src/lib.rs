// crates/pkgcheck-core/src/lib.rs
// ============================================================================
// Module: pkgcheck Core Library
// Description: Public API surface for the pkgcheck package test harness.
// Purpose: Expose domain types, collaborator interfaces, and the orchestrator.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! pkgcheck verifies a published package by building a small consumer test
//! program against it and running the result when the host can execute it.
//! This crate holds everything that does not touch an external tool: the
//! domain types, the capability predicate, the collaborator traits, and the
//! orchestrator that sequences them. Concrete collaborators live in
//! `pkgcheck-tools`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::BinaryRunner;
pub use interfaces::BuildRequest;
pub use interfaces::BuildTool;
pub use interfaces::ConfigureRequest;
pub use interfaces::DependencyResolver;
pub use interfaces::NoopObserver;
pub use interfaces::ResolveError;
pub use interfaces::RunInvocation;
pub use interfaces::RunObserver;
pub use interfaces::RunStatus;
pub use interfaces::ToolError;
pub use runtime::DEFAULT_BINARY_NAME;
pub use runtime::DEFAULT_TEST_FRAMEWORK;
pub use runtime::PackageTest;
pub use runtime::Stage;
pub use runtime::StageError;
pub use runtime::StageTracker;
pub use runtime::TestError;
pub use runtime::TestOutcome;
pub use runtime::TestPlan;
pub use runtime::TestReport;
