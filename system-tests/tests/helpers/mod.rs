// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for pkgcheck system-tests.
// Purpose: Provide CLI resolution and scenario workspaces with fake tools.
// Dependencies: system-tests, pkgcheck-core, pkgcheck-tools, tempfile
// ============================================================================

//! ## Overview
//! Shared helpers for pkgcheck system-tests.
//! Invariants:
//! - Every scenario runs in its own workspace.
//! - External tools are scripted stand-ins; no real compiler is required.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod cli;
pub mod workspace;
