// crates/pkgcheck-config/src/lib.rs
// ============================================================================
// Module: pkgcheck Config Library
// Description: Canonical config model and validation for pkgcheck.toml.
// Purpose: Single source of truth for harness configuration semantics.
// Dependencies: pkgcheck-core, serde, toml
// ============================================================================

//! ## Overview
//! `pkgcheck-config` defines the `pkgcheck.toml` model. Loading is strict:
//! unknown fields, oversized files, and invalid values fail closed. The
//! package under test is never part of the configuration; it is supplied at
//! run time.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
