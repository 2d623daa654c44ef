// system-tests/src/config/mod.rs
// ============================================================================
// Module: System Test Config
// Description: Configuration entry points for system tests.
// Purpose: Expose environment-backed settings for suites and helpers.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Configuration entry points for system tests.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use env::SystemTestConfig;
pub use env::SystemTestEnv;
pub use env::read_env_strict;
