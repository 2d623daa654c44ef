// system-tests/src/lib.rs
// ============================================================================
// Module: pkgcheck System Tests Library
// Description: Shared configuration for end-to-end pkgcheck scenarios.
// Purpose: Provide common settings for the system-test binaries.
// Dependencies: std
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration used by the pkgcheck system-test
//! binaries in `system-tests/tests`. The suites drive the compiled `pkgcheck`
//! CLI against a scratch package repository and a scripted stand-in for
//! `cmake`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
