// crates/pkgcheck-cli/src/lib.rs
// ============================================================================
// Module: pkgcheck CLI Library
// Description: Shared helpers for the pkgcheck binary.
// Purpose: Expose the message catalog to the binary and its tests.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Library half of the `pkgcheck` CLI. The binary entry point lives in
//! `main.rs`; user-facing strings live in [`i18n`].

pub mod i18n;
