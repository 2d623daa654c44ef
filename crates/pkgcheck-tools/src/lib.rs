// crates/pkgcheck-tools/src/lib.rs
// ============================================================================
// Module: pkgcheck Tools Library
// Description: Concrete resolver, build driver, runner, and observer.
// Purpose: Bind the core interfaces to the filesystem and external processes.
// Dependencies: pkgcheck-core, serde, toml, tracing
// ============================================================================

//! ## Overview
//! Each module implements one `pkgcheck-core` interface:
//! [`LocalRepository`] resolves packages from a directory tree,
//! [`CMakeTool`] writes generator files and drives `cmake`,
//! [`ProcessRunner`] executes the test binary, and [`TracingObserver`]
//! forwards orchestrator progress to `tracing`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod cmake;
pub mod generators;
pub mod local_repo;
pub mod observer;
pub mod process;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cmake::CMakeTool;
pub use generators::BUILD_ENV_FILE;
pub use generators::RUN_ENV_FILE;
pub use generators::TOOLCHAIN_FILE;
pub use generators::package_config_file_name;
pub use local_repo::LocalRepository;
pub use local_repo::MANIFEST_FILE_NAME;
pub use local_repo::PackageManifest;
pub use observer::TracingObserver;
pub use process::ProcessRunner;
