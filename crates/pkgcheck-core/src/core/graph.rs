// crates/pkgcheck-core/src/core/graph.rs
// ============================================================================
// Module: Resolved Dependency Graph
// Description: Packages selected by dependency resolution and their file layout.
// Purpose: Feed generators and environment overlays from one resolved view.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`ResolvedGraph`] lists every package reached from the declared
//! dependencies, in dependency-first order, with absolute include, library,
//! and binary directories. Build and run environment overlays are derived
//! from it rather than from ambient state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use serde::Serialize;

use crate::core::env::EnvOverlay;
use crate::core::env::library_path_var;
use crate::core::reference::DependencyRole;
use crate::core::reference::PackageRef;
use crate::core::settings::Os;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A package selected by dependency resolution.
///
/// # Invariants
/// - Directory lists hold absolute paths inside `root`.
/// - `role` is [`DependencyRole::Requires`] when any path from the declared
///   dependencies reaches this package through regular requirements only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPackage {
    /// Canonical reference of the resolved package.
    pub reference: PackageRef,
    /// Effective consumption role.
    pub role: DependencyRole,
    /// Package root directory.
    pub root: PathBuf,
    /// Header search directories.
    pub include_dirs: Vec<PathBuf>,
    /// Library search directories.
    pub lib_dirs: Vec<PathBuf>,
    /// Executable directories.
    pub bin_dirs: Vec<PathBuf>,
    /// Library names to link.
    pub libs: Vec<String>,
}

/// Result of dependency resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedGraph {
    /// Packages in dependency-first order.
    pub packages: Vec<ResolvedPackage>,
}

impl ResolvedGraph {
    /// Returns the resolved package with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResolvedPackage> {
        self.packages.iter().find(|package| package.reference.name() == name)
    }

    /// Returns packages visible to consumers of the tested package.
    pub fn propagated(&self) -> impl Iterator<Item = &ResolvedPackage> {
        self.packages.iter().filter(|package| package.role.propagates())
    }

    /// Returns the overlay that exposes package tools while building.
    #[must_use]
    pub fn build_environment(&self) -> EnvOverlay {
        let mut overlay = EnvOverlay::new();
        for package in &self.packages {
            for dir in &package.bin_dirs {
                overlay.prepend_path("PATH", dir.clone());
            }
        }
        overlay
    }

    /// Returns the overlay that makes shared libraries and executables of
    /// every resolved package discoverable when the test binary runs.
    #[must_use]
    pub fn run_environment(&self, target_os: &Os) -> EnvOverlay {
        let library_var = library_path_var(target_os);
        let mut overlay = EnvOverlay::new();
        for package in &self.packages {
            for dir in &package.bin_dirs {
                overlay.prepend_path("PATH", dir.clone());
            }
            for dir in &package.lib_dirs {
                overlay.prepend_path(library_var, dir.clone());
            }
        }
        overlay
    }
}
