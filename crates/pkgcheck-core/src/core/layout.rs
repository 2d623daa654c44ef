// crates/pkgcheck-core/src/core/layout.rs
// ============================================================================
// Module: Build Layout
// Description: Source, build, generator, and binary directory computation.
// Purpose: Keep invocations with different settings in distinct directories.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! [`BuildLayout::compute`] is a pure function of the layout options and the
//! target settings: it never touches the filesystem. Single-config generators
//! get one build directory per build type; multi-config generators share a
//! build directory and place binaries in a per-build-type subdirectory.
//! Optional `build_folder_vars` fold selected settings into the path so
//! cross and native builds of the same source never collide.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::settings::BuildSettings;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Name of the build directory under the output root.
pub const BUILD_DIR_NAME: &str = "build";
/// Name of the generator output directory under the build directory.
pub const GENERATORS_DIR_NAME: &str = "generators";
/// Layout variables accepted in `build_folder_vars`.
pub const SUPPORTED_LAYOUT_VARS: &[&str] = &[
    "settings.os",
    "settings.arch",
    "settings.compiler",
    "settings.compiler.version",
    "settings.build_type",
];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Layout computation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// A `build_folder_vars` entry is not supported.
    #[error("unsupported build folder variable '{0}'")]
    UnknownVariable(String),
    /// A `build_folder_vars` value is not usable as a path component.
    #[error("build folder variable '{variable}' has unsafe value '{value}'")]
    UnsafeFolderValue {
        /// Variable that produced the value.
        variable: String,
        /// Offending value.
        value: String,
    },
    /// The binary name is empty or contains path separators.
    #[error("binary name '{0}' must be a plain file name")]
    InvalidBinaryName(String),
}

// ============================================================================
// SECTION: Options
// ============================================================================

/// Inputs that shape the build layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutOptions {
    /// Directory holding the consumer project's `CMakeLists.txt`.
    pub source_dir: PathBuf,
    /// Root under which the `build/` tree is placed.
    pub output_root: PathBuf,
    /// Whether the generator produces multiple configurations per tree.
    pub multi_config: bool,
    /// Settings folded into the build folder name.
    pub build_folder_vars: Vec<String>,
}

impl LayoutOptions {
    /// Creates options with the output root equal to the source directory.
    #[must_use]
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        let source_dir = source_dir.into();
        Self {
            output_root: source_dir.clone(),
            source_dir,
            multi_config: false,
            build_folder_vars: Vec::new(),
        }
    }
}

// ============================================================================
// SECTION: Layout
// ============================================================================

/// Computed directories for one invocation.
///
/// # Invariants
/// - `bindirs` is never empty; `bindirs[0]` holds the test binary.
/// - `generators_dir` is inside `build_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildLayout {
    /// Consumer project source directory.
    pub source_dir: PathBuf,
    /// CMake binary tree.
    pub build_dir: PathBuf,
    /// Generated toolchain, package config, and environment files.
    pub generators_dir: PathBuf,
    /// Declared binary output directories.
    pub bindirs: Vec<PathBuf>,
}

impl BuildLayout {
    /// Computes the layout for the given options and target settings.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::UnknownVariable`] when `build_folder_vars`
    /// names an unsupported variable, or [`LayoutError::UnsafeFolderValue`]
    /// when a variable's value would leave the output root.
    pub fn compute(options: &LayoutOptions, settings: &BuildSettings) -> Result<Self, LayoutError> {
        let mut build_root = options.output_root.join(BUILD_DIR_NAME);
        if let Some(folder) = folder_name(&options.build_folder_vars, settings)? {
            build_root.push(folder);
        }
        let build_type = settings.build_type.as_str();
        let (build_dir, bindir) = if options.multi_config {
            let bindir = build_root.join(build_type);
            (build_root, bindir)
        } else {
            let build_dir = build_root.join(build_type);
            (build_dir.clone(), build_dir)
        };
        Ok(Self {
            source_dir: options.source_dir.clone(),
            generators_dir: build_dir.join(GENERATORS_DIR_NAME),
            build_dir,
            bindirs: vec![bindir],
        })
    }

    /// Returns the first declared binary output directory.
    #[must_use]
    pub fn primary_bindir(&self) -> &Path {
        self.bindirs.first().map_or(self.build_dir.as_path(), PathBuf::as_path)
    }

    /// Returns the expected path of the named binary for the target settings.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidBinaryName`] when `name` is not a plain
    /// file name.
    pub fn binary_path(&self, name: &str, settings: &BuildSettings) -> Result<PathBuf, LayoutError> {
        validate_binary_name(name)?;
        let file_name = format!("{name}{}", settings.os.exe_suffix());
        Ok(self.primary_bindir().join(file_name))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates a binary name is a single non-empty path component.
///
/// # Errors
///
/// Returns [`LayoutError::InvalidBinaryName`] for empty names, separators,
/// or relative-path markers.
pub fn validate_binary_name(name: &str) -> Result<(), LayoutError> {
    if name.trim().is_empty() || !is_path_component(name) {
        return Err(LayoutError::InvalidBinaryName(name.to_string()));
    }
    Ok(())
}

/// Returns true when `value` stays within its parent directory once joined.
fn is_path_component(value: &str) -> bool {
    !(value.contains(['/', '\\']) || value == "." || value == "..")
}

/// Builds the folder name from `build_folder_vars`, or `None` when unset.
fn folder_name(vars: &[String], settings: &BuildSettings) -> Result<Option<String>, LayoutError> {
    if vars.is_empty() {
        return Ok(None);
    }
    let mut parts = Vec::with_capacity(vars.len());
    for var in vars {
        let value =
            settings.variable(var).ok_or_else(|| LayoutError::UnknownVariable(var.clone()))?;
        if value.is_empty() {
            continue;
        }
        if !is_path_component(&value) {
            return Err(LayoutError::UnsafeFolderValue {
                variable: var.clone(),
                value,
            });
        }
        parts.push(value.to_ascii_lowercase());
    }
    if parts.is_empty() {
        return Ok(None);
    }
    Ok(Some(parts.join("-")))
}
