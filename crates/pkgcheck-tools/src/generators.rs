// crates/pkgcheck-tools/src/generators.rs
// ============================================================================
// Module: CMake Generators
// Description: Toolchain, package config, and environment file rendering.
// Purpose: Let the consumer project find resolved packages with find_package.
// Dependencies: pkgcheck-core
// ============================================================================

//! ## Overview
//! Generator files are rendered as strings from the configure request and
//! written into the layout's generators directory. Rendering is pure so the
//! file contents can be tested without a filesystem.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use pkgcheck_core::ConfigureRequest;
use pkgcheck_core::ResolvedPackage;
use pkgcheck_core::ToolError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Toolchain file passed as `CMAKE_TOOLCHAIN_FILE`.
pub const TOOLCHAIN_FILE: &str = "pkgcheck_toolchain.cmake";
/// Rendered build environment, for inspection.
pub const BUILD_ENV_FILE: &str = "pkgcheck-build.env";
/// Rendered run environment, for inspection.
pub const RUN_ENV_FILE: &str = "pkgcheck-run.env";
/// Header line of every generated file.
const GENERATED_HEADER: &str = "# Generated by pkgcheck. Do not edit.";

// ============================================================================
// SECTION: Writing
// ============================================================================

/// Writes all generator files for a configure request.
///
/// # Errors
///
/// Returns [`ToolError::Prepare`] when the directory or a file cannot be written.
pub fn write_generators(request: &ConfigureRequest<'_>, multi_config: bool) -> Result<(), ToolError> {
    let dir = &request.layout.generators_dir;
    fs::create_dir_all(dir).map_err(|err| prepare_error(dir, &err))?;
    write_file(&dir.join(TOOLCHAIN_FILE), &render_toolchain(request, multi_config))?;
    for package in &request.graph.packages {
        write_file(&dir.join(package_config_file_name(package)), &render_package_config(package))?;
    }
    let base_env = request.context.base_env();
    write_file(&dir.join(BUILD_ENV_FILE), &request.build_env.render(base_env))?;
    write_file(&dir.join(RUN_ENV_FILE), &request.run_env.render(base_env))?;
    tracing::debug!(
        dir = %dir.display(),
        packages = request.graph.packages.len(),
        "generator files written"
    );
    Ok(())
}

/// Returns the config file name `find_package` looks up for a package.
#[must_use]
pub fn package_config_file_name(package: &ResolvedPackage) -> String {
    format!("{}-config.cmake", package.reference.name())
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders the toolchain file.
#[must_use]
pub fn render_toolchain(request: &ConfigureRequest<'_>, multi_config: bool) -> String {
    let target = request.context.target();
    let mut out = String::new();
    let _ = writeln!(out, "{GENERATED_HEADER}");
    if !multi_config {
        let _ = writeln!(
            out,
            "set(CMAKE_BUILD_TYPE \"{}\" CACHE STRING \"pkgcheck build type\" FORCE)",
            target.build_type
        );
    }
    let _ = writeln!(out, "set(PKGCHECK_TESTED_REFERENCE \"{}\")", quote(&request.tested.to_string()));
    let _ = writeln!(out, "set(PKGCHECK_COMPILER \"{}\")", quote(&target.compiler.name));
    if let Some(version) = &target.compiler.version {
        let _ = writeln!(out, "set(PKGCHECK_COMPILER_VERSION \"{}\")", quote(version));
    }
    if let Some(libcxx) = &target.compiler.libcxx {
        let _ = writeln!(out, "set(PKGCHECK_COMPILER_LIBCXX \"{}\")", quote(libcxx));
    }
    if request.context.is_cross_building() {
        let _ = writeln!(out, "set(CMAKE_SYSTEM_NAME \"{}\")", quote(target.os.cmake_system_name()));
        let _ = writeln!(out, "set(CMAKE_SYSTEM_PROCESSOR \"{}\")", quote(&target.arch.cmake_processor()));
        if target.arch.is_microcontroller() {
            let _ = writeln!(out, "set(CMAKE_TRY_COMPILE_TARGET_TYPE STATIC_LIBRARY)");
        }
    }
    let _ = writeln!(
        out,
        "list(PREPEND CMAKE_PREFIX_PATH \"{}\")",
        cmake_path(&request.layout.generators_dir)
    );
    for package in &request.graph.packages {
        let _ = writeln!(out, "list(APPEND CMAKE_FIND_ROOT_PATH \"{}\")", cmake_path(&package.root));
    }
    let _ = writeln!(out, "set(CMAKE_FIND_PACKAGE_PREFER_CONFIG ON)");
    out
}

/// Renders the `find_package` config file for one package.
#[must_use]
pub fn render_package_config(package: &ResolvedPackage) -> String {
    let name = package.reference.name();
    let target = format!("{name}::{name}");
    let mut out = String::new();
    let _ = writeln!(out, "{GENERATED_HEADER}");
    let _ = writeln!(out, "if(NOT TARGET {target})");
    let _ = writeln!(out, "  add_library({target} INTERFACE IMPORTED)");
    let _ = writeln!(out, "  set_target_properties({target} PROPERTIES");
    let _ = writeln!(out, "    INTERFACE_INCLUDE_DIRECTORIES \"{}\"", path_list(&package.include_dirs));
    let _ = writeln!(out, "    INTERFACE_LINK_DIRECTORIES \"{}\"", path_list(&package.lib_dirs));
    let libs: Vec<String> = package.libs.iter().map(|lib| quote(lib)).collect();
    let _ = writeln!(out, "    INTERFACE_LINK_LIBRARIES \"{}\")", libs.join(";"));
    let _ = writeln!(out, "endif()");
    let _ = writeln!(out, "set({name}_FOUND TRUE)");
    let _ = writeln!(out, "set({name}_VERSION \"{}\")", quote(package.reference.version()));
    out
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Writes one generator file.
fn write_file(path: &Path, content: &str) -> Result<(), ToolError> {
    fs::write(path, content).map_err(|err| prepare_error(path, &err))
}

/// Builds a prepare error for a path.
fn prepare_error(path: &Path, err: &std::io::Error) -> ToolError {
    ToolError::Prepare(format!("failed to write {}: {err}", path.display()))
}

/// Renders a path with forward slashes, as CMake expects.
fn cmake_path(path: &Path) -> String {
    quote(&path.to_string_lossy().replace('\\', "/"))
}

/// Renders a CMake list of paths.
fn path_list(paths: &[std::path::PathBuf]) -> String {
    paths.iter().map(|path| cmake_path(path)).collect::<Vec<_>>().join(";")
}

/// Escapes characters that would end a quoted CMake argument.
fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"").replace('$', "\\$")
}
