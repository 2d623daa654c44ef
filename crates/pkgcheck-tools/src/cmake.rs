// crates/pkgcheck-tools/src/cmake.rs
// ============================================================================
// Module: CMake Build Driver
// Description: Configure and build a consumer project with CMake.
// Purpose: Implement the build tool interface on top of the cmake CLI.
// Dependencies: pkgcheck-core, crate::{generators, process}
// ============================================================================

//! ## Overview
//! Configure writes generator files, then runs
//! `cmake -S <src> -B <build> [-G <generator>] -DCMAKE_TOOLCHAIN_FILE=...`.
//! Build runs `cmake --build <build> [--config <type>] [--parallel <jobs>]`.
//! Both steps block until cmake exits and run under the build environment
//! overlay. Multi-config generators receive the build type at build time
//! instead of configure time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsString;
use std::process::Command;

use pkgcheck_core::BuildRequest;
use pkgcheck_core::BuildTool;
use pkgcheck_core::ConfigureRequest;
use pkgcheck_core::ToolError;

use crate::generators::TOOLCHAIN_FILE;
use crate::generators::write_generators;
use crate::process::run_tool;

// ============================================================================
// SECTION: Driver
// ============================================================================

/// CMake-based configure and build driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CMakeTool {
    /// CMake executable.
    program: String,
    /// Optional generator name.
    generator: Option<String>,
    /// Optional parallel job count.
    jobs: Option<u32>,
    /// Whether the generator is multi-config.
    multi_config: bool,
}

impl CMakeTool {
    /// Creates a driver invoking `program`.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            generator: None,
            jobs: None,
            multi_config: false,
        }
    }

    /// Sets the generator passed with `-G`.
    #[must_use]
    pub fn with_generator(mut self, generator: Option<String>) -> Self {
        self.generator = generator;
        self
    }

    /// Sets the `--parallel` job count.
    #[must_use]
    pub const fn with_jobs(mut self, jobs: Option<u32>) -> Self {
        self.jobs = jobs;
        self
    }

    /// Marks the generator as multi-config.
    #[must_use]
    pub const fn with_multi_config(mut self, multi_config: bool) -> Self {
        self.multi_config = multi_config;
        self
    }

    /// Returns the configure step arguments.
    #[must_use]
    pub fn configure_args(&self, request: &ConfigureRequest<'_>) -> Vec<OsString> {
        let layout = request.layout;
        let mut args = vec![
            OsString::from("-S"),
            layout.source_dir.clone().into_os_string(),
            OsString::from("-B"),
            layout.build_dir.clone().into_os_string(),
        ];
        if let Some(generator) = &self.generator {
            args.push(OsString::from("-G"));
            args.push(OsString::from(generator));
        }
        let mut toolchain = OsString::from("-DCMAKE_TOOLCHAIN_FILE=");
        toolchain.push(layout.generators_dir.join(TOOLCHAIN_FILE));
        args.push(toolchain);
        if !self.multi_config {
            args.push(OsString::from(format!(
                "-DCMAKE_BUILD_TYPE={}",
                request.context.target().build_type
            )));
        }
        args
    }

    /// Returns the build step arguments.
    #[must_use]
    pub fn build_args(&self, request: &BuildRequest<'_>) -> Vec<OsString> {
        let mut args = vec![OsString::from("--build"), request.layout.build_dir.clone().into_os_string()];
        if self.multi_config {
            args.push(OsString::from("--config"));
            args.push(OsString::from(request.context.target().build_type.as_str()));
        }
        if let Some(jobs) = self.jobs {
            args.push(OsString::from("--parallel"));
            args.push(OsString::from(jobs.to_string()));
        }
        args
    }
}

impl BuildTool for CMakeTool {
    fn configure(&self, request: &ConfigureRequest<'_>) -> Result<(), ToolError> {
        write_generators(request, self.multi_config)?;
        let mut command = Command::new(&self.program);
        command.args(self.configure_args(request));
        run_tool(command, &self.program, request.build_env, request.context.base_env())
    }

    fn build(&self, request: &BuildRequest<'_>) -> Result<(), ToolError> {
        let mut command = Command::new(&self.program);
        command.args(self.build_args(request));
        run_tool(command, &self.program, request.build_env, request.context.base_env())
    }
}
