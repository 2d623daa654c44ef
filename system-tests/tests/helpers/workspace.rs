// system-tests/tests/helpers/workspace.rs
// ============================================================================
// Module: Scenario Workspaces
// Description: Scratch project, package repository, and scripted tools.
// Purpose: Give each scenario an isolated tree the CLI can run against.
// Dependencies: system-tests config, pkgcheck-core, pkgcheck-tools, tempfile
// ============================================================================

//! ## Overview
//! A workspace holds `project/` (the consumer test project with its
//! `pkgcheck.toml`), `packages/` (the local package repository), and two
//! shell scripts: a stand-in for `cmake` that records its arguments and
//! drops the test binary on `--build`, and the test binary template itself,
//! which records its working directory and loader path before exiting with
//! a configured code.

use std::fmt::Write as _;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::path::PathBuf;
use std::process::Output;

use pkgcheck_core::DEFAULT_BINARY_NAME;
use pkgcheck_tools::MANIFEST_FILE_NAME;
use system_tests::config::SystemTestConfig;
use tempfile::TempDir;

use super::cli::cli_binary;
use super::cli::run_cli;

/// Behavior of the scripted `cmake` stand-in.
#[derive(Debug, Clone, Copy)]
pub struct FakeCmake {
    /// Exit code of the configure step.
    pub configure_exit: i32,
    /// Exit code of the build step.
    pub build_exit: i32,
    /// Whether a successful build drops the test binary.
    pub produce_binary: bool,
}

impl Default for FakeCmake {
    fn default() -> Self {
        Self {
            configure_exit: 0,
            build_exit: 0,
            produce_binary: true,
        }
    }
}

/// Isolated scenario tree.
pub struct Workspace {
    /// Temp dir guard when no run root is configured.
    _temp: Option<TempDir>,
    /// Workspace root.
    root: PathBuf,
}

impl Workspace {
    /// Creates a workspace named after the scenario.
    pub fn new(name: &str) -> Result<Self, String> {
        let config = SystemTestConfig::load()?;
        let (temp, root) = match config.run_root {
            Some(run_root) => {
                let root = run_root.join(name);
                if root.exists() {
                    if !config.allow_overwrite {
                        return Err(format!("scenario dir {} already exists", root.display()));
                    }
                    std::fs::remove_dir_all(&root).map_err(|err| err.to_string())?;
                }
                (None, root)
            }
            None => {
                let temp = tempfile::Builder::new()
                    .prefix(&format!("pkgcheck-{name}-"))
                    .tempdir()
                    .map_err(|err| err.to_string())?;
                let root = temp.path().to_path_buf();
                (Some(temp), root)
            }
        };
        let workspace = Self {
            _temp: temp,
            root,
        };
        std::fs::create_dir_all(workspace.project_dir()).map_err(|err| err.to_string())?;
        std::fs::create_dir_all(workspace.repository_dir()).map_err(|err| err.to_string())?;
        Ok(workspace)
    }

    /// Creates a workspace with the standard packages, tools, and config.
    pub fn standard(name: &str) -> Result<Self, String> {
        let workspace = Self::new(name)?;
        workspace.add_package(
            "libhal",
            "4.1.0",
            "revision = \"abc123\"\n[cpp]\ninclude_dirs = [\"include\"]\nlib_dirs = \
             [\"lib\"]\nlibs = [\"hal\"]\n",
        )?;
        workspace.add_package("boost-ext-ut", "1.1.9", "[cpp]\ninclude_dirs = [\"include\"]\n")?;
        workspace.install_cmake(FakeCmake::default())?;
        workspace.install_binary(0)?;
        workspace.write_config("")?;
        Ok(workspace)
    }

    /// Returns the workspace root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the consumer project directory.
    pub fn project_dir(&self) -> PathBuf {
        self.root.join("project")
    }

    /// Returns the package repository root.
    pub fn repository_dir(&self) -> PathBuf {
        self.root.join("packages")
    }

    /// Returns the fake `cmake` path.
    pub fn cmake_path(&self) -> PathBuf {
        self.root.join("fake-cmake")
    }

    /// Returns the file the fake `cmake` appends its arguments to.
    pub fn cmake_log(&self) -> PathBuf {
        self.root.join("cmake.log")
    }

    /// Returns the file the test binary writes when it runs.
    pub fn binary_marker(&self) -> PathBuf {
        self.root.join("binary-ran.txt")
    }

    /// Returns the expected single-config build directory.
    pub fn build_dir(&self, build_type: &str) -> PathBuf {
        self.project_dir().join("build").join(build_type)
    }

    /// Adds a package to the repository. `extra` is appended to the manifest.
    pub fn add_package(&self, name: &str, version: &str, extra: &str) -> Result<(), String> {
        let dir = self.repository_dir().join(name).join(version);
        std::fs::create_dir_all(dir.join("include")).map_err(|err| err.to_string())?;
        std::fs::create_dir_all(dir.join("lib")).map_err(|err| err.to_string())?;
        let manifest = format!("name = \"{name}\"\nversion = \"{version}\"\n{extra}");
        std::fs::write(dir.join(MANIFEST_FILE_NAME), manifest).map_err(|err| err.to_string())
    }

    /// Writes `project/pkgcheck.toml` pointing at the fake tools.
    /// `extra` is appended verbatim.
    pub fn write_config(&self, extra: &str) -> Result<(), String> {
        let mut config = String::new();
        let _ = writeln!(config, "[build]\ncmake = '{}'", self.cmake_path().display());
        let _ = writeln!(config, "[repository]\nroot = '{}'", self.repository_dir().display());
        config.push_str(extra);
        std::fs::write(self.project_dir().join("pkgcheck.toml"), config)
            .map_err(|err| err.to_string())
    }

    /// Installs the fake `cmake`.
    pub fn install_cmake(&self, behavior: FakeCmake) -> Result<(), String> {
        let template = self.root.join("binary-template.sh");
        let produce = if behavior.produce_binary {
            format!(
                "  cp \"{template}\" \"$2/{DEFAULT_BINARY_NAME}\"\n  chmod +x \
                 \"$2/{DEFAULT_BINARY_NAME}\"\n",
                template = template.display()
            )
        } else {
            String::new()
        };
        let script = format!(
            "#!/bin/sh\necho \"$*\" >> \"{log}\"\nif [ \"$1\" = \"--build\" ]; then\n  if [ {build} \
             -ne 0 ]; then exit {build}; fi\n{produce}  exit 0\nfi\nexit {configure}\n",
            log = self.cmake_log().display(),
            build = behavior.build_exit,
            configure = behavior.configure_exit,
        );
        write_executable(&self.cmake_path(), &script)
    }

    /// Installs the test binary template exiting with `exit_code`.
    pub fn install_binary(&self, exit_code: i32) -> Result<(), String> {
        let script = format!(
            "#!/bin/sh\n{{ echo \"cwd=$(pwd)\"; echo \"ld=$LD_LIBRARY_PATH\"; }} > \"{marker}\"\nexit \
             {exit_code}\n",
            marker = self.binary_marker().display(),
        );
        write_executable(&self.root.join("binary-template.sh"), &script)
    }

    /// Returns the argument lines recorded by the fake `cmake`.
    pub fn cmake_invocations(&self) -> Vec<String> {
        std::fs::read_to_string(self.cmake_log())
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Returns what the test binary recorded, if it ran.
    pub fn binary_record(&self) -> Option<String> {
        std::fs::read_to_string(self.binary_marker()).ok()
    }

    /// Runs `pkgcheck` in the project directory.
    pub fn pkgcheck(&self, args: &[&str]) -> Result<Output, String> {
        self.pkgcheck_with_env(args, &[])
    }

    /// Runs `pkgcheck` in the project directory with extra environment.
    pub fn pkgcheck_with_env(&self, args: &[&str], env: &[(&str, &str)]) -> Result<Output, String> {
        let binary = cli_binary()?;
        run_cli(&binary, &self.project_dir(), args, env)
    }
}

/// Arguments pinning host and target to the same Linux x86_64 platform.
pub const NATIVE_LINUX: &[&str] = &[
    "--host-setting",
    "os=Linux",
    "--host-setting",
    "arch=x86_64",
    "-s",
    "os=Linux",
    "-s",
    "arch=x86_64",
];

/// Returns process stdout as text.
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Returns process stderr as text.
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Writes a script and marks it executable.
fn write_executable(path: &Path, content: &str) -> Result<(), String> {
    std::fs::write(path, content).map_err(|err| err.to_string())?;
    let mut permissions = std::fs::metadata(path).map_err(|err| err.to_string())?.permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(path, permissions).map_err(|err| err.to_string())
}
