// crates/pkgcheck-config/src/config.rs
// ============================================================================
// Module: pkgcheck Configuration
// Description: Configuration loading and validation for the package harness.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: pkgcheck-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path comes from the caller, then [`CONFIG_ENV_VAR`], then
//! `pkgcheck.toml` in the working directory. Only the implicit default file
//! may be absent, in which case every section takes its default. Relative
//! paths inside the file resolve against the absolute directory holding the
//! file.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use pkgcheck_core::Arch;
use pkgcheck_core::BuildSettings;
use pkgcheck_core::DEFAULT_BINARY_NAME;
use pkgcheck_core::DEFAULT_TEST_FRAMEWORK;
use pkgcheck_core::ExecutionOverrides;
use pkgcheck_core::HostPlatform;
use pkgcheck_core::LayoutOptions;
use pkgcheck_core::PackageRef;
use pkgcheck_core::SUPPORTED_LAYOUT_VARS;
use pkgcheck_core::SettingsError;
use pkgcheck_core::TestPlan;
use pkgcheck_core::validate_binary_name;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "pkgcheck.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "PKGCHECK_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of test-only requirements.
pub(crate) const MAX_TEST_REQUIRES: usize = 32;
/// Maximum number of configured emulators.
pub(crate) const MAX_EMULATORS: usize = 32;
/// Maximum number of arguments in one emulator command line.
pub(crate) const MAX_EMULATOR_ARGS: usize = 64;
/// Maximum parallel build jobs.
pub(crate) const MAX_BUILD_JOBS: u32 = 256;
/// Default repository directory relative to the config file.
pub(crate) const DEFAULT_REPOSITORY_DIR: &str = "packages";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// pkgcheck harness configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PkgcheckConfig {
    /// Consumer test project settings.
    #[serde(default)]
    pub test: TestConfig,
    /// Build layout settings.
    #[serde(default)]
    pub layout: LayoutConfig,
    /// Build tool settings.
    #[serde(default)]
    pub build: BuildConfig,
    /// Package repository settings.
    #[serde(default)]
    pub repository: RepositoryConfig,
    /// Target build settings layered over the detected host.
    #[serde(default)]
    pub settings: SettingsConfig,
    /// Execution capability overrides for cross builds.
    #[serde(default)]
    pub execution: ExecutionConfig,
    /// Directory relative paths resolve against (not serialized).
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl PkgcheckConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, is oversized,
    /// is not valid TOML, or fails validation. A missing implicit default
    /// file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path)?;
        validate_path(&resolved)?;
        if !explicit && !resolved.exists() {
            let mut config = Self {
                base_dir: absolute_dir(Path::new("."))?,
                ..Self::default()
            };
            config.validate()?;
            return Ok(config);
        }
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml_str(content)?;
        let parent = resolved.parent().filter(|parent| !parent.as_os_str().is_empty());
        config.base_dir = absolute_dir(parent.unwrap_or_else(|| Path::new(".")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from TOML text without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text is not valid TOML or
    /// contains unknown fields.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.base_dir = PathBuf::from(".");
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.test.validate()?;
        self.layout.validate()?;
        self.build.validate()?;
        self.repository.validate()?;
        self.settings.validate()?;
        self.execution.validate()?;
        Ok(())
    }

    /// Resolves a config-relative path against the config directory.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() { path.to_path_buf() } else { self.base_dir.join(path) }
    }

    /// Returns layout options with paths resolved against the config directory.
    #[must_use]
    pub fn layout_options(&self) -> LayoutOptions {
        let source_dir = self.resolve(&self.test.source_dir);
        let output_root =
            self.layout.output_dir.as_ref().map_or_else(|| source_dir.clone(), |dir| self.resolve(dir));
        LayoutOptions {
            source_dir,
            output_root,
            multi_config: self.layout.multi_config,
            build_folder_vars: self.layout.build_folder_vars.clone(),
        }
    }

    /// Returns the package repository root.
    #[must_use]
    pub fn repository_root(&self) -> PathBuf {
        self.repository
            .root
            .as_ref()
            .map_or_else(|| self.base_dir.join(DEFAULT_REPOSITORY_DIR), |root| self.resolve(root))
    }

    /// Builds target settings: native host defaults, then `[settings]`, then
    /// the caller's assignments.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when any assignment is invalid.
    pub fn build_settings(
        &self,
        host: &HostPlatform,
        assignments: &[String],
    ) -> Result<BuildSettings, SettingsError> {
        let mut settings = BuildSettings::native(host);
        settings.apply_all(self.settings.assignments().iter().map(String::as_str))?;
        settings.apply_all(assignments.iter().map(String::as_str))?;
        Ok(settings)
    }

    /// Returns the execution overrides from `[execution]`.
    #[must_use]
    pub fn execution_overrides(&self) -> ExecutionOverrides {
        ExecutionOverrides {
            can_run: self.execution.can_run,
            emulators: self
                .execution
                .emulators
                .iter()
                .map(|(arch, command)| (Arch::parse(arch).as_str(), command.clone()))
                .collect(),
        }
    }

    /// Builds the test plan for a package supplied at run time.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a test requirement is invalid or
    /// names the package under test.
    pub fn test_plan(&self, tested: PackageRef) -> Result<TestPlan, ConfigError> {
        let test_requires = self.test.references()?;
        if let Some(clash) = test_requires.iter().find(|reference| reference.name() == tested.name()) {
            return Err(ConfigError::Invalid(format!(
                "test.requires entry {clash} names the package under test"
            )));
        }
        Ok(TestPlan {
            tested,
            test_requires,
            layout: self.layout_options(),
            binary: self.test.binary.clone(),
        })
    }
}

/// Consumer test project configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestConfig {
    /// Name of the produced test binary (without executable suffix).
    #[serde(default = "default_binary")]
    pub binary: String,
    /// Directory holding the consumer project's `CMakeLists.txt`.
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
    /// Test-only requirements (the pinned test framework).
    #[serde(default = "default_test_requires")]
    pub requires: Vec<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            source_dir: default_source_dir(),
            requires: default_test_requires(),
        }
    }
}

impl TestConfig {
    /// Parses the configured test requirements.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when an entry is not a valid reference.
    pub fn references(&self) -> Result<Vec<PackageRef>, ConfigError> {
        self.requires
            .iter()
            .map(|raw| {
                PackageRef::parse(raw)
                    .map_err(|err| ConfigError::Invalid(format!("test.requires: {err}")))
            })
            .collect()
    }

    /// Validates test settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_binary_name(&self.binary)
            .map_err(|err| ConfigError::Invalid(format!("test.binary: {err}")))?;
        validate_path_string("test.source_dir", &self.source_dir.to_string_lossy())?;
        if self.requires.len() > MAX_TEST_REQUIRES {
            return Err(ConfigError::Invalid("test.requires has too many entries".to_string()));
        }
        let mut names = BTreeSet::new();
        for reference in self.references()? {
            if !names.insert(reference.name().to_string()) {
                return Err(ConfigError::Invalid(format!(
                    "test.requires lists {} more than once",
                    reference.name()
                )));
            }
        }
        Ok(())
    }
}

/// Build layout configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutConfig {
    /// Root for the `build/` tree (defaults to the source directory).
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Whether the generator is multi-config.
    #[serde(default)]
    pub multi_config: bool,
    /// Settings folded into the build folder name.
    #[serde(default)]
    pub build_folder_vars: Vec<String>,
}

impl LayoutConfig {
    /// Validates layout settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(dir) = &self.output_dir {
            validate_path_string("layout.output_dir", &dir.to_string_lossy())?;
        }
        for var in &self.build_folder_vars {
            if !SUPPORTED_LAYOUT_VARS.contains(&var.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "layout.build_folder_vars: unsupported variable {var}"
                )));
            }
        }
        Ok(())
    }
}

/// Build tool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// CMake executable.
    #[serde(default = "default_cmake")]
    pub cmake: String,
    /// Optional CMake generator name.
    #[serde(default)]
    pub generator: Option<String>,
    /// Optional parallel job count.
    #[serde(default)]
    pub jobs: Option<u32>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            cmake: default_cmake(),
            generator: None,
            jobs: None,
        }
    }
}

impl BuildConfig {
    /// Validates build tool settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("build.cmake", &self.cmake)?;
        if let Some(generator) = &self.generator
            && generator.trim().is_empty()
        {
            return Err(ConfigError::Invalid("build.generator must be non-empty".to_string()));
        }
        if let Some(jobs) = self.jobs
            && !(1..=MAX_BUILD_JOBS).contains(&jobs)
        {
            return Err(ConfigError::Invalid(format!(
                "build.jobs must be between 1 and {MAX_BUILD_JOBS}"
            )));
        }
        Ok(())
    }
}

/// Local package repository configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositoryConfig {
    /// Repository root (defaults to `packages` next to the config file).
    #[serde(default)]
    pub root: Option<PathBuf>,
}

impl RepositoryConfig {
    /// Validates repository settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(root) = &self.root {
            validate_path_string("repository.root", &root.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Target settings layered over the detected host platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsConfig {
    /// Target operating system.
    #[serde(default)]
    pub os: Option<String>,
    /// Target architecture.
    #[serde(default)]
    pub arch: Option<String>,
    /// Compiler name.
    #[serde(default)]
    pub compiler: Option<String>,
    /// Compiler version.
    #[serde(default)]
    pub compiler_version: Option<String>,
    /// C++ standard library flavor.
    #[serde(default)]
    pub compiler_libcxx: Option<String>,
    /// Build type.
    #[serde(default)]
    pub build_type: Option<String>,
}

impl SettingsConfig {
    /// Returns the configured settings as `key=value` assignments, ordered so
    /// the compiler name precedes its version.
    #[must_use]
    pub fn assignments(&self) -> Vec<String> {
        let entries = [
            ("os", &self.os),
            ("arch", &self.arch),
            ("compiler", &self.compiler),
            ("compiler.version", &self.compiler_version),
            ("compiler.libcxx", &self.compiler_libcxx),
            ("build_type", &self.build_type),
        ];
        entries
            .into_iter()
            .filter_map(|(key, value)| value.as_ref().map(|value| format!("{key}={value}")))
            .collect()
    }

    /// Validates settings by applying them to a scratch host baseline.
    fn validate(&self) -> Result<(), ConfigError> {
        let mut scratch = BuildSettings::native(&HostPlatform::detect());
        scratch
            .apply_all(self.assignments().iter().map(String::as_str))
            .map_err(|err| ConfigError::Invalid(format!("settings: {err}")))
    }
}

/// Execution capability overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecutionConfig {
    /// Forces the capability verdict for cross builds.
    #[serde(default)]
    pub can_run: Option<bool>,
    /// Emulator command lines keyed by target arch.
    #[serde(default)]
    pub emulators: BTreeMap<String, Vec<String>>,
}

impl ExecutionConfig {
    /// Validates execution overrides.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.emulators.len() > MAX_EMULATORS {
            return Err(ConfigError::Invalid("execution.emulators has too many entries".to_string()));
        }
        for (arch, command) in &self.emulators {
            if arch.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "execution.emulators keys must be non-empty".to_string(),
                ));
            }
            let Some(program) = command.first() else {
                return Err(ConfigError::Invalid(format!(
                    "execution.emulators.{arch} must name a program"
                )));
            };
            validate_path_string(&format!("execution.emulators.{arch}"), program)?;
            if command.len() > MAX_EMULATOR_ARGS {
                return Err(ConfigError::Invalid(format!(
                    "execution.emulators.{arch} has too many arguments"
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the caller or environment defaults.
///
/// Returns the path and whether it was named explicitly.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Makes a config directory absolute so derived paths survive a change of
/// working directory in child processes.
fn absolute_dir(dir: &Path) -> Result<PathBuf, ConfigError> {
    std::path::absolute(dir).map_err(|err| ConfigError::Io(err.to_string()))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    let path = Path::new(trimmed);
    for component in path.components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Default test binary name.
fn default_binary() -> String {
    DEFAULT_BINARY_NAME.to_string()
}

/// Default consumer source directory.
fn default_source_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Default test-only requirements.
fn default_test_requires() -> Vec<String> {
    vec![DEFAULT_TEST_FRAMEWORK.to_string()]
}

/// Default CMake executable.
fn default_cmake() -> String {
    "cmake".to_string()
}
