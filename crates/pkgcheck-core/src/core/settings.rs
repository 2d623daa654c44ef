// crates/pkgcheck-core/src/core/settings.rs
// ============================================================================
// Module: Build Settings
// Description: Operating system, architecture, compiler, and build type values.
// Purpose: Parameterize builds with canonical, comparable setting values.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Build settings describe the platform a package is built for. Values parse
//! case-insensitively from `key=value` assignments and render in canonical
//! spelling so reports and generated files are stable across invocations.
//! [`HostPlatform`] describes the machine running the harness itself.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Build settings errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// Assignment was not of the form `key=value`.
    #[error("setting '{0}' must have the form key=value")]
    MalformedAssignment(String),
    /// Setting key is not recognized.
    #[error("unknown setting '{0}'")]
    UnknownKey(String),
    /// Setting value is empty or not recognized for the key.
    #[error("invalid value '{value}' for setting '{key}'")]
    InvalidValue {
        /// Setting key.
        key: String,
        /// Offending value.
        value: String,
    },
}

// ============================================================================
// SECTION: Operating System
// ============================================================================

/// Target operating system.
///
/// # Invariants
/// - [`Os::Baremetal`] denotes a target without a hosted operating system.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Os {
    /// Linux.
    Linux,
    /// macOS.
    Macos,
    /// Windows.
    Windows,
    /// `FreeBSD`.
    FreeBsd,
    /// Android.
    Android,
    /// No operating system (microcontroller firmware).
    Baremetal,
    /// Any other operating system, stored lowercased.
    Other(String),
}

impl Os {
    /// Parses an operating system name (case-insensitive).
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "linux" => Self::Linux,
            "macos" | "darwin" => Self::Macos,
            "windows" => Self::Windows,
            "freebsd" => Self::FreeBsd,
            "android" => Self::Android,
            "baremetal" | "none" | "generic" => Self::Baremetal,
            _ => Self::Other(normalized),
        }
    }

    /// Returns the canonical setting spelling.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Linux => "Linux",
            Self::Macos => "Macos",
            Self::Windows => "Windows",
            Self::FreeBsd => "FreeBSD",
            Self::Android => "Android",
            Self::Baremetal => "baremetal",
            Self::Other(value) => value,
        }
    }

    /// Returns the `CMAKE_SYSTEM_NAME` value for this operating system.
    #[must_use]
    pub fn cmake_system_name(&self) -> &str {
        match self {
            Self::Linux => "Linux",
            Self::Macos => "Darwin",
            Self::Windows => "Windows",
            Self::FreeBsd => "FreeBSD",
            Self::Android => "Android",
            Self::Baremetal => "Generic",
            Self::Other(value) => value,
        }
    }

    /// Returns the executable suffix for binaries built for this system.
    #[must_use]
    pub const fn exe_suffix(&self) -> &'static str {
        match self {
            Self::Windows => ".exe",
            _ => "",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Architecture
// ============================================================================

/// Target processor architecture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Arch {
    /// 32-bit x86.
    X86,
    /// 64-bit x86.
    X86_64,
    /// ARMv6 application profile.
    Armv6,
    /// ARMv7 application profile, soft float.
    Armv7,
    /// ARMv7 application profile, hard float.
    Armv7hf,
    /// ARMv8 / `AArch64`.
    Armv8,
    /// ARM Cortex-M microcontroller core (for example `m4f`).
    CortexM(String),
    /// 32-bit RISC-V.
    Riscv32,
    /// 64-bit RISC-V.
    Riscv64,
    /// WebAssembly.
    Wasm,
    /// Any other architecture, stored lowercased.
    Other(String),
}

impl Arch {
    /// Parses an architecture name (case-insensitive).
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let normalized = value.trim().to_ascii_lowercase();
        if let Some(core) = normalized.strip_prefix("cortex-") {
            if core.starts_with('m') && core.len() > 1 {
                return Self::CortexM(core.to_string());
            }
        }
        match normalized.as_str() {
            "x86" | "i386" | "i686" => Self::X86,
            "x86_64" | "amd64" => Self::X86_64,
            "armv6" => Self::Armv6,
            "armv7" | "arm" => Self::Armv7,
            "armv7hf" => Self::Armv7hf,
            "armv8" | "aarch64" | "arm64" => Self::Armv8,
            "riscv32" => Self::Riscv32,
            "riscv64" => Self::Riscv64,
            "wasm" | "wasm32" => Self::Wasm,
            _ => Self::Other(normalized),
        }
    }

    /// Returns the canonical setting spelling.
    #[must_use]
    pub fn as_str(&self) -> String {
        match self {
            Self::X86 => "x86".to_string(),
            Self::X86_64 => "x86_64".to_string(),
            Self::Armv6 => "armv6".to_string(),
            Self::Armv7 => "armv7".to_string(),
            Self::Armv7hf => "armv7hf".to_string(),
            Self::Armv8 => "armv8".to_string(),
            Self::CortexM(core) => format!("cortex-{core}"),
            Self::Riscv32 => "riscv32".to_string(),
            Self::Riscv64 => "riscv64".to_string(),
            Self::Wasm => "wasm".to_string(),
            Self::Other(value) => value.clone(),
        }
    }

    /// Returns the `CMAKE_SYSTEM_PROCESSOR` value for this architecture.
    #[must_use]
    pub fn cmake_processor(&self) -> String {
        match self {
            Self::X86 => "x86".to_string(),
            Self::X86_64 => "x86_64".to_string(),
            Self::Armv6 | Self::Armv7 | Self::Armv7hf | Self::CortexM(_) => "arm".to_string(),
            Self::Armv8 => "aarch64".to_string(),
            Self::Riscv32 => "riscv32".to_string(),
            Self::Riscv64 => "riscv64".to_string(),
            Self::Wasm => "wasm32".to_string(),
            Self::Other(value) => value.clone(),
        }
    }

    /// Returns true for microcontroller cores that never host an OS process.
    #[must_use]
    pub const fn is_microcontroller(&self) -> bool {
        matches!(self, Self::CortexM(_))
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

// ============================================================================
// SECTION: Build Type
// ============================================================================

/// CMake-style build configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BuildType {
    /// Unoptimized with debug information.
    Debug,
    /// Optimized without debug information.
    #[default]
    Release,
    /// Optimized with debug information.
    RelWithDebInfo,
    /// Optimized for size.
    MinSizeRel,
}

impl BuildType {
    /// Parses a build type (case-insensitive).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "release" => Some(Self::Release),
            "relwithdebinfo" => Some(Self::RelWithDebInfo),
            "minsizerel" => Some(Self::MinSizeRel),
            _ => None,
        }
    }

    /// Returns the canonical CMake spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::Release => "Release",
            Self::RelWithDebInfo => "RelWithDebInfo",
            Self::MinSizeRel => "MinSizeRel",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Compiler
// ============================================================================

/// Compiler identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Compiler {
    /// Compiler name (`gcc`, `clang`, `msvc`, ...).
    pub name: String,
    /// Optional compiler version.
    pub version: Option<String>,
    /// Optional C++ standard library flavor.
    pub libcxx: Option<String>,
}

impl Compiler {
    /// Creates a compiler identity without version information.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            libcxx: None,
        }
    }
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(version) = &self.version {
            write!(f, "-{version}")?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Build Settings
// ============================================================================

/// The settings tuple that parameterizes one build.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildSettings {
    /// Target operating system.
    pub os: Os,
    /// Target architecture.
    pub arch: Arch,
    /// Compiler identity.
    pub compiler: Compiler,
    /// Build configuration.
    pub build_type: BuildType,
}

impl BuildSettings {
    /// Returns native settings for the host platform with a default compiler.
    #[must_use]
    pub fn native(host: &HostPlatform) -> Self {
        let compiler = match host.os {
            Os::Windows => "msvc",
            Os::Macos => "apple-clang",
            _ => "gcc",
        };
        Self {
            os: host.os.clone(),
            arch: host.arch.clone(),
            compiler: Compiler::named(compiler),
            build_type: BuildType::default(),
        }
    }

    /// Applies a single `key=value` assignment.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the assignment is malformed, the key is
    /// unknown, or the value is invalid.
    pub fn apply(&mut self, assignment: &str) -> Result<(), SettingsError> {
        let (key, value) = split_assignment(assignment)?;
        match key {
            "os" => self.os = Os::parse(value),
            "arch" => self.arch = Arch::parse(value),
            "compiler" => {
                self.compiler = Compiler::named(value);
            }
            "compiler.version" => self.compiler.version = Some(value.to_string()),
            "compiler.libcxx" => self.compiler.libcxx = Some(value.to_string()),
            "build_type" => {
                self.build_type = BuildType::parse(value).ok_or_else(|| {
                    SettingsError::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                    }
                })?;
            }
            other => return Err(SettingsError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    /// Applies a sequence of `key=value` assignments in order.
    ///
    /// # Errors
    ///
    /// Returns the first [`SettingsError`] encountered.
    pub fn apply_all<'a, I>(&mut self, assignments: I) -> Result<(), SettingsError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for assignment in assignments {
            self.apply(assignment)?;
        }
        Ok(())
    }

    /// Returns the setting value for a `settings.*` layout variable.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<String> {
        match name {
            "settings.os" => Some(self.os.to_string()),
            "settings.arch" => Some(self.arch.to_string()),
            "settings.compiler" => Some(self.compiler.name.clone()),
            "settings.compiler.version" => Some(self.compiler.version.clone().unwrap_or_default()),
            "settings.build_type" => Some(self.build_type.to_string()),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Host Platform
// ============================================================================

/// The machine running the harness.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostPlatform {
    /// Host operating system.
    pub os: Os,
    /// Host architecture.
    pub arch: Arch,
}

impl HostPlatform {
    /// Detects the platform the harness was compiled for.
    #[must_use]
    pub fn detect() -> Self {
        Self {
            os: Os::parse(std::env::consts::OS),
            arch: Arch::parse(std::env::consts::ARCH),
        }
    }

    /// Applies a `key=value` override (`os` or `arch`).
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the assignment is malformed or the key
    /// is not `os`/`arch`.
    pub fn apply(&mut self, assignment: &str) -> Result<(), SettingsError> {
        let (key, value) = split_assignment(assignment)?;
        match key {
            "os" => self.os = Os::parse(value),
            "arch" => self.arch = Arch::parse(value),
            other => return Err(SettingsError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Serde
// ============================================================================

impl Serialize for Os {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Os {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.trim().is_empty() {
            return Err(serde::de::Error::custom("os must not be empty"));
        }
        Ok(Self::parse(&raw))
    }
}

impl Serialize for Arch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_str())
    }
}

impl<'de> Deserialize<'de> for Arch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.trim().is_empty() {
            return Err(serde::de::Error::custom("arch must not be empty"));
        }
        Ok(Self::parse(&raw))
    }
}

impl Serialize for BuildType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BuildType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid build_type '{raw}'")))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Splits a `key=value` assignment, rejecting empty keys or values.
fn split_assignment(assignment: &str) -> Result<(&str, &str), SettingsError> {
    let Some((key, value)) = assignment.split_once('=') else {
        return Err(SettingsError::MalformedAssignment(assignment.to_string()));
    };
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() {
        return Err(SettingsError::MalformedAssignment(assignment.to_string()));
    }
    if value.is_empty() {
        return Err(SettingsError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    Ok((key, value))
}
