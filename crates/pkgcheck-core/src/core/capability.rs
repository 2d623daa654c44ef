// crates/pkgcheck-core/src/core/capability.rs
// ============================================================================
// Module: Execution Capability
// Description: Decides whether target binaries can run on the current host.
// Purpose: Replace ad-hoc platform probing with an explicit, testable predicate.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`can_execute`] compares target settings with the host platform and
//! returns an [`ExecutionCapability`]. Rules apply in a fixed order:
//!
//! 1. Identical os and arch is a native build and always runs.
//! 2. An explicit `can_run = false` override disables execution.
//! 3. An explicit `can_run = true` override forces execution.
//! 4. A configured emulator for the target arch runs the binary through it.
//! 5. Bare-metal targets and foreign operating systems never run.
//! 6. [`COMPATIBILITY_RULES`] lists host/target arch pairs the host executes.
//! 7. Anything else is an architecture mismatch.
//!
//! Overrides cannot disable a native build.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::settings::BuildSettings;
use crate::core::settings::HostPlatform;
use crate::core::settings::Os;

// ============================================================================
// SECTION: Overrides
// ============================================================================

/// Operator-supplied hooks that adjust the capability verdict for cross builds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOverrides {
    /// Forces the verdict for cross builds when set.
    pub can_run: Option<bool>,
    /// Emulator command lines keyed by canonical target arch.
    pub emulators: BTreeMap<String, Vec<String>>,
}

impl ExecutionOverrides {
    /// Returns the emulator command line for an arch, when configured.
    #[must_use]
    pub fn emulator_for(&self, arch: &str) -> Option<&[String]> {
        self.emulators
            .get(arch)
            .filter(|command| !command.is_empty())
            .map(Vec::as_slice)
    }
}

// ============================================================================
// SECTION: Compatibility Table
// ============================================================================

/// A host/target architecture pair the host can execute natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompatibilityRule {
    /// Stable rule label used in reports.
    pub name: &'static str,
    /// Host operating systems the rule applies to (canonical spelling).
    pub host_os: &'static [&'static str],
    /// Host architecture (canonical spelling).
    pub host_arch: &'static str,
    /// Target architecture the host can execute (canonical spelling).
    pub target_arch: &'static str,
}

/// Static host/target compatibility rules.
pub const COMPATIBILITY_RULES: &[CompatibilityRule] = &[
    CompatibilityRule {
        name: "x86_64-runs-x86",
        host_os: &["Linux", "Windows", "FreeBSD"],
        host_arch: "x86_64",
        target_arch: "x86",
    },
    CompatibilityRule {
        name: "armv8-runs-armv7hf",
        host_os: &["Linux", "Android"],
        host_arch: "armv8",
        target_arch: "armv7hf",
    },
    CompatibilityRule {
        name: "armv8-runs-armv7",
        host_os: &["Linux", "Android"],
        host_arch: "armv8",
        target_arch: "armv7",
    },
    CompatibilityRule {
        name: "armv7hf-runs-armv7",
        host_os: &["Linux"],
        host_arch: "armv7hf",
        target_arch: "armv7",
    },
    CompatibilityRule {
        name: "armv7-runs-armv6",
        host_os: &["Linux"],
        host_arch: "armv7",
        target_arch: "armv6",
    },
    CompatibilityRule {
        name: "rosetta-x86_64",
        host_os: &["Macos"],
        host_arch: "armv8",
        target_arch: "x86_64",
    },
];

// ============================================================================
// SECTION: Verdict
// ============================================================================

/// Why a target binary cannot run on this host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Execution disabled by an explicit override.
    Disabled,
    /// Target has no hosted operating system.
    Baremetal,
    /// Target operating system differs from the host.
    OsMismatch,
    /// Host cannot execute the target architecture.
    ArchMismatch,
}

impl SkipReason {
    /// Returns a stable label for the reason.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Baremetal => "baremetal",
            Self::OsMismatch => "os_mismatch",
            Self::ArchMismatch => "arch_mismatch",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability verdict for running target binaries on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutionCapability {
    /// Target equals host.
    Native,
    /// Host executes the target arch through a compatibility rule.
    Compatible {
        /// Matched rule label.
        rule: &'static str,
    },
    /// Binary runs through an emulator command.
    Emulated {
        /// Emulator command line (program followed by arguments).
        emulator: Vec<String>,
    },
    /// Execution forced by an override.
    Forced,
    /// Binary cannot run on this host.
    Unavailable {
        /// Reason execution is not possible.
        reason: SkipReason,
    },
}

impl ExecutionCapability {
    /// Returns true when the binary may be executed.
    #[must_use]
    pub const fn can_execute(&self) -> bool {
        !matches!(self, Self::Unavailable { .. })
    }

    /// Returns the emulator command line, when execution is emulated.
    #[must_use]
    pub fn emulator(&self) -> Option<&[String]> {
        match self {
            Self::Emulated {
                emulator,
            } => Some(emulator.as_slice()),
            _ => None,
        }
    }

    /// Returns a stable label for the verdict.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Compatible {
                ..
            } => "compatible",
            Self::Emulated {
                ..
            } => "emulated",
            Self::Forced => "forced",
            Self::Unavailable {
                ..
            } => "unavailable",
        }
    }
}

// ============================================================================
// SECTION: Predicate
// ============================================================================

/// Decides whether binaries built for `target` can run on `host`.
#[must_use]
pub fn can_execute(
    target: &BuildSettings,
    host: &HostPlatform,
    overrides: &ExecutionOverrides,
) -> ExecutionCapability {
    if target.os == host.os && target.arch == host.arch {
        return ExecutionCapability::Native;
    }
    match overrides.can_run {
        Some(false) => {
            return ExecutionCapability::Unavailable {
                reason: SkipReason::Disabled,
            };
        }
        Some(true) => return ExecutionCapability::Forced,
        None => {}
    }
    let target_arch = target.arch.as_str();
    if let Some(emulator) = overrides.emulator_for(&target_arch) {
        return ExecutionCapability::Emulated {
            emulator: emulator.to_vec(),
        };
    }
    if target.os == Os::Baremetal || target.arch.is_microcontroller() {
        return ExecutionCapability::Unavailable {
            reason: SkipReason::Baremetal,
        };
    }
    if target.os != host.os {
        return ExecutionCapability::Unavailable {
            reason: SkipReason::OsMismatch,
        };
    }
    let host_arch = host.arch.as_str();
    let host_os = host.os.as_str();
    COMPATIBILITY_RULES
        .iter()
        .find(|rule| {
            rule.host_arch == host_arch
                && rule.target_arch == target_arch
                && rule.host_os.iter().any(|os| *os == host_os)
        })
        .map_or(
            ExecutionCapability::Unavailable {
                reason: SkipReason::ArchMismatch,
            },
            |rule| ExecutionCapability::Compatible {
                rule: rule.name,
            },
        )
}
