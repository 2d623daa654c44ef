// crates/pkgcheck-core/src/core/context.rs
// ============================================================================
// Module: Execution Context
// Description: Immutable snapshot of settings, host, environment, and capability.
// Purpose: Thread one read-only view of ambient state through every step.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The execution context is captured once at the start of an invocation.
//! Later steps read it but never re-read process state, so a run behaves the
//! same no matter what changes in the environment while tools execute.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::capability::ExecutionCapability;
use crate::core::capability::ExecutionOverrides;
use crate::core::capability::can_execute;
use crate::core::env::BaseEnv;
use crate::core::settings::BuildSettings;
use crate::core::settings::HostPlatform;

// ============================================================================
// SECTION: Context
// ============================================================================

/// Read-only context for one harness invocation.
///
/// # Invariants
/// - `capability` is computed from `target`, `host`, and the overrides at
///   construction and never recomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    /// Settings the consumer project is built for.
    target: BuildSettings,
    /// Machine running the harness.
    host: HostPlatform,
    /// Environment snapshot taken at capture time.
    base_env: BaseEnv,
    /// Capability verdict for running target binaries.
    capability: ExecutionCapability,
}

impl ExecutionContext {
    /// Captures a context from explicit inputs.
    #[must_use]
    pub fn capture(
        target: BuildSettings,
        host: HostPlatform,
        overrides: &ExecutionOverrides,
        base_env: BaseEnv,
    ) -> Self {
        let capability = can_execute(&target, &host, overrides);
        Self {
            target,
            host,
            base_env,
            capability,
        }
    }

    /// Returns the target build settings.
    #[must_use]
    pub const fn target(&self) -> &BuildSettings {
        &self.target
    }

    /// Returns the host platform.
    #[must_use]
    pub const fn host(&self) -> &HostPlatform {
        &self.host
    }

    /// Returns the captured base environment.
    #[must_use]
    pub const fn base_env(&self) -> &BaseEnv {
        &self.base_env
    }

    /// Returns the capability verdict.
    #[must_use]
    pub const fn capability(&self) -> &ExecutionCapability {
        &self.capability
    }

    /// Returns true when target binaries may be executed.
    #[must_use]
    pub const fn can_execute(&self) -> bool {
        self.capability.can_execute()
    }

    /// Returns true when the target differs from the host.
    #[must_use]
    pub fn is_cross_building(&self) -> bool {
        self.target.os != self.host.os || self.target.arch != self.host.arch
    }
}
