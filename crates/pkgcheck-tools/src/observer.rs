// crates/pkgcheck-tools/src/observer.rs
// ============================================================================
// Module: Tracing Observer
// Description: Forwards orchestrator progress to tracing events.
// Purpose: Structured progress logging without coupling core to a subscriber.
// Dependencies: pkgcheck-core, tracing
// ============================================================================

//! Tracing-backed [`RunObserver`] implementation.

use std::path::Path;

use pkgcheck_core::ExecutionCapability;
use pkgcheck_core::RunObserver;
use pkgcheck_core::Stage;

/// Observer that emits one `tracing` event per orchestrator notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn on_stage(&self, stage: Stage) {
        tracing::info!(target: "pkgcheck::stage", stage = stage.as_str(), "stage complete");
    }

    fn on_skip(&self, capability: &ExecutionCapability) {
        tracing::warn!(
            target: "pkgcheck::stage",
            capability = capability.label(),
            "skipping test binary execution"
        );
    }

    fn on_execute(&self, program: &Path) {
        tracing::info!(target: "pkgcheck::stage", program = %program.display(), "executing test binary");
    }
}
