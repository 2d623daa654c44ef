// crates/pkgcheck-core/src/runtime/stage.rs
// ============================================================================
// Module: Test Stages
// Description: Linear state machine for one package test invocation.
// Purpose: Reject out-of-order steps instead of silently running them.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A package test moves through
//! `start -> dependencies declared -> layout computed -> configured -> built
//! -> {executed | skipped execution} -> done`. [`StageTracker`] records the
//! path taken and refuses any other transition.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Stage
// ============================================================================

/// One step of the package test state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Nothing has happened yet.
    Start,
    /// Dependencies were declared and resolved.
    DependenciesDeclared,
    /// Build layout was computed.
    LayoutComputed,
    /// Configure step succeeded.
    Configured,
    /// Build step succeeded.
    Built,
    /// Test binary ran.
    Executed,
    /// Host cannot run the binary; execution was skipped.
    SkippedExecution,
    /// Invocation finished.
    Done,
}

impl Stage {
    /// Returns a stable label for the stage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::DependenciesDeclared => "dependencies_declared",
            Self::LayoutComputed => "layout_computed",
            Self::Configured => "configured",
            Self::Built => "built",
            Self::Executed => "executed",
            Self::SkippedExecution => "skipped_execution",
            Self::Done => "done",
        }
    }

    /// Returns true when `next` may directly follow this stage.
    #[must_use]
    pub const fn allows(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Start, Self::DependenciesDeclared)
                | (Self::DependenciesDeclared, Self::LayoutComputed)
                | (Self::LayoutComputed, Self::Configured)
                | (Self::Configured, Self::Built)
                | (Self::Built, Self::Executed | Self::SkippedExecution)
                | (Self::Executed | Self::SkippedExecution, Self::Done)
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Tracker
// ============================================================================

/// Illegal stage transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal stage transition {from} -> {to}")]
pub struct StageError {
    /// Stage the tracker was in.
    pub from: Stage,
    /// Requested stage.
    pub to: Stage,
}

/// Records stage transitions and enforces their order.
///
/// # Invariants
/// - `history` starts with [`Stage::Start`] and every adjacent pair satisfies
///   [`Stage::allows`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTracker {
    /// Stages visited so far, in order.
    history: Vec<Stage>,
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StageTracker {
    /// Creates a tracker positioned at [`Stage::Start`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            history: vec![Stage::Start],
        }
    }

    /// Returns the current stage.
    #[must_use]
    pub fn current(&self) -> Stage {
        self.history.last().copied().unwrap_or(Stage::Start)
    }

    /// Moves to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`StageError`] when `next` does not follow the current stage.
    pub fn advance(&mut self, next: Stage) -> Result<(), StageError> {
        let from = self.current();
        if !from.allows(next) {
            return Err(StageError {
                from,
                to: next,
            });
        }
        self.history.push(next);
        Ok(())
    }

    /// Returns the visited stages.
    #[must_use]
    pub fn history(&self) -> &[Stage] {
        &self.history
    }

    /// Consumes the tracker and returns the visited stages.
    #[must_use]
    pub fn into_history(self) -> Vec<Stage> {
        self.history
    }
}
