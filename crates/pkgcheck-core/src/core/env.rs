// crates/pkgcheck-core/src/core/env.rs
// ============================================================================
// Module: Environment Overlay
// Description: Ordered environment edits applied to child processes.
// Purpose: Scope build and run environments to the spawned tool, never the harness.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! An [`EnvOverlay`] is a list of edits (set, unset, prepend, append) resolved
//! against an immutable snapshot of the base environment. Overlays are applied
//! to a [`Command`] only, so the harness process environment is never mutated
//! and nothing needs restoring once the child exits.
//!
//! ## Invariants
//! - Edits apply in insertion order.
//! - Path-list edits skip entries already present in the variable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::ffi::OsString;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::Command;

use serde::Serialize;

use crate::core::settings::Os;

// ============================================================================
// SECTION: Base Environment
// ============================================================================

/// Immutable snapshot of environment variables taken once per invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseEnv {
    /// Captured variables.
    vars: BTreeMap<OsString, OsString>,
}

impl BaseEnv {
    /// Captures the current process environment.
    #[must_use]
    pub fn capture() -> Self {
        Self {
            vars: std::env::vars_os().collect(),
        }
    }

    /// Builds a snapshot from explicit pairs (used for deterministic runs).
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        Self {
            vars: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Returns a captured variable.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&OsStr> {
        self.vars.get(OsStr::new(key)).map(OsString::as_os_str)
    }
}

// ============================================================================
// SECTION: Overlay
// ============================================================================

/// A single environment edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EnvEdit {
    /// Replace the variable with a value.
    Set {
        /// Variable name.
        key: String,
        /// New value.
        value: String,
    },
    /// Remove the variable.
    Unset {
        /// Variable name.
        key: String,
    },
    /// Insert a path at the front of a path-list variable.
    Prepend {
        /// Variable name.
        key: String,
        /// Path entry.
        path: PathBuf,
    },
    /// Insert a path at the end of a path-list variable.
    Append {
        /// Variable name.
        key: String,
        /// Path entry.
        path: PathBuf,
    },
}

/// Resolved value of one variable after applying an overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedVar {
    /// Variable is set to the value.
    Set(OsString),
    /// Variable is removed.
    Removed,
}

/// Ordered set of environment edits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EnvOverlay {
    /// Edits in application order.
    edits: Vec<EnvEdit>,
}

impl EnvOverlay {
    /// Creates an empty overlay.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            edits: Vec::new(),
        }
    }

    /// Adds a `Set` edit.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.edits.push(EnvEdit::Set {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Adds an `Unset` edit.
    pub fn unset(&mut self, key: impl Into<String>) -> &mut Self {
        self.edits.push(EnvEdit::Unset {
            key: key.into(),
        });
        self
    }

    /// Adds a `Prepend` edit.
    pub fn prepend_path(&mut self, key: impl Into<String>, path: impl Into<PathBuf>) -> &mut Self {
        self.edits.push(EnvEdit::Prepend {
            key: key.into(),
            path: path.into(),
        });
        self
    }

    /// Adds an `Append` edit.
    pub fn append_path(&mut self, key: impl Into<String>, path: impl Into<PathBuf>) -> &mut Self {
        self.edits.push(EnvEdit::Append {
            key: key.into(),
            path: path.into(),
        });
        self
    }

    /// Appends all edits from another overlay.
    pub fn extend(&mut self, other: &Self) -> &mut Self {
        self.edits.extend(other.edits.iter().cloned());
        self
    }

    /// Returns the edits in application order.
    #[must_use]
    pub fn edits(&self) -> &[EnvEdit] {
        &self.edits
    }

    /// Returns true when the overlay has no edits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Resolves the overlay against a base environment.
    ///
    /// Only variables touched by the overlay appear in the result.
    #[must_use]
    pub fn resolve(&self, base: &BaseEnv) -> BTreeMap<String, ResolvedVar> {
        let mut resolved: BTreeMap<String, ResolvedVar> = BTreeMap::new();
        for edit in &self.edits {
            match edit {
                EnvEdit::Set {
                    key,
                    value,
                } => {
                    resolved.insert(key.clone(), ResolvedVar::Set(OsString::from(value)));
                }
                EnvEdit::Unset {
                    key,
                } => {
                    resolved.insert(key.clone(), ResolvedVar::Removed);
                }
                EnvEdit::Prepend {
                    key,
                    path,
                } => {
                    let mut entries = current_entries(&resolved, base, key);
                    if !entries.contains(path) {
                        entries.insert(0, path.clone());
                    }
                    resolved.insert(key.clone(), join_entries(entries));
                }
                EnvEdit::Append {
                    key,
                    path,
                } => {
                    let mut entries = current_entries(&resolved, base, key);
                    if !entries.contains(path) {
                        entries.push(path.clone());
                    }
                    resolved.insert(key.clone(), join_entries(entries));
                }
            }
        }
        resolved
    }

    /// Applies the resolved overlay to a child command.
    ///
    /// The harness process environment is not touched.
    pub fn apply(&self, command: &mut Command, base: &BaseEnv) {
        for (key, value) in self.resolve(base) {
            match value {
                ResolvedVar::Set(value) => {
                    command.env(key, value);
                }
                ResolvedVar::Removed => {
                    command.env_remove(key);
                }
            }
        }
    }

    /// Renders the resolved overlay as `KEY=VALUE` lines (removals as `KEY=`
    /// preceded by `# unset`).
    #[must_use]
    pub fn render(&self, base: &BaseEnv) -> String {
        let mut out = String::new();
        for (key, value) in self.resolve(base) {
            match value {
                ResolvedVar::Set(value) => {
                    let _ = writeln!(out, "{key}={}", value.to_string_lossy());
                }
                ResolvedVar::Removed => {
                    let _ = writeln!(out, "# unset {key}");
                }
            }
        }
        out
    }
}

// ============================================================================
// SECTION: Platform Variables
// ============================================================================

/// Returns the variable holding the dynamic loader search path for `os`.
#[must_use]
pub const fn library_path_var(os: &Os) -> &'static str {
    match os {
        Os::Macos => "DYLD_LIBRARY_PATH",
        Os::Windows => "PATH",
        _ => "LD_LIBRARY_PATH",
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the current entries of a path-list variable, preferring earlier edits.
fn current_entries(
    resolved: &BTreeMap<String, ResolvedVar>,
    base: &BaseEnv,
    key: &str,
) -> Vec<PathBuf> {
    let current = match resolved.get(key) {
        Some(ResolvedVar::Set(value)) => Some(value.as_os_str()),
        Some(ResolvedVar::Removed) => None,
        None => base.get(key),
    };
    current.map_or_else(Vec::new, |value| {
        std::env::split_paths(value).filter(|entry| !entry.as_os_str().is_empty()).collect()
    })
}

/// Joins path entries with the platform separator.
///
/// Entries containing the separator cannot be represented; they are dropped
/// rather than corrupting the list.
fn join_entries(entries: Vec<PathBuf>) -> ResolvedVar {
    match std::env::join_paths(&entries) {
        Ok(joined) => ResolvedVar::Set(joined),
        Err(_) => {
            let valid: Vec<PathBuf> = entries
                .into_iter()
                .filter(|entry| std::env::join_paths([entry]).is_ok())
                .collect();
            ResolvedVar::Set(std::env::join_paths(valid).unwrap_or_default())
        }
    }
}
