// crates/pkgcheck-core/src/core/reference.rs
// ============================================================================
// Module: Package References
// Description: Parsed package references and dependency declarations.
// Purpose: Give package identities a strongly typed, canonical wire form.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A package reference names one published artifact in a package repository
//! using the `name/version[@user/channel][#revision]` form. References are
//! parsed once at the boundary and rendered back in canonical form, so two
//! references compare equal exactly when they name the same artifact.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Minimum length of a package name.
const MIN_NAME_LENGTH: usize = 2;
/// Maximum length of a package name.
const MAX_NAME_LENGTH: usize = 101;
/// Maximum length of the version, user, channel, or revision segments.
const MAX_SEGMENT_LENGTH: usize = 128;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Package reference parse errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    /// Reference string was empty or whitespace.
    #[error("package reference must not be empty")]
    Empty,
    /// Reference did not contain a `name/version` pair.
    #[error("package reference '{0}' must have the form name/version")]
    MissingVersion(String),
    /// Package name violates naming rules.
    #[error("invalid package name '{0}'")]
    InvalidName(String),
    /// A version, user, channel, or revision segment is malformed.
    #[error("invalid {segment} '{value}' in package reference")]
    InvalidSegment {
        /// Segment label (`version`, `user`, `channel`, `revision`).
        segment: &'static str,
        /// Offending value.
        value: String,
    },
    /// `@user` was supplied without `/channel` (or vice versa).
    #[error("package reference '{0}' must specify both user and channel")]
    IncompleteUserChannel(String),
}

// ============================================================================
// SECTION: Package Reference
// ============================================================================

/// Canonical package reference.
///
/// # Invariants
/// - `name` is lowercase ASCII and starts with an alphanumeric character.
/// - `user` and `channel` are either both present or both absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageRef {
    /// Package name.
    name: String,
    /// Package version string (opaque, not semver-validated).
    version: String,
    /// Optional user/channel namespace.
    user_channel: Option<(String, String)>,
    /// Optional recipe revision pin.
    revision: Option<String>,
}

impl PackageRef {
    /// Parses a reference from its textual form.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError`] when the reference is malformed.
    pub fn parse(raw: &str) -> Result<Self, ReferenceError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ReferenceError::Empty);
        }
        let (body, revision) = match trimmed.split_once('#') {
            Some((body, revision)) => (body, Some(revision)),
            None => (trimmed, None),
        };
        let (name_version, user_channel) = match body.split_once('@') {
            Some((name_version, user_channel)) => (name_version, Some(user_channel)),
            None => (body, None),
        };
        let Some((name, version)) = name_version.split_once('/') else {
            return Err(ReferenceError::MissingVersion(trimmed.to_string()));
        };
        validate_name(name)?;
        validate_segment("version", version)?;
        let user_channel = match user_channel {
            Some(raw_uc) => {
                let Some((user, channel)) = raw_uc.split_once('/') else {
                    return Err(ReferenceError::IncompleteUserChannel(trimmed.to_string()));
                };
                validate_segment("user", user)?;
                validate_segment("channel", channel)?;
                Some((user.to_string(), channel.to_string()))
            }
            None => None,
        };
        if let Some(revision) = revision {
            validate_revision(revision)?;
        }
        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
            user_channel,
            revision: revision.map(str::to_string),
        })
    }

    /// Returns the package name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the package version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the user segment, when present.
    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.user_channel.as_ref().map(|(user, _)| user.as_str())
    }

    /// Returns the channel segment, when present.
    #[must_use]
    pub fn channel(&self) -> Option<&str> {
        self.user_channel.as_ref().map(|(_, channel)| channel.as_str())
    }

    /// Returns the pinned revision, when present.
    #[must_use]
    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    /// Returns a copy of this reference without its revision pin.
    #[must_use]
    pub fn without_revision(&self) -> Self {
        Self {
            revision: None,
            ..self.clone()
        }
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)?;
        if let Some((user, channel)) = &self.user_channel {
            write!(f, "@{user}/{channel}")?;
        }
        if let Some(revision) = &self.revision {
            write!(f, "#{revision}")?;
        }
        Ok(())
    }
}

impl FromStr for PackageRef {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for PackageRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PackageRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// SECTION: Dependency Declarations
// ============================================================================

/// How a declared dependency is consumed.
///
/// # Invariants
/// - Variants are stable for report labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyRole {
    /// Regular dependency, visible at build and run time and propagated.
    Requires,
    /// Test-only dependency; never propagated to consumers.
    TestRequires,
}

impl DependencyRole {
    /// Returns a stable label for the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requires => "requires",
            Self::TestRequires => "test_requires",
        }
    }

    /// Returns true when the role propagates to downstream consumers.
    #[must_use]
    pub const fn propagates(self) -> bool {
        matches!(self, Self::Requires)
    }
}

/// A package reference paired with its consumption role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyDeclaration {
    /// Referenced package.
    pub reference: PackageRef,
    /// Consumption role.
    pub role: DependencyRole,
}

impl DependencyDeclaration {
    /// Declares a regular dependency.
    #[must_use]
    pub const fn requires(reference: PackageRef) -> Self {
        Self {
            reference,
            role: DependencyRole::Requires,
        }
    }

    /// Declares a test-only dependency.
    #[must_use]
    pub const fn test_requires(reference: PackageRef) -> Self {
        Self {
            reference,
            role: DependencyRole::TestRequires,
        }
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates a package name.
fn validate_name(name: &str) -> Result<(), ReferenceError> {
    let len = name.len();
    let starts_alnum = name.chars().next().is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    let rest_valid = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.' | '+'));
    if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&len) || !starts_alnum || !rest_valid {
        return Err(ReferenceError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Validates a version, user, or channel segment.
///
/// Segments become cache path components, so dot-only values are rejected.
fn validate_segment(segment: &'static str, value: &str) -> Result<(), ReferenceError> {
    let invalid = value.is_empty()
        || value.len() > MAX_SEGMENT_LENGTH
        || value.chars().all(|c| c == '.')
        || value.chars().any(|c| c.is_whitespace() || matches!(c, '/' | '@' | '#' | '\\'));
    if invalid {
        return Err(ReferenceError::InvalidSegment {
            segment,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Validates a revision segment (alphanumeric only).
fn validate_revision(value: &str) -> Result<(), ReferenceError> {
    if value.is_empty()
        || value.len() > MAX_SEGMENT_LENGTH
        || !value.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(ReferenceError::InvalidSegment {
            segment: "revision",
            value: value.to_string(),
        });
    }
    Ok(())
}
