// crates/pkgcheck-tools/src/local_repo.rs
// ============================================================================
// Module: Local Package Repository
// Description: Resolves package references from a directory of manifests.
// Purpose: Provide dependency resolution without a network package server.
// Dependencies: pkgcheck-core, serde, toml, tracing
// ============================================================================

//! ## Overview
//! Packages live at `<root>/<name>/<version>/[<user>/<channel>/]` and carry a
//! `pkgcheck-package.toml` manifest describing their headers, libraries,
//! executables, requirements, and supported platforms. Resolution walks
//! requirements depth-first and returns packages in dependency-first order.
//!
//! ## Invariants
//! - One reference per package name; differing requests are a conflict.
//! - Manifest directories stay inside the package directory.
//! - A package reached through any regular requirement path is `Requires`,
//!   otherwise it inherits `TestRequires` from its test-only ancestor.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use pkgcheck_core::Arch;
use pkgcheck_core::BuildSettings;
use pkgcheck_core::DependencyDeclaration;
use pkgcheck_core::DependencyResolver;
use pkgcheck_core::DependencyRole;
use pkgcheck_core::Os;
use pkgcheck_core::PackageRef;
use pkgcheck_core::ResolveError;
use pkgcheck_core::ResolvedGraph;
use pkgcheck_core::ResolvedPackage;
use serde::Deserialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Manifest file name inside each package directory.
pub const MANIFEST_FILE_NAME: &str = "pkgcheck-package.toml";
/// Maximum manifest size in bytes.
const MAX_MANIFEST_SIZE: usize = 256 * 1024;
/// Maximum requirement depth before resolution gives up.
const MAX_DEPTH: usize = 64;

// ============================================================================
// SECTION: Manifest
// ============================================================================

/// Package manifest as stored in the repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageManifest {
    /// Package name; must match the directory.
    pub name: String,
    /// Package version; must match the directory.
    pub version: String,
    /// Optional recipe revision.
    #[serde(default)]
    pub revision: Option<String>,
    /// Regular requirements of this package.
    #[serde(default)]
    pub requires: Vec<String>,
    /// C/C++ consumption information.
    #[serde(default)]
    pub cpp: CppInfo,
    /// Supported target platforms.
    #[serde(default)]
    pub compatibility: Compatibility,
}

/// Directories and libraries a consumer needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CppInfo {
    /// Header directories relative to the package directory.
    #[serde(default)]
    pub include_dirs: Vec<PathBuf>,
    /// Library directories relative to the package directory.
    #[serde(default)]
    pub lib_dirs: Vec<PathBuf>,
    /// Executable directories relative to the package directory.
    #[serde(default)]
    pub bin_dirs: Vec<PathBuf>,
    /// Libraries to link.
    #[serde(default)]
    pub libs: Vec<String>,
}

/// Platforms a package supports; empty lists accept anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Compatibility {
    /// Supported operating systems.
    #[serde(default)]
    pub os: Vec<String>,
    /// Supported architectures.
    #[serde(default)]
    pub arch: Vec<String>,
}

// ============================================================================
// SECTION: Repository
// ============================================================================

/// Package repository rooted at a local directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRepository {
    /// Repository root.
    root: PathBuf,
}

impl LocalRepository {
    /// Creates a repository rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    /// Returns the repository root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the directory holding a package.
    #[must_use]
    pub fn package_dir(&self, reference: &PackageRef) -> PathBuf {
        let mut dir = self.root.join(reference.name()).join(reference.version());
        if let (Some(user), Some(channel)) = (reference.user(), reference.channel()) {
            dir.push(user);
            dir.push(channel);
        }
        dir
    }

    /// Loads and checks the manifest for `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NotFound`] when the package is absent and
    /// [`ResolveError::Manifest`] when the manifest is unreadable, oversized,
    /// or disagrees with the reference.
    pub fn load_manifest(&self, reference: &PackageRef) -> Result<PackageManifest, ResolveError> {
        let path = self.package_dir(reference).join(MANIFEST_FILE_NAME);
        if !path.is_file() {
            return Err(ResolveError::NotFound {
                reference: reference.clone(),
            });
        }
        let bytes = fs::read(&path).map_err(|err| ResolveError::Io(err.to_string()))?;
        if bytes.len() > MAX_MANIFEST_SIZE {
            return Err(manifest_error(reference, "manifest exceeds size limit"));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| manifest_error(reference, "manifest must be utf-8"))?;
        let manifest: PackageManifest =
            toml::from_str(content).map_err(|err| manifest_error(reference, &err.to_string()))?;
        if manifest.name != reference.name() || manifest.version != reference.version() {
            return Err(manifest_error(
                reference,
                &format!("manifest declares {}/{}", manifest.name, manifest.version),
            ));
        }
        Ok(manifest)
    }

    /// Visits one requirement and its transitive requirements.
    fn visit(
        &self,
        reference: &PackageRef,
        role: DependencyRole,
        settings: &BuildSettings,
        walk: &mut Walk,
    ) -> Result<(), ResolveError> {
        if let Some(&index) = walk.selected.get(reference.name()) {
            return self.revisit(index, reference, role, settings, walk);
        }
        if walk.stack.iter().any(|name| name == reference.name()) || walk.stack.len() >= MAX_DEPTH {
            let mut chain = walk.stack.clone();
            chain.push(reference.name().to_string());
            return Err(ResolveError::Cycle(chain.join(" -> ")));
        }

        let manifest = self.load_manifest(reference)?;
        check_revision(reference, &manifest)?;
        check_compatibility(reference, &manifest, settings)?;
        let requires = parse_requires(reference, &manifest)?;

        walk.stack.push(reference.name().to_string());
        for requirement in &requires {
            self.visit(requirement, role, settings, walk)?;
        }
        walk.stack.pop();

        let package = self.resolved_package(reference, role, &manifest)?;
        tracing::debug!(package = %package.reference, role = role.as_str(), "package resolved");
        walk.selected.insert(reference.name().to_string(), walk.packages.len());
        walk.edges.insert(reference.name().to_string(), requires);
        walk.packages.push(package);
        Ok(())
    }

    /// Handles a package that was already selected: checks for conflicts and
    /// promotes test-only packages reached through a regular requirement.
    fn revisit(
        &self,
        index: usize,
        reference: &PackageRef,
        role: DependencyRole,
        settings: &BuildSettings,
        walk: &mut Walk,
    ) -> Result<(), ResolveError> {
        let Some(existing) = walk.packages.get_mut(index) else {
            return Err(ResolveError::Io("resolution index out of range".to_string()));
        };
        let same_recipe = existing.reference.without_revision() == reference.without_revision();
        let revision_clash = matches!(
            (existing.reference.revision(), reference.revision()),
            (Some(left), Some(right)) if left != right
        );
        if !same_recipe || revision_clash {
            return Err(ResolveError::Conflict {
                name: reference.name().to_string(),
                existing: existing.reference.clone(),
                requested: reference.clone(),
            });
        }
        if role.propagates() && !existing.role.propagates() {
            existing.role = role;
            let requires = walk.edges.get(reference.name()).cloned().unwrap_or_default();
            for requirement in &requires {
                self.visit(requirement, role, settings, walk)?;
            }
        }
        Ok(())
    }

    /// Builds the resolved view of a package from its manifest.
    fn resolved_package(
        &self,
        reference: &PackageRef,
        role: DependencyRole,
        manifest: &PackageManifest,
    ) -> Result<ResolvedPackage, ResolveError> {
        let root = self.package_dir(reference);
        let canonical = match &manifest.revision {
            Some(revision) => PackageRef::parse(&format!("{}#{revision}", reference.without_revision()))
                .map_err(|err| manifest_error(reference, &err.to_string()))?,
            None => reference.clone(),
        };
        Ok(ResolvedPackage {
            reference: canonical,
            role,
            include_dirs: package_dirs(reference, &root, &manifest.cpp.include_dirs)?,
            lib_dirs: package_dirs(reference, &root, &manifest.cpp.lib_dirs)?,
            bin_dirs: package_dirs(reference, &root, &manifest.cpp.bin_dirs)?,
            libs: manifest.cpp.libs.clone(),
            root,
        })
    }
}

impl DependencyResolver for LocalRepository {
    fn resolve(
        &self,
        declarations: &[DependencyDeclaration],
        settings: &BuildSettings,
    ) -> Result<ResolvedGraph, ResolveError> {
        let mut walk = Walk::default();
        for declaration in declarations {
            self.visit(&declaration.reference, declaration.role, settings, &mut walk)?;
        }
        Ok(ResolvedGraph {
            packages: walk.packages,
        })
    }
}

// ============================================================================
// SECTION: Walk State
// ============================================================================

/// Mutable state of one resolution walk.
#[derive(Debug, Default)]
struct Walk {
    /// Resolved packages in dependency-first order.
    packages: Vec<ResolvedPackage>,
    /// Index into `packages` by package name.
    selected: BTreeMap<String, usize>,
    /// Parsed requirements by package name.
    edges: BTreeMap<String, Vec<PackageRef>>,
    /// Names currently being visited.
    stack: Vec<String>,
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a manifest error for `reference`.
fn manifest_error(reference: &PackageRef, message: &str) -> ResolveError {
    ResolveError::Manifest {
        reference: reference.clone(),
        message: message.to_string(),
    }
}

/// Checks a pinned revision against the manifest revision.
fn check_revision(reference: &PackageRef, manifest: &PackageManifest) -> Result<(), ResolveError> {
    let Some(pinned) = reference.revision() else {
        return Ok(());
    };
    if manifest.revision.as_deref() == Some(pinned) {
        return Ok(());
    }
    Err(ResolveError::RevisionMismatch {
        reference: reference.clone(),
        available: manifest.revision.clone().unwrap_or_else(|| "none".to_string()),
    })
}

/// Checks that the package supports the target os and arch.
fn check_compatibility(
    reference: &PackageRef,
    manifest: &PackageManifest,
    settings: &BuildSettings,
) -> Result<(), ResolveError> {
    let compatibility = &manifest.compatibility;
    if !compatibility.os.is_empty() && !compatibility.os.iter().any(|os| Os::parse(os) == settings.os) {
        return Err(ResolveError::Incompatible {
            reference: reference.clone(),
            setting: "os",
            value: settings.os.to_string(),
        });
    }
    if !compatibility.arch.is_empty()
        && !compatibility.arch.iter().any(|arch| Arch::parse(arch) == settings.arch)
    {
        return Err(ResolveError::Incompatible {
            reference: reference.clone(),
            setting: "arch",
            value: settings.arch.to_string(),
        });
    }
    Ok(())
}

/// Parses the manifest's requirement strings.
fn parse_requires(
    reference: &PackageRef,
    manifest: &PackageManifest,
) -> Result<Vec<PackageRef>, ResolveError> {
    manifest
        .requires
        .iter()
        .map(|raw| {
            PackageRef::parse(raw).map_err(|err| manifest_error(reference, &err.to_string()))
        })
        .collect()
}

/// Joins manifest-relative directories onto the package directory.
fn package_dirs(
    reference: &PackageRef,
    root: &Path,
    dirs: &[PathBuf],
) -> Result<Vec<PathBuf>, ResolveError> {
    dirs.iter()
        .map(|dir| {
            let escapes = dir
                .components()
                .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
            if escapes {
                return Err(manifest_error(
                    reference,
                    &format!("directory {} must be relative to the package", dir.display()),
                ));
            }
            Ok(root.join(dir))
        })
        .collect()
}
