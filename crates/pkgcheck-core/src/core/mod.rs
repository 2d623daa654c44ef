// crates/pkgcheck-core/src/core/mod.rs
// ============================================================================
// Module: pkgcheck Core Types
// Description: Domain types for package references, settings, and layouts.
// Purpose: Group the value types shared by the interfaces and the runtime.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Core types are plain values: they are computed from explicit inputs and
//! never reach for process state after construction.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod capability;
pub mod context;
pub mod env;
pub mod graph;
pub mod layout;
pub mod reference;
pub mod settings;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use capability::COMPATIBILITY_RULES;
pub use capability::CompatibilityRule;
pub use capability::ExecutionCapability;
pub use capability::ExecutionOverrides;
pub use capability::SkipReason;
pub use capability::can_execute;
pub use context::ExecutionContext;
pub use env::BaseEnv;
pub use env::EnvEdit;
pub use env::EnvOverlay;
pub use env::ResolvedVar;
pub use env::library_path_var;
pub use graph::ResolvedGraph;
pub use graph::ResolvedPackage;
pub use layout::BuildLayout;
pub use layout::LayoutError;
pub use layout::LayoutOptions;
pub use layout::SUPPORTED_LAYOUT_VARS;
pub use layout::validate_binary_name;
pub use reference::DependencyDeclaration;
pub use reference::DependencyRole;
pub use reference::PackageRef;
pub use reference::ReferenceError;
pub use settings::Arch;
pub use settings::BuildSettings;
pub use settings::BuildType;
pub use settings::Compiler;
pub use settings::HostPlatform;
pub use settings::Os;
pub use settings::SettingsError;
