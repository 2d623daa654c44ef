// crates/pkgcheck-core/tests/layout.rs
// ============================================================================
// Module: Build Layout Tests
// Description: Directory computation for single- and multi-config builds.
// Purpose: Ensure layouts are deterministic and never collide across settings.
// Dependencies: pkgcheck-core, proptest
// ============================================================================
//! ## Overview
//! Layout computation is a pure function; these tests pin the directory shape.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::path::PathBuf;

use pkgcheck_core::Arch;
use pkgcheck_core::BuildLayout;
use pkgcheck_core::BuildSettings;
use pkgcheck_core::BuildType;
use pkgcheck_core::HostPlatform;
use pkgcheck_core::LayoutError;
use pkgcheck_core::LayoutOptions;
use pkgcheck_core::Os;
use proptest::prelude::*;

fn settings(os: Os, arch: Arch, build_type: BuildType) -> BuildSettings {
    let mut settings = BuildSettings::native(&HostPlatform {
        os,
        arch,
    });
    settings.build_type = build_type;
    settings
}

fn linux_release() -> BuildSettings {
    settings(Os::Linux, Arch::X86_64, BuildType::Release)
}

#[test]
fn single_config_layout_nests_build_type() {
    let options = LayoutOptions::new("/src/test_package");
    let layout = BuildLayout::compute(&options, &linux_release()).expect("layout");
    let build_dir = PathBuf::from("/src/test_package/build/Release");
    assert_eq!(layout.source_dir, PathBuf::from("/src/test_package"));
    assert_eq!(layout.build_dir, build_dir);
    assert_eq!(layout.generators_dir, build_dir.join("generators"));
    assert_eq!(layout.bindirs, vec![build_dir]);
}

#[test]
fn multi_config_layout_places_binaries_per_build_type() {
    let mut options = LayoutOptions::new("/src/test_package");
    options.multi_config = true;
    let layout = BuildLayout::compute(&options, &settings(Os::Windows, Arch::X86_64, BuildType::Debug))
        .expect("layout");
    assert_eq!(layout.build_dir, PathBuf::from("/src/test_package/build"));
    assert_eq!(layout.generators_dir, PathBuf::from("/src/test_package/build/generators"));
    assert_eq!(layout.primary_bindir(), PathBuf::from("/src/test_package/build/Debug"));
}

#[test]
fn build_folder_vars_separate_cross_builds() {
    let mut options = LayoutOptions::new("/src/test_package");
    options.output_root = PathBuf::from("/out");
    options.build_folder_vars = vec!["settings.os".to_string(), "settings.arch".to_string()];
    let native = BuildLayout::compute(&options, &linux_release()).expect("native");
    let cross = BuildLayout::compute(
        &options,
        &settings(Os::Baremetal, Arch::parse("cortex-m4f"), BuildType::Release),
    )
    .expect("cross");
    assert_eq!(native.build_dir, PathBuf::from("/out/build/linux-x86_64/Release"));
    assert_eq!(cross.build_dir, PathBuf::from("/out/build/baremetal-cortex-m4f/Release"));
    assert_eq!(native.source_dir, PathBuf::from("/src/test_package"));
}

#[test]
fn empty_variable_values_are_skipped() {
    let mut options = LayoutOptions::new("/src");
    options.build_folder_vars = vec!["settings.compiler.version".to_string()];
    let layout = BuildLayout::compute(&options, &linux_release()).expect("layout");
    assert_eq!(layout.build_dir, PathBuf::from("/src/build/Release"));
}

#[test]
fn unknown_build_folder_variable_is_rejected() {
    let mut options = LayoutOptions::new("/src");
    options.build_folder_vars = vec!["options.shared".to_string()];
    let err = BuildLayout::compute(&options, &linux_release()).expect_err("unknown var");
    assert_eq!(err, LayoutError::UnknownVariable("options.shared".to_string()));
}

#[test]
fn folder_values_cannot_leave_output_root() {
    let mut options = LayoutOptions::new("/work/project");
    options.build_folder_vars = vec!["settings.compiler.version".to_string()];
    for version in ["../../../../tmp/evil", "..", ".", "12\\..\\evil"] {
        let mut target = linux_release();
        target.apply(&format!("compiler.version={version}")).expect("setting");
        let err = BuildLayout::compute(&options, &target).expect_err("unsafe value");
        assert_eq!(
            err,
            LayoutError::UnsafeFolderValue {
                variable: "settings.compiler.version".to_string(),
                value: version.to_string(),
            }
        );
    }
}

#[test]
fn dotted_folder_values_stay_inside_output_root() {
    let mut options = LayoutOptions::new("/work/project");
    options.build_folder_vars =
        vec!["settings.compiler".to_string(), "settings.compiler.version".to_string()];
    let mut target = linux_release();
    target.apply_all(["compiler=gcc", "compiler.version=13.2"]).expect("settings");
    let layout = BuildLayout::compute(&options, &target).expect("layout");
    assert_eq!(layout.build_dir, PathBuf::from("/work/project/build/gcc-13.2/Release"));
    assert!(layout.generators_dir.starts_with("/work/project/build"));
}

#[test]
fn binary_path_appends_executable_suffix() {
    let options = LayoutOptions::new("/src");
    let windows = settings(Os::Windows, Arch::X86_64, BuildType::Release);
    let layout = BuildLayout::compute(&options, &windows).expect("layout");
    let path = layout.binary_path("unit_test", &windows).expect("binary");
    assert_eq!(path, PathBuf::from("/src/build/Release/unit_test.exe"));
    let linux = BuildLayout::compute(&options, &linux_release()).expect("layout");
    let path = linux.binary_path("unit_test", &linux_release()).expect("binary");
    assert_eq!(path, PathBuf::from("/src/build/Release/unit_test"));
}

#[test]
fn binary_name_must_be_a_plain_file_name() {
    let layout = BuildLayout::compute(&LayoutOptions::new("/src"), &linux_release()).expect("layout");
    for name in ["", " ", "..", "bin/unit_test", "..\\unit_test"] {
        assert!(
            matches!(
                layout.binary_path(name, &linux_release()),
                Err(LayoutError::InvalidBinaryName(_))
            ),
            "expected rejection for {name:?}"
        );
    }
}

fn build_type_strategy() -> impl Strategy<Value = BuildType> {
    prop_oneof![
        Just(BuildType::Debug),
        Just(BuildType::Release),
        Just(BuildType::RelWithDebInfo),
        Just(BuildType::MinSizeRel),
    ]
}

proptest! {
    #[test]
    fn layout_is_deterministic_and_contains_generators(
        multi_config in any::<bool>(),
        build_type in build_type_strategy(),
    ) {
        let mut options = LayoutOptions::new("/src");
        options.multi_config = multi_config;
        let target = settings(Os::Linux, Arch::X86_64, build_type);
        let first = BuildLayout::compute(&options, &target).expect("layout");
        let second = BuildLayout::compute(&options, &target).expect("layout");
        prop_assert_eq!(&first, &second);
        prop_assert!(first.generators_dir.starts_with(&first.build_dir));
        prop_assert!(!first.bindirs.is_empty());
        prop_assert!(first.primary_bindir().ends_with(build_type.as_str()));
    }

    #[test]
    fn distinct_build_types_never_share_bindirs(
        multi_config in any::<bool>(),
        left in build_type_strategy(),
        right in build_type_strategy(),
    ) {
        prop_assume!(left != right);
        let mut options = LayoutOptions::new("/src");
        options.multi_config = multi_config;
        let a = BuildLayout::compute(&options, &settings(Os::Linux, Arch::X86_64, left)).expect("layout");
        let b = BuildLayout::compute(&options, &settings(Os::Linux, Arch::X86_64, right)).expect("layout");
        prop_assert_ne!(a.primary_bindir(), b.primary_bindir());
    }
}
