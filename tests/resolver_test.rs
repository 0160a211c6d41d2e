//! Configuration resolution against a live host runtime.
//!
//! These tests drive option resolution through the compiler facade and the
//! boundary calls, the way a host runtime would.

use std::sync::Arc;

use jit_driver::isa::features::DEFAULT_VARIANT;
use jit_driver::jit::{jit_load, jit_unload, jit_update_options, JitCompiler, StandaloneRuntime};
use jit_driver::options::CompilerFilter;
use jit_driver::x64::StubBackend;
use jit_driver::{FeatureSet, InstructionSet};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn compiler_for(runtime: &Arc<StandaloneRuntime>) -> JitCompiler {
    JitCompiler::try_new(runtime.clone(), Box::new(StubBackend::new())).unwrap()
}

#[test]
fn test_empty_tokens_on_x86_64() {
    init_logger();
    let runtime = Arc::new(
        StandaloneRuntime::for_isa(InstructionSet::X86_64)
            .with_debuggable(true)
            .with_image_location("/system/framework/boot.art"),
    );
    let compiler = compiler_for(&runtime);
    let options = compiler.options();

    assert_eq!(options.instruction_set(), InstructionSet::X86_64);
    assert!(options.is_debuggable());
    assert!(!options.compile_pic);
    assert_eq!(
        options.instruction_set_features(),
        Some(&FeatureSet::host_detected(InstructionSet::X86_64))
    );
    assert_eq!(options.inline_max_code_units, None);
    assert!(!options.compiling_with_core_image);
}

#[test]
fn test_silvermont_variant_on_x86() {
    init_logger();
    let runtime = Arc::new(
        StandaloneRuntime::for_isa(InstructionSet::X86)
            .with_options(["--instruction-set-variant=silvermont"]),
    );
    let compiler = compiler_for(&runtime);
    let features = compiler.options().instruction_set_features().unwrap();

    assert_eq!(features.variant(), "silvermont");
    assert!(!features.has_overlay());
    assert_eq!(
        features,
        &FeatureSet::from_variant(InstructionSet::X86, "silvermont").unwrap()
    );
}

#[test]
fn test_features_without_variant_overlay_default() {
    init_logger();
    let runtime = Arc::new(
        StandaloneRuntime::for_isa(InstructionSet::Arm64)
            .with_options(["--instruction-set-features=lse,-a53"]),
    );
    let compiler = compiler_for(&runtime);
    let features = compiler.options().instruction_set_features().unwrap();

    let expected = FeatureSet::from_variant(InstructionSet::Arm64, DEFAULT_VARIANT)
        .unwrap()
        .add_features_from_string("lse,-a53")
        .unwrap();
    assert_eq!(features, &expected);
}

#[test]
fn test_variant_then_features() {
    init_logger();
    let runtime = Arc::new(StandaloneRuntime::for_isa(InstructionSet::X86_64).with_options([
        "--instruction-set-variant=sandybridge",
        "--instruction-set-features=-avx",
    ]));
    let compiler = compiler_for(&runtime);
    let features = compiler.options().instruction_set_features().unwrap();

    assert_eq!(features.variant(), "sandybridge");
    assert!(!features.has_feature("avx"));
    assert!(features.has_feature("sse4.2"));
}

#[test]
fn test_malformed_variant_then_valid_features() {
    init_logger();
    let runtime = Arc::new(StandaloneRuntime::for_isa(InstructionSet::Arm64).with_options([
        "--instruction-set-variant=cortex-z99",
        "--instruction-set-features=crc",
    ]));
    let compiler = compiler_for(&runtime);
    let features = compiler.options().instruction_set_features().unwrap();

    assert_eq!(features.variant(), DEFAULT_VARIANT);
    assert!(features.has_feature("crc"));
}

#[test]
fn test_arm_host_jits_thumb2() {
    init_logger();
    let runtime = Arc::new(
        StandaloneRuntime::for_isa(InstructionSet::Arm)
            .with_options(["--instruction-set-variant=cortex-a15"]),
    );
    let compiler = compiler_for(&runtime);

    assert_eq!(compiler.instruction_set(), InstructionSet::Thumb2);
    let features = compiler.options().instruction_set_features().unwrap();
    assert!(features.has_feature("div"));
}

#[test]
fn test_pic_is_always_off() {
    init_logger();
    let runtime = Arc::new(
        StandaloneRuntime::for_isa(InstructionSet::X86_64).with_options(["--compile-pic"]),
    );
    let compiler = compiler_for(&runtime);
    assert!(!compiler.options().compile_pic);
}

#[test]
fn test_debuggable_tracks_live_host_state() {
    init_logger();
    let runtime = Arc::new(StandaloneRuntime::for_isa(InstructionSet::X86_64));
    let mut compiler = compiler_for(&runtime);
    assert!(!compiler.options().is_debuggable());

    runtime.set_debuggable(true);
    compiler.update_config();
    assert!(compiler.options().is_debuggable());

    // An explicit token wins over the host state.
    runtime.set_options(["--no-debuggable"]);
    compiler.update_config();
    assert!(!compiler.options().is_debuggable());
}

#[test]
fn test_core_image_detection() {
    init_logger();
    let runtime = Arc::new(
        StandaloneRuntime::for_isa(InstructionSet::X86_64)
            .with_image_location("/data/art-test/core-optimizing.art"),
    );
    assert!(compiler_for(&runtime).options().compiling_with_core_image);
}

#[test]
fn test_unrecognized_tokens_are_tolerated() {
    init_logger();
    let runtime = Arc::new(
        StandaloneRuntime::for_isa(InstructionSet::X86_64)
            .with_options(["--no-such-option", "--inline-max-code-units=9"]),
    );
    assert_eq!(compiler_for(&runtime).options().inline_max_code_units, Some(9));
}

#[test]
fn test_flags_with_values_and_extra_filters_are_tolerated() {
    init_logger();
    let runtime = Arc::new(StandaloneRuntime::for_isa(InstructionSet::X86_64).with_options([
        "--debuggable=yes",
        "--generate-debug-info=true",
        "--compiler-filter=extract",
    ]));
    let compiler = compiler_for(&runtime);
    assert!(!compiler.options().debuggable);
    assert!(!compiler.generate_debug_info());
    assert_eq!(compiler.options().compiler_filter, CompilerFilter::Extract);

    runtime.set_options(["--compiler-filter=assume-verified"]);
    let compiler = compiler_for(&runtime);
    assert_eq!(compiler.options().compiler_filter, CompilerFilter::AssumeVerified);
}

#[test]
fn test_repeated_updates_keep_only_latest() {
    init_logger();
    let runtime = Arc::new(
        StandaloneRuntime::for_isa(InstructionSet::X86_64)
            .with_options(["--inline-max-code-units=10", "--dump-stats"]),
    );
    let mut jit = jit_load(runtime.clone(), Box::new(StubBackend::new()));
    assert_eq!(jit.options().inline_max_code_units, Some(10));

    runtime.set_options(["--inline-max-code-units=20"]);
    jit_update_options(&mut jit);
    assert_eq!(jit.options().inline_max_code_units, Some(20));
    assert!(!jit.options().dump_stats);

    runtime.set_options(Vec::<String>::new());
    jit_update_options(&mut jit);
    assert_eq!(jit.options().inline_max_code_units, None);

    jit_unload(jit);
}
