// This module resolves the host's compiler option tokens into the CompilerOptions used for
// JIT compiles. Resolution always starts from fresh defaults with the inline budget unset,
// runs the structured parser, forces non-PIC code, takes the debuggable flag from the host's
// live state unless a token set it, and checks the configured instruction set against the
// host ISA (32-bit ARM hosts JIT to Thumb2). The feature set is built by a second scan over
// the same tokens: a variant token replaces the baseline, a features token overlays onto the
// current baseline (or "default" when none was seen yet), and a malformed token only drops
// its own contribution with a warning. Without any accepted token the build host's detected
// features are used. The finished options replace the caller's in one assignment, so a
// failed parse never leaves a half-applied configuration behind.

//! JIT configuration resolution.

use crate::core::error::ConfigResult;
use crate::isa::features::DEFAULT_VARIANT;
use crate::isa::{FeatureSet, InstructionSet};
use crate::options::parser::{INSTRUCTION_SET_FEATURES_PREFIX, INSTRUCTION_SET_VARIANT_PREFIX};
use crate::options::{CompilerOptions, OptionParser, UNSET_INLINE_MAX_CODE_UNITS};

use super::runtime::JitRuntime;

/// Whether `location` names a core (test) boot image.
///
/// Matches `.../core.art` and `.../core-<suffix>.art`.
pub fn is_core_image_filename(location: &str) -> bool {
    if location.ends_with("core.art") {
        return true;
    }
    if !location.ends_with(".art") {
        return false;
    }
    let basename = location.rsplit('/').next().unwrap_or(location);
    basename.starts_with("core-")
}

/// Build the feature set from variant and features tokens.
///
/// Each token is applied on top of the last accepted state; a failing token
/// is logged and skipped.
pub fn resolve_features<S: AsRef<str>>(isa: InstructionSet, tokens: &[S]) -> FeatureSet {
    let mut features: Option<FeatureSet> = None;
    for token in tokens {
        let token = token.as_ref();
        if let Some(variant) = token.strip_prefix(INSTRUCTION_SET_VARIANT_PREFIX) {
            log::debug!("JIT instruction set variant {}", variant);
            match FeatureSet::from_variant(isa, variant) {
                Ok(set) => features = Some(set),
                Err(e) => log::warn!("Error parsing {} message={}", token, e),
            }
        } else if let Some(list) = token.strip_prefix(INSTRUCTION_SET_FEATURES_PREFIX) {
            log::debug!("JIT instruction set features {}", list);
            let base = match &features {
                Some(set) => Ok(set.clone()),
                None => FeatureSet::from_variant(isa, DEFAULT_VARIANT),
            };
            match base.and_then(|set| set.add_features_from_string(list)) {
                Ok(set) => features = Some(set),
                Err(e) => log::warn!("Error parsing {} message={}", token, e),
            }
        }
    }
    features.unwrap_or_else(|| FeatureSet::host_detected(isa))
}

/// Resolves compiler options against a host runtime.
pub struct ConfigResolver<'a> {
    runtime: &'a dyn JitRuntime,
    ignore_unrecognized: bool,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(runtime: &'a dyn JitRuntime) -> Self {
        Self {
            runtime,
            ignore_unrecognized: true,
        }
    }

    pub fn ignore_unrecognized(mut self, ignore: bool) -> Self {
        self.ignore_unrecognized = ignore;
        self
    }

    /// Resolve the host's current tokens into `options`.
    ///
    /// On error `options` is left as it was.
    pub fn resolve(&self, options: &mut CompilerOptions) -> ConfigResult<()> {
        let host_isa = self.runtime.instruction_set();
        let tokens = self.runtime.compiler_options();
        for token in &tokens {
            log::debug!("JIT compiler option {}", token);
        }

        let mut resolved = CompilerOptions::new(host_isa);
        resolved.set_inline_max_code_units(UNSET_INLINE_MAX_CODE_UNITS);
        let outcome = OptionParser::new(self.ignore_unrecognized).parse(&tokens, &mut resolved)?;

        resolved.set_non_pic();
        if !outcome.debuggable_set {
            resolved.debuggable = self.runtime.is_debuggable();
        }

        debug_assert!(
            host_isa.accepts_jit_target(resolved.instruction_set()),
            "JIT instruction set {} does not match host {}",
            resolved.instruction_set(),
            host_isa
        );

        resolved.instruction_set_features =
            Some(resolve_features(resolved.instruction_set(), &tokens));
        resolved.compiling_with_core_image = self
            .runtime
            .image_location()
            .is_some_and(|location| is_core_image_filename(&location));

        log::debug!("{}", resolved);
        *options = resolved;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ConfigError;
    use crate::jit::runtime::StandaloneRuntime;

    #[test]
    fn test_core_image_names() {
        assert!(is_core_image_filename("/system/framework/core.art"));
        assert!(is_core_image_filename("core.art"));
        assert!(is_core_image_filename("/data/core-optimizing.art"));
        assert!(!is_core_image_filename("/system/framework/boot.art"));
        assert!(!is_core_image_filename("/data/core-optimizing.oat"));
        assert!(!is_core_image_filename("/core-dir/boot.art"));
        // `ends_with("core.art")` also matches a longer basename.
        assert!(is_core_image_filename("/data/hardcore.art"));
    }

    #[test]
    fn test_no_tokens_uses_host_detected() {
        let tokens: [&str; 0] = [];
        let fs = resolve_features(InstructionSet::X86_64, &tokens);
        assert_eq!(fs, FeatureSet::host_detected(InstructionSet::X86_64));
    }

    #[test]
    fn test_features_without_variant_use_default() {
        let fs = resolve_features(
            InstructionSet::X86_64,
            &["--instruction-set-features=avx"],
        );
        assert_eq!(fs.variant(), DEFAULT_VARIANT);
        assert!(fs.has_feature("avx"));
    }

    #[test]
    fn test_variant_then_features() {
        let fs = resolve_features(
            InstructionSet::X86,
            &[
                "--instruction-set-variant=silvermont",
                "--instruction-set-features=-popcnt",
            ],
        );
        assert_eq!(fs.variant(), "silvermont");
        assert!(!fs.has_feature("popcnt"));
        assert!(fs.has_feature("sse4.2"));
    }

    #[test]
    fn test_bad_variant_then_features_salvages() {
        let fs = resolve_features(
            InstructionSet::Arm64,
            &[
                "--instruction-set-variant=cortex-z99",
                "--instruction-set-features=lse",
            ],
        );
        assert_eq!(fs.variant(), DEFAULT_VARIANT);
        assert!(fs.has_feature("lse"));
    }

    #[test]
    fn test_bad_features_keep_earlier_tokens() {
        let fs = resolve_features(
            InstructionSet::Arm64,
            &[
                "--instruction-set-variant=cortex-a53",
                "--instruction-set-features=crc",
                "--instruction-set-features=warp-drive",
            ],
        );
        assert_eq!(fs.variant(), "cortex-a53");
        assert!(fs.has_feature("crc"));
    }

    #[test]
    fn test_only_bad_tokens_fall_back_to_host() {
        let fs = resolve_features(
            InstructionSet::Arm64,
            &["--instruction-set-variant=cortex-z99"],
        );
        assert_eq!(fs, FeatureSet::host_detected(InstructionSet::Arm64));
    }

    #[test]
    fn test_strict_resolution_rejects_unknown_and_keeps_options() {
        let runtime = StandaloneRuntime::for_isa(InstructionSet::X86_64)
            .with_options(["--inline-max-code-units=4", "--debuggable=yes"]);
        let mut options = CompilerOptions::new(InstructionSet::X86_64);
        let before = options.clone();

        let err = ConfigResolver::new(&runtime)
            .ignore_unrecognized(false)
            .resolve(&mut options)
            .unwrap_err();
        assert_eq!(err, ConfigError::UnrecognizedOption("--debuggable=yes".to_string()));
        assert_eq!(options, before);

        ConfigResolver::new(&runtime).resolve(&mut options).unwrap();
        assert_eq!(options.inline_max_code_units, Some(4));
        assert!(!options.debuggable);
    }
}
