// This module implements instruction-set feature sets. A FeatureSet is a named baseline
// variant (for example "silvermont" or "cortex-a53") whose capability flags come from the
// per-ISA FeatureTable, plus an overlay of flags explicitly enabled or disabled by a feature
// string such as "sse4.1,-popcnt". Applying a feature string returns a new set; a rejected
// string leaves the input set untouched.
// `host_detected` builds the set from the target features the crate was compiled with.

//! Instruction-set feature sets.

use std::fmt;

use crate::core::error::{FeatureError, FeatureResult};

use super::{arm, arm64, riscv64, x86, InstructionSet};

/// Variant used when a feature string arrives before any variant.
pub const DEFAULT_VARIANT: &str = "default";

/// Static description of the features and variants of one ISA family.
#[derive(Debug)]
pub struct FeatureTable {
    /// Feature names and their flag bits, in display order.
    pub features: &'static [(&'static str, u32)],

    /// Known CPU variants and the flags they imply.
    pub variants: &'static [(&'static str, u32)],

    /// Unknown variants fall back to the default variant instead of failing.
    pub lenient_variants: bool,

    /// Flags enabled by the target features of the current build.
    pub build_flags: fn() -> u32,
}

impl FeatureTable {
    fn feature_bit(&self, name: &str) -> Option<u32> {
        self.features
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, bit)| *bit)
    }

    fn variant_flags(&self, name: &str) -> Option<u32> {
        self.variants
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, flags)| *flags)
    }
}

fn table_for(isa: InstructionSet) -> FeatureResult<&'static FeatureTable> {
    match isa {
        InstructionSet::X86 | InstructionSet::X86_64 => Ok(&x86::TABLE),
        InstructionSet::Arm | InstructionSet::Thumb2 => Ok(&arm::TABLE),
        InstructionSet::Arm64 => Ok(&arm64::TABLE),
        InstructionSet::Riscv64 => Ok(&riscv64::TABLE),
        InstructionSet::None => Err(FeatureError::UnsupportedIsa(isa)),
    }
}

/// Build-time target features only describe the ISA this crate was built for.
fn is_build_isa(isa: InstructionSet) -> bool {
    isa.jit_target() == InstructionSet::RUNTIME.jit_target()
}

/// Baseline variant plus an overlay of explicitly toggled features.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSet {
    isa: InstructionSet,
    variant: String,
    baseline: u32,
    enabled: u32,
    disabled: u32,
}

impl FeatureSet {
    /// Build the feature set implied by a CPU variant name.
    pub fn from_variant(isa: InstructionSet, variant: &str) -> FeatureResult<Self> {
        if variant.is_empty() {
            return Err(FeatureError::EmptyVariant);
        }
        let table = table_for(isa)?;
        let baseline = match table.variant_flags(variant) {
            Some(flags) => flags,
            None if table.lenient_variants => {
                log::warn!("Unexpected CPU variant for {isa} using defaults: {variant}");
                table.variant_flags(DEFAULT_VARIANT).unwrap_or(0)
            }
            None => {
                return Err(FeatureError::UnknownVariant {
                    isa,
                    variant: variant.to_string(),
                })
            }
        };
        Ok(Self {
            isa,
            variant: variant.to_string(),
            baseline,
            enabled: 0,
            disabled: 0,
        })
    }

    /// Feature set of the machine this crate was built for.
    ///
    /// For an ISA other than the build ISA nothing can be detected and the
    /// default variant is used.
    pub fn host_detected(isa: InstructionSet) -> Self {
        let baseline = match table_for(isa) {
            Ok(table) if is_build_isa(isa) => (table.build_flags)(),
            Ok(table) => table.variant_flags(DEFAULT_VARIANT).unwrap_or(0),
            Err(_) => 0,
        };
        Self {
            isa,
            variant: DEFAULT_VARIANT.to_string(),
            baseline,
            enabled: 0,
            disabled: 0,
        }
    }

    /// Return a copy with the comma separated feature list applied on top.
    ///
    /// `default` alone leaves the set unchanged, `runtime` alone overlays the
    /// build-host flags when this set is for the build ISA and is a no-op
    /// otherwise. Entries are `name`, `+name` or `-name`. The whole
    /// string is validated before anything is applied.
    pub fn add_features_from_string(&self, features: &str) -> FeatureResult<Self> {
        let table = table_for(self.isa)?;
        let entries: Vec<&str> = features.split(',').map(str::trim).collect();

        if entries.iter().any(|e| *e == "default" || *e == "runtime") {
            if entries.len() != 1 {
                return Err(FeatureError::DefaultWithOthers);
            }
            let mut result = self.clone();
            if entries[0] == "runtime" && is_build_isa(self.isa) {
                let flags = (table.build_flags)();
                result.enabled |= flags;
                result.disabled &= !flags;
            }
            return Ok(result);
        }

        let mut result = self.clone();
        for entry in entries {
            let (enable, name) = match entry.strip_prefix('-') {
                Some(name) => (false, name),
                None => (true, entry.strip_prefix('+').unwrap_or(entry)),
            };
            if name.is_empty() {
                return Err(FeatureError::EmptyFeature);
            }
            let bit = table
                .feature_bit(name)
                .ok_or_else(|| FeatureError::UnknownFeature {
                    isa: self.isa,
                    feature: name.to_string(),
                })?;
            if enable {
                result.enabled |= bit;
                result.disabled &= !bit;
            } else {
                result.disabled |= bit;
                result.enabled &= !bit;
            }
        }
        Ok(result)
    }

    pub fn isa(&self) -> InstructionSet {
        self.isa
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// Effective flag bits after applying the overlay.
    pub fn flags(&self) -> u32 {
        (self.baseline | self.enabled) & !self.disabled
    }

    /// Whether any feature was toggled explicitly.
    pub fn has_overlay(&self) -> bool {
        self.enabled != 0 || self.disabled != 0
    }

    pub fn has_feature(&self, name: &str) -> bool {
        table_for(self.isa)
            .ok()
            .and_then(|table| table.feature_bit(name))
            .is_some_and(|bit| self.flags() & bit != 0)
    }

    /// Every table feature, prefixed with `-` when absent.
    pub fn feature_string(&self) -> String {
        let flags = self.flags();
        let Ok(table) = table_for(self.isa) else {
            return "none".to_string();
        };
        if table.features.is_empty() {
            return "none".to_string();
        }
        table
            .features
            .iter()
            .map(|(name, bit)| {
                if flags & bit != 0 {
                    name.to_string()
                } else {
                    format!("-{name}")
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.variant, self.feature_string())
    }
}
