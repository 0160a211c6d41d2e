//! Compiler configuration.
//!
//! [`CompilerOptions`] is the resolved configuration handed to the backend on
//! every compile. It is filled in by the structured token parser in
//! [`parser`] and finished by the JIT configuration resolver.

pub mod parser;

use std::fmt;
use std::str::FromStr;

use crate::core::error::ConfigError;
use crate::isa::{FeatureSet, InstructionSet};

pub use parser::{OptionParser, ParseOutcome};

/// Inline budget value meaning "no explicit limit".
pub const UNSET_INLINE_MAX_CODE_UNITS: Option<usize> = None;

pub const DEFAULT_HUGE_METHOD_THRESHOLD: usize = 10_000;
pub const DEFAULT_LARGE_METHOD_THRESHOLD: usize = 600;
pub const DEFAULT_SMALL_METHOD_THRESHOLD: usize = 60;
pub const DEFAULT_TINY_METHOD_THRESHOLD: usize = 20;

/// How aggressively methods are compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilerFilter {
    AssumeVerified,
    Extract,
    Verify,
    Quicken,
    SpaceProfile,
    Space,
    SpeedProfile,
    Speed,
    EverythingProfile,
    Everything,
}

impl CompilerFilter {
    pub fn name(self) -> &'static str {
        match self {
            CompilerFilter::AssumeVerified => "assume-verified",
            CompilerFilter::Extract => "extract",
            CompilerFilter::Verify => "verify",
            CompilerFilter::Quicken => "quicken",
            CompilerFilter::SpaceProfile => "space-profile",
            CompilerFilter::Space => "space",
            CompilerFilter::SpeedProfile => "speed-profile",
            CompilerFilter::Speed => "speed",
            CompilerFilter::EverythingProfile => "everything-profile",
            CompilerFilter::Everything => "everything",
        }
    }
}

impl fmt::Display for CompilerFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CompilerFilter {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assume-verified" => Ok(CompilerFilter::AssumeVerified),
            "extract" => Ok(CompilerFilter::Extract),
            "verify" => Ok(CompilerFilter::Verify),
            "quicken" => Ok(CompilerFilter::Quicken),
            "space-profile" => Ok(CompilerFilter::SpaceProfile),
            "space" => Ok(CompilerFilter::Space),
            "speed-profile" => Ok(CompilerFilter::SpeedProfile),
            "speed" => Ok(CompilerFilter::Speed),
            "everything-profile" => Ok(CompilerFilter::EverythingProfile),
            "everything" => Ok(CompilerFilter::Everything),
            _ => Err(ConfigError::UnknownCompilerFilter(s.to_string())),
        }
    }
}

/// Resolved compiler configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    pub compiler_filter: CompilerFilter,
    pub huge_method_threshold: usize,
    pub large_method_threshold: usize,
    pub small_method_threshold: usize,
    pub tiny_method_threshold: usize,
    /// `None` means unset.
    pub inline_max_code_units: Option<usize>,
    pub instruction_set: InstructionSet,
    pub instruction_set_features: Option<FeatureSet>,
    pub debuggable: bool,
    pub generate_debug_info: bool,
    pub generate_mini_debug_info: bool,
    /// Always false once resolved for the JIT.
    pub compile_pic: bool,
    pub compiling_with_core_image: bool,
    pub dump_timings: bool,
    pub dump_stats: bool,
}

impl CompilerOptions {
    /// Defaults for a JIT running on a host with the given ISA.
    pub fn new(host_isa: InstructionSet) -> Self {
        Self {
            compiler_filter: CompilerFilter::Speed,
            huge_method_threshold: DEFAULT_HUGE_METHOD_THRESHOLD,
            large_method_threshold: DEFAULT_LARGE_METHOD_THRESHOLD,
            small_method_threshold: DEFAULT_SMALL_METHOD_THRESHOLD,
            tiny_method_threshold: DEFAULT_TINY_METHOD_THRESHOLD,
            inline_max_code_units: UNSET_INLINE_MAX_CODE_UNITS,
            instruction_set: host_isa.jit_target(),
            instruction_set_features: None,
            debuggable: false,
            generate_debug_info: false,
            generate_mini_debug_info: false,
            compile_pic: false,
            compiling_with_core_image: false,
            dump_timings: false,
            dump_stats: false,
        }
    }

    pub fn set_inline_max_code_units(&mut self, units: Option<usize>) {
        self.inline_max_code_units = units;
    }

    pub fn set_non_pic(&mut self) {
        self.compile_pic = false;
    }

    pub fn instruction_set(&self) -> InstructionSet {
        self.instruction_set
    }

    pub fn instruction_set_features(&self) -> Option<&FeatureSet> {
        self.instruction_set_features.as_ref()
    }

    pub fn is_debuggable(&self) -> bool {
        self.debuggable
    }

    pub fn generate_debug_info(&self) -> bool {
        self.generate_debug_info
    }
}

impl fmt::Display for CompilerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Compiler Options:")?;
        writeln!(f, "  Instruction set: {}", self.instruction_set)?;
        match &self.instruction_set_features {
            Some(features) => writeln!(f, "  Features: {}", features)?,
            None => writeln!(f, "  Features: <unresolved>")?,
        }
        writeln!(f, "  Compiler filter: {}", self.compiler_filter)?;
        match self.inline_max_code_units {
            Some(units) => writeln!(f, "  Inline max code units: {}", units)?,
            None => writeln!(f, "  Inline max code units: unset")?,
        }
        writeln!(f, "  Debuggable: {}", self.debuggable)?;
        writeln!(f, "  PIC: {}", self.compile_pic)?;
        writeln!(f, "  Generate debug info: {}", self.generate_debug_info)?;
        writeln!(f, "  Generate mini debug info: {}", self.generate_mini_debug_info)?;
        writeln!(f, "  Core image: {}", self.compiling_with_core_image)
    }
}
