//! Instruction set identification.
//!
//! [`InstructionSet`] names the processor families the JIT can target.
//! [`InstructionSet::RUNTIME`] is the ISA this crate was built for, which is
//! also the ISA of any host runtime embedding it. Per-ISA feature tables live
//! in the submodules and are combined by [`features::FeatureSet`].

pub mod arm;
pub mod arm64;
pub mod features;
pub mod riscv64;
pub mod x86;

use std::fmt;
use std::str::FromStr;

pub use features::FeatureSet;

/// Processor instruction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionSet {
    None,
    Arm,
    Thumb2,
    Arm64,
    X86,
    X86_64,
    Riscv64,
}

impl InstructionSet {
    /// Instruction set of the build host.
    #[cfg(target_arch = "x86_64")]
    pub const RUNTIME: InstructionSet = InstructionSet::X86_64;
    #[cfg(target_arch = "x86")]
    pub const RUNTIME: InstructionSet = InstructionSet::X86;
    #[cfg(target_arch = "aarch64")]
    pub const RUNTIME: InstructionSet = InstructionSet::Arm64;
    #[cfg(target_arch = "arm")]
    pub const RUNTIME: InstructionSet = InstructionSet::Arm;
    #[cfg(target_arch = "riscv64")]
    pub const RUNTIME: InstructionSet = InstructionSet::Riscv64;
    #[cfg(not(any(
        target_arch = "x86_64",
        target_arch = "x86",
        target_arch = "aarch64",
        target_arch = "arm",
        target_arch = "riscv64"
    )))]
    pub const RUNTIME: InstructionSet = InstructionSet::None;

    /// The instruction set the JIT generates code for on a host of this ISA.
    ///
    /// 32-bit ARM hosts always JIT to Thumb2.
    pub fn jit_target(self) -> InstructionSet {
        match self {
            InstructionSet::Arm => InstructionSet::Thumb2,
            other => other,
        }
    }

    /// Whether `configured` is a valid JIT instruction set for a host of this ISA.
    pub fn accepts_jit_target(self, configured: InstructionSet) -> bool {
        configured == self.jit_target()
    }

    pub fn name(self) -> &'static str {
        match self {
            InstructionSet::None => "none",
            InstructionSet::Arm => "arm",
            InstructionSet::Thumb2 => "thumb2",
            InstructionSet::Arm64 => "arm64",
            InstructionSet::X86 => "x86",
            InstructionSet::X86_64 => "x86_64",
            InstructionSet::Riscv64 => "riscv64",
        }
    }
}

impl fmt::Display for InstructionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InstructionSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "arm" => Ok(InstructionSet::Arm),
            "thumb2" => Ok(InstructionSet::Thumb2),
            "arm64" | "aarch64" => Ok(InstructionSet::Arm64),
            "x86" => Ok(InstructionSet::X86),
            "x86_64" | "x86-64" => Ok(InstructionSet::X86_64),
            "riscv64" => Ok(InstructionSet::Riscv64),
            "none" => Ok(InstructionSet::None),
            _ => Err(format!("Unknown instruction set: {s}")),
        }
    }
}
