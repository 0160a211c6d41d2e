// This module defines the error types for the JIT driver using the thiserror crate. ConfigError
// covers failures of the structured option parser (unrecognized tokens, missing or malformed
// values, unknown compiler filters) and is the only error that is fatal at resolution time.
// FeatureError covers instruction-set variant and feature-string problems, which the resolver
// downgrades to warnings. DebugInfoError is returned by the debug ELF writer and CodegenError
// by backends. `fatal` is the process-terminating path taken when the host hands the JIT a
// configuration it cannot parse.

//! Error types for the JIT driver.

use thiserror::Error;

use crate::isa::InstructionSet;

/// Errors from the structured compiler option parser.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unrecognized compiler option: {0}")]
    UnrecognizedOption(String),

    #[error("Missing value for compiler option {option}")]
    MissingValue { option: String },

    #[error("Invalid value '{value}' for compiler option {option}: {reason}")]
    InvalidValue {
        option: String,
        value: String,
        reason: String,
    },

    #[error("Unknown compiler filter: {0}")]
    UnknownCompilerFilter(String),
}

/// Errors from instruction-set variant and feature parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeatureError {
    #[error("Empty instruction set variant")]
    EmptyVariant,

    #[error("Unexpected CPU variant for {isa}: {variant}")]
    UnknownVariant { isa: InstructionSet, variant: String },

    #[error("Unknown instruction set feature for {isa}: '{feature}'")]
    UnknownFeature { isa: InstructionSet, feature: String },

    #[error("Empty entry in instruction set features")]
    EmptyFeature,

    #[error("Unexpected instruction set features after 'default' or 'runtime'")]
    DefaultWithOthers,

    #[error("No instruction set features for {0}")]
    UnsupportedIsa(InstructionSet),
}

/// Errors from the debug ELF writer.
#[derive(Error, Debug)]
pub enum DebugInfoError {
    #[error("Cannot write debug info for {0}")]
    UnsupportedIsa(InstructionSet),

    #[error("Failed to write debug ELF file: {0}")]
    Write(#[from] object::write::Error),
}

/// Errors reported by code generation backends.
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Backend cannot generate code for {0}")]
    UnsupportedIsa(InstructionSet),

    #[error("Assembly failed: {0}")]
    Assembly(String),

    #[error("Code cache rejected method {0}")]
    CodeCacheFull(String),
}

/// Result type alias for option parsing.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for feature parsing.
pub type FeatureResult<T> = Result<T, FeatureError>;

/// Log a configuration error and terminate the process.
pub fn fatal(err: &ConfigError) -> ! {
    log::error!("{err}");
    std::process::abort()
}
