//! Structured parser for compiler option tokens.
//!
//! Tokens have the form `--key=value` or `--key`. The instruction-set
//! variant and feature prefixes are accepted here but not interpreted;
//! the JIT resolver builds the feature set from them in a separate scan.

use crate::core::error::{ConfigError, ConfigResult};

use super::CompilerOptions;

pub const INSTRUCTION_SET_VARIANT_PREFIX: &str = "--instruction-set-variant=";
pub const INSTRUCTION_SET_FEATURES_PREFIX: &str = "--instruction-set-features=";

/// What a parse pass observed beyond the option values themselves.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    /// `--debuggable` or `--no-debuggable` appeared.
    pub debuggable_set: bool,

    /// Tokens skipped because they were not recognized.
    pub ignored: Vec<String>,
}

/// Applies option tokens to a [`CompilerOptions`].
#[derive(Debug, Clone, Copy)]
pub struct OptionParser {
    ignore_unrecognized: bool,
}

impl OptionParser {
    pub fn new(ignore_unrecognized: bool) -> Self {
        Self {
            ignore_unrecognized,
        }
    }

    /// Parse `tokens` into `options`, stopping at the first error.
    ///
    /// On error `options` may be partially updated; callers that need
    /// all-or-nothing behavior parse into a scratch copy.
    pub fn parse<S: AsRef<str>>(
        &self,
        tokens: &[S],
        options: &mut CompilerOptions,
    ) -> ConfigResult<ParseOutcome> {
        let mut outcome = ParseOutcome::default();
        for token in tokens {
            let token = token.as_ref();
            if !self.parse_one(token, options, &mut outcome)? {
                if !self.ignore_unrecognized {
                    return Err(ConfigError::UnrecognizedOption(token.to_string()));
                }
                log::debug!("Ignoring unrecognized compiler option {}", token);
                outcome.ignored.push(token.to_string());
            }
        }
        Ok(outcome)
    }

    /// Returns `Ok(false)` for tokens this parser does not know.
    fn parse_one(
        &self,
        token: &str,
        options: &mut CompilerOptions,
        outcome: &mut ParseOutcome,
    ) -> ConfigResult<bool> {
        if token.starts_with(INSTRUCTION_SET_VARIANT_PREFIX)
            || token.starts_with(INSTRUCTION_SET_FEATURES_PREFIX)
        {
            return Ok(true);
        }

        let (key, value) = match token.split_once('=') {
            Some((key, value)) => (key, Some(value)),
            None => (token, None),
        };

        match key {
            "--compiler-filter" => {
                options.compiler_filter = require(key, value)?.parse()?;
            }
            "--huge-method-max" => options.huge_method_threshold = parse_usize(key, value)?,
            "--large-method-max" => options.large_method_threshold = parse_usize(key, value)?,
            "--small-method-max" => options.small_method_threshold = parse_usize(key, value)?,
            "--tiny-method-max" => options.tiny_method_threshold = parse_usize(key, value)?,
            "--inline-max-code-units" => {
                options.inline_max_code_units = Some(parse_usize(key, value)?);
            }
            // Bare flags; a flag written with a value is not a known option.
            "--generate-debug-info" | "-g" if value.is_none() => {
                options.generate_debug_info = true;
            }
            "--no-generate-debug-info" if value.is_none() => options.generate_debug_info = false,
            "--generate-mini-debug-info" if value.is_none() => {
                options.generate_mini_debug_info = true;
            }
            "--no-generate-mini-debug-info" if value.is_none() => {
                options.generate_mini_debug_info = false;
            }
            "--debuggable" if value.is_none() => {
                options.debuggable = true;
                outcome.debuggable_set = true;
            }
            "--no-debuggable" if value.is_none() => {
                options.debuggable = false;
                outcome.debuggable_set = true;
            }
            "--compile-pic" if value.is_none() => options.compile_pic = true,
            "--dump-timings" if value.is_none() => options.dump_timings = true,
            "--dump-stats" if value.is_none() => options.dump_stats = true,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

fn require<'a>(key: &str, value: Option<&'a str>) -> ConfigResult<&'a str> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::MissingValue {
            option: key.to_string(),
        }),
    }
}

fn parse_usize(key: &str, value: Option<&str>) -> ConfigResult<usize> {
    let raw = require(key, value)?;
    raw.parse().map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
        option: key.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::InstructionSet;
    use crate::options::CompilerFilter;

    fn options() -> CompilerOptions {
        CompilerOptions::new(InstructionSet::X86_64)
    }

    #[test]
    fn test_parse_values_and_flags() {
        let mut opts = options();
        let outcome = OptionParser::new(false)
            .parse(
                &[
                    "--compiler-filter=everything",
                    "--inline-max-code-units=16",
                    "--huge-method-max=500",
                    "-g",
                    "--compile-pic",
                    "--dump-timings",
                ],
                &mut opts,
            )
            .unwrap();
        assert_eq!(opts.compiler_filter, CompilerFilter::Everything);
        assert_eq!(opts.inline_max_code_units, Some(16));
        assert_eq!(opts.huge_method_threshold, 500);
        assert!(opts.generate_debug_info);
        assert!(opts.compile_pic);
        assert!(opts.dump_timings);
        assert!(!outcome.debuggable_set);
    }

    #[test]
    fn test_debuggable_presence_is_reported() {
        let mut opts = options();
        let outcome = OptionParser::new(false)
            .parse(&["--no-debuggable"], &mut opts)
            .unwrap();
        assert!(outcome.debuggable_set);
        assert!(!opts.debuggable);
    }

    #[test]
    fn test_unrecognized_rejected_or_ignored() {
        let mut opts = options();
        let err = OptionParser::new(false)
            .parse(&["--bogus"], &mut opts)
            .unwrap_err();
        assert_eq!(err, ConfigError::UnrecognizedOption("--bogus".to_string()));

        let outcome = OptionParser::new(true)
            .parse(&["--bogus", "--debuggable"], &mut opts)
            .unwrap();
        assert_eq!(outcome.ignored, vec!["--bogus".to_string()]);
        assert!(opts.debuggable);
    }

    #[test]
    fn test_malformed_values_fail_even_when_ignoring() {
        let mut opts = options();
        let parser = OptionParser::new(true);
        assert!(matches!(
            parser.parse(&["--inline-max-code-units=lots"], &mut opts),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(
            parser.parse(&["--large-method-max"], &mut opts),
            Err(ConfigError::MissingValue {
                option: "--large-method-max".to_string()
            })
        );
        assert_eq!(
            parser.parse(&["--compiler-filter=turbo"], &mut opts),
            Err(ConfigError::UnknownCompilerFilter("turbo".to_string()))
        );
    }

    #[test]
    fn test_flag_with_value_is_unrecognized() {
        let mut opts = options();
        let outcome = OptionParser::new(true)
            .parse(&["--debuggable=yes", "--generate-debug-info=true"], &mut opts)
            .unwrap();
        assert_eq!(
            outcome.ignored,
            vec![
                "--debuggable=yes".to_string(),
                "--generate-debug-info=true".to_string()
            ]
        );
        assert!(!outcome.debuggable_set);
        assert!(!opts.debuggable);
        assert!(!opts.generate_debug_info);

        let err = OptionParser::new(false)
            .parse(&["--dump-stats=1"], &mut opts)
            .unwrap_err();
        assert_eq!(err, ConfigError::UnrecognizedOption("--dump-stats=1".to_string()));
    }

    #[test]
    fn test_all_compiler_filters_accepted() {
        let mut opts = options();
        let parser = OptionParser::new(false);
        parser.parse(&["--compiler-filter=extract"], &mut opts).unwrap();
        assert_eq!(opts.compiler_filter, CompilerFilter::Extract);
        parser
            .parse(&["--compiler-filter=assume-verified"], &mut opts)
            .unwrap();
        assert_eq!(opts.compiler_filter, CompilerFilter::AssumeVerified);
    }

    #[test]
    fn test_feature_prefixes_pass_through() {
        let mut opts = options();
        let before = opts.clone();
        let outcome = OptionParser::new(false)
            .parse(
                &[
                    "--instruction-set-variant=silvermont",
                    "--instruction-set-features=avx",
                ],
                &mut opts,
            )
            .unwrap();
        assert!(outcome.ignored.is_empty());
        assert_eq!(opts, before);
    }
}
