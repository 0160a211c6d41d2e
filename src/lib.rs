//! jit-driver - JIT compilation orchestration.
//!
//! Bridges a managed-code host runtime to an optimizing code generation
//! backend. The host's option tokens are resolved into a validated
//! [`CompilerOptions`], and per-method compile requests are timed, handed to
//! the backend and followed by an arena trim.
//!
//! # Primary Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use jit_driver::jit::{
//!     jit_compile_method, jit_load, SimpleMethod, StandaloneRuntime, WorkerThread,
//! };
//! use jit_driver::x64::StubBackend;
//!
//! let runtime = Arc::new(StandaloneRuntime::new().with_options(["--debuggable"]));
//! let jit = jit_load(runtime, Box::new(StubBackend::new()));
//! let method = SimpleMethod::new(1, "int Foo.bar()");
//! let ok = jit_compile_method(&jit, &method, &WorkerThread::new("jit-0"), false);
//! ```
//!
//! # Architecture
//!
//! - [`jit`] - Host interface, configuration resolver and compiler facade
//! - [`options`] - Compiler options and the structured token parser
//! - [`isa`] - Instruction sets and feature sets
//! - [`debug`] - Type-level debug ELF images and their registration
//! - [`core`] - Shared infrastructure (errors, arena pool, timing)
//! - [`x64`] - x86-64 stub backend

pub mod core;
pub mod debug;
pub mod isa;
pub mod jit;
pub mod options;
pub mod x64;

pub use crate::core::{CodegenError, ConfigError, DebugInfoError, FeatureError};
pub use isa::{FeatureSet, InstructionSet};
pub use jit::{CodegenBackend, JitCompiler, JitRuntime, StandaloneRuntime};
pub use options::{CompilerFilter, CompilerOptions};
