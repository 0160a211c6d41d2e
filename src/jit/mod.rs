//! JIT compilation orchestration.
//!
//! # Key Components
//!
//! ## Host interface (`runtime`, `interface`)
//! - [`JitRuntime`] injects options, ISA, live debuggable state and services
//! - Boundary calls `jit_load`, `jit_compile_method`, `jit_update_options` and friends
//!
//! ## Configuration (`resolver`)
//! - Structured option parse, forced non-PIC code, feature set salvage
//!
//! ## Compilation (`compiler`, `driver`, `cache`, `logger`)
//! - [`JitCompiler`] facade timing each compile and trimming arenas afterwards
//! - [`CodegenBackend`] seam with dedupe disabled for evictable code
//! - Perf map logging while debug info is enabled

pub mod cache;
pub mod compiler;
pub mod driver;
pub mod interface;
pub mod logger;
pub mod resolver;
pub mod runtime;

pub use cache::{CodeCache, CodeEntry, JitCodeCache};
pub use compiler::JitCompiler;
pub use driver::{
    CodegenBackend, CompiledMethodStorage, CompilerDriver, CompilerKind, JitCompileRequest,
};
pub use interface::{
    jit_compile_method, jit_generate_debug_info, jit_load, jit_types_loaded, jit_unload,
    jit_update_options,
};
pub use logger::JitLogger;
pub use resolver::{is_core_image_filename, resolve_features, ConfigResolver};
pub use runtime::{
    ClassDescriptor, FieldDescriptor, JitMethod, JitRuntime, MethodId, SimpleMethod,
    StandaloneRuntime, ThreadContext, WorkerThread,
};
