//! Host boundary.
//!
//! The runtime loads the JIT once, keeps the returned handle for the life of
//! the process and drives it through these calls. `jit_unload` consumes the
//! handle, so it cannot be called twice.

use std::sync::Arc;

use super::compiler::JitCompiler;
use super::driver::CodegenBackend;
use super::runtime::{ClassDescriptor, JitMethod, JitRuntime, ThreadContext};

/// Create the JIT compiler. Aborts if the host's options do not parse.
pub fn jit_load(
    runtime: Arc<dyn JitRuntime>,
    backend: Box<dyn CodegenBackend>,
) -> Box<JitCompiler> {
    log::debug!("Loading JIT compiler");
    JitCompiler::create(runtime, backend)
}

pub fn jit_unload(handle: Box<JitCompiler>) {
    handle.destroy();
}

pub fn jit_compile_method(
    handle: &JitCompiler,
    method: &dyn JitMethod,
    thread: &dyn ThreadContext,
    osr: bool,
) -> bool {
    handle.compile_method(thread, method, osr)
}

/// Report newly loaded types. `types` must not repeat earlier reports.
pub fn jit_types_loaded(handle: &JitCompiler, types: &[ClassDescriptor]) {
    handle.types_loaded(types);
}

/// Re-read the host's compiler options. Must not race with compiles.
pub fn jit_update_options(handle: &mut JitCompiler) {
    handle.update_config();
}

pub fn jit_generate_debug_info(handle: &JitCompiler) -> bool {
    handle.generate_debug_info()
}
