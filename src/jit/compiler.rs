// This module implements JitCompiler, the per-session facade the host runtime talks to. It
// owns the resolved CompilerOptions, the backend binding (a CompilerDriver with code dedupe
// turned off) and the perf map logger that is kept open while debug info generation is on.
// compile_method may run on many compiler threads at once: it times the backend call under
// "Compiling", always trims the runtime's arena pool under "TrimMaps" afterwards, folds the
// timings into the runtime's cumulative sink and reports the backend outcome as a bool.
// update_config needs exclusive access, so hosts serialize it against compiles. types_loaded
// emits a type-level debug ELF image for newly loaded types when debug info is enabled.

//! JIT compiler facade.

use std::sync::Arc;

use crate::core::error::{fatal, ConfigResult};
use crate::core::timing::{TimingLogger, PHASE_COMPILING, PHASE_TRIM_MAPS};
use crate::debug::elf_writer::write_debug_elf_file_for_classes;
use crate::isa::InstructionSet;
use crate::options::CompilerOptions;

use super::driver::{CodegenBackend, CompilerDriver, CompilerKind, JitCompileRequest};
use super::logger::JitLogger;
use super::resolver::ConfigResolver;
use super::runtime::{ClassDescriptor, JitMethod, JitRuntime, ThreadContext};

/// A JIT compilation session bound to one host runtime.
pub struct JitCompiler {
    runtime: Arc<dyn JitRuntime>,
    options: CompilerOptions,
    driver: CompilerDriver,
    jit_logger: Option<JitLogger>,
}

impl JitCompiler {
    /// Create a compiler, aborting the process if the host's options do
    /// not parse.
    pub fn create(runtime: Arc<dyn JitRuntime>, backend: Box<dyn CodegenBackend>) -> Box<Self> {
        match Self::try_new(runtime, backend) {
            Ok(compiler) => Box::new(compiler),
            Err(e) => fatal(&e),
        }
    }

    /// Create a compiler, returning option parse errors to the caller.
    pub fn try_new(
        runtime: Arc<dyn JitRuntime>,
        backend: Box<dyn CodegenBackend>,
    ) -> ConfigResult<Self> {
        let mut options = CompilerOptions::new(runtime.instruction_set());
        ConfigResolver::new(runtime.as_ref()).resolve(&mut options)?;

        let driver = CompilerDriver::new(backend, CompilerKind::Optimizing);
        // Each method must be evictable on its own.
        driver.set_dedupe_enabled(false);

        let mut compiler = Self {
            runtime,
            options,
            driver,
            jit_logger: None,
        };
        compiler.sync_jit_logger();
        log::debug!(
            "Created JIT compiler for {} using {}",
            compiler.options.instruction_set(),
            compiler.driver.backend_name()
        );
        Ok(compiler)
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn instruction_set(&self) -> InstructionSet {
        self.options.instruction_set()
    }

    pub fn driver(&self) -> &CompilerDriver {
        &self.driver
    }

    pub fn jit_logger(&self) -> Option<&JitLogger> {
        self.jit_logger.as_ref()
    }

    pub fn generate_debug_info(&self) -> bool {
        self.options.generate_debug_info()
    }

    /// Compile `method` with the optimizing backend.
    ///
    /// The method must not be a proxy, its declaring class must be resolved
    /// and `thread` must have no pending exception.
    pub fn compile_method(
        &self,
        thread: &dyn ThreadContext,
        method: &dyn JitMethod,
        osr: bool,
    ) -> bool {
        let name = method.pretty_name();
        let suffix = if osr { " (osr)" } else { "" };
        log::trace!("JIT compiling {} on {}{}", name, thread.name(), suffix);
        debug_assert!(!method.is_proxy(), "cannot JIT proxy method {}", name);
        debug_assert!(
            method.is_declaring_class_resolved(),
            "declaring class of {} is not resolved",
            name
        );
        debug_assert!(
            !thread.is_exception_pending(),
            "exception pending on {}",
            thread.name()
        );

        let mut logger = TimingLogger::for_jit_compile();
        let success = {
            let _t = logger.scoped(PHASE_COMPILING);
            let request = JitCompileRequest {
                method,
                baseline: false,
                osr,
                options: &self.options,
                code_cache: self.runtime.code_cache(),
                arena_pool: self.runtime.arena_pool(),
                jit_logger: self.jit_logger.as_ref(),
                storage: self.driver.storage(),
            };
            self.driver.jit_compile(thread, &request)
        };

        // Trim maps right after compiling. This belongs in an idle phase of
        // the compiler thread pool once the host provides one.
        {
            let _t = logger.scoped(PHASE_TRIM_MAPS);
            self.runtime.arena_pool().trim_maps();
        }

        if self.options.dump_timings {
            log::info!("{}", logger);
        } else {
            log::debug!("{}", logger);
        }
        self.runtime
            .timings()
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .add_logger(&logger);
        success
    }

    /// Re-resolve the host's current options, aborting on a parse error.
    pub fn update_config(&mut self) {
        if let Err(e) = self.try_update_config() {
            fatal(&e);
        }
    }

    /// Re-resolve the host's current options in place.
    pub fn try_update_config(&mut self) -> ConfigResult<()> {
        ConfigResolver::new(self.runtime.as_ref()).resolve(&mut self.options)?;
        self.sync_jit_logger();
        Ok(())
    }

    /// Emit and register type-level debug info for newly loaded types.
    ///
    /// `types` must hold only types not reported before.
    pub fn types_loaded(&self, types: &[ClassDescriptor]) {
        if !self.generate_debug_info() || types.is_empty() {
            return;
        }
        match write_debug_elf_file_for_classes(
            self.options.instruction_set(),
            self.options.instruction_set_features(),
            types,
        ) {
            // Type info is never unregistered.
            Ok(elf) => self
                .runtime
                .debug_registrar()
                .add_native_debug_info_for_jit(None, elf),
            Err(e) => log::warn!("Failed to write debug info for {} types: {}", types.len(), e),
        }
    }

    /// Release the compiler, closing its perf map.
    pub fn destroy(self: Box<Self>) {
        drop(self);
    }

    fn sync_jit_logger(&mut self) {
        let wanted = self.options.generate_debug_info();
        if wanted && self.jit_logger.is_none() {
            self.jit_logger = Some(JitLogger::open(&self.runtime.perf_map_dir()));
        } else if !wanted {
            if let Some(logger) = self.jit_logger.take() {
                logger.close_log();
            }
        }
    }
}

impl Drop for JitCompiler {
    fn drop(&mut self) {
        if let Some(logger) = self.jit_logger.take() {
            logger.close_log();
        }
        log::debug!("Destroyed JIT compiler");
    }
}
