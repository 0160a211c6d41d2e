// This module binds the JIT to a code generation backend. CodegenBackend is the seam to the
// backend proper: it receives a JitCompileRequest describing one method (tier, OSR flag,
// resolved options, code cache, arena pool, perf map logger) and commits the generated code
// through the request. CompiledMethodStorage is the dedupe table for generated code; when
// enabled, byte-identical code is shared between methods. The JIT turns dedupe off so each
// method owns its code and can be retired on its own. CompilerDriver ties a backend to its
// storage and reports the backend outcome as a plain bool, turning errors and panics from the
// backend into a failed compile.

//! Code generation backend binding.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use hashbrown::HashSet;

use crate::core::arena::ArenaPool;
use crate::core::error::CodegenError;
use crate::options::CompilerOptions;

use super::cache::{CodeCache, CodeEntry};
use super::logger::JitLogger;
use super::runtime::{JitMethod, ThreadContext};

/// Compiler tier family a driver was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilerKind {
    Optimizing,
}

/// One method compile, as seen by a backend.
pub struct JitCompileRequest<'a> {
    pub method: &'a dyn JitMethod,
    /// Always false for JIT compiles; only the optimizing tier is requested.
    pub baseline: bool,
    pub osr: bool,
    pub options: &'a CompilerOptions,
    pub code_cache: &'a dyn CodeCache,
    pub arena_pool: &'a ArenaPool,
    pub jit_logger: Option<&'a JitLogger>,
    pub storage: &'a CompiledMethodStorage,
}

impl JitCompileRequest<'_> {
    /// Commit generated code for the requested method.
    ///
    /// Goes through the dedupe table, stores the code in the cache and
    /// records it in the perf map when one is open.
    pub fn commit(&self, code: &[u8]) -> Result<CodeEntry, CodegenError> {
        let code = self.storage.deduplicate(code);
        let entry = self.code_cache.commit(self.method.id(), self.osr, code)?;
        if let Some(logger) = self.jit_logger {
            logger.write_log(&entry, &self.method.pretty_name());
        }
        Ok(entry)
    }
}

/// Code generation backend.
pub trait CodegenBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Generate code for `request.method` and commit it through the request.
    fn jit_compile(
        &self,
        thread: &dyn ThreadContext,
        request: &JitCompileRequest<'_>,
    ) -> Result<CodeEntry, CodegenError>;
}

/// Interning table for generated code.
pub struct CompiledMethodStorage {
    dedupe_enabled: AtomicBool,
    table: Mutex<HashSet<Arc<[u8]>>>,
    dedupe_hits: AtomicUsize,
}

impl CompiledMethodStorage {
    pub fn new(dedupe_enabled: bool) -> Self {
        Self {
            dedupe_enabled: AtomicBool::new(dedupe_enabled),
            table: Mutex::new(HashSet::new()),
            dedupe_hits: AtomicUsize::new(0),
        }
    }

    pub fn set_dedupe_enabled(&self, enabled: bool) {
        self.dedupe_enabled.store(enabled, Ordering::Relaxed);
        if !enabled {
            self.table.lock().unwrap_or_else(|e| e.into_inner()).clear();
        }
    }

    pub fn dedupe_enabled(&self) -> bool {
        self.dedupe_enabled.load(Ordering::Relaxed)
    }

    /// Shared copy of `code`. With dedupe off every call allocates.
    pub fn deduplicate(&self, code: &[u8]) -> Arc<[u8]> {
        if !self.dedupe_enabled() {
            return Arc::from(code);
        }
        let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = table.get(code) {
            self.dedupe_hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(existing);
        }
        let code: Arc<[u8]> = Arc::from(code);
        table.insert(Arc::clone(&code));
        code
    }

    pub fn dedupe_hits(&self) -> usize {
        self.dedupe_hits.load(Ordering::Relaxed)
    }
}

/// A backend plus the compile-wide state it shares across methods.
pub struct CompilerDriver {
    backend: Box<dyn CodegenBackend>,
    kind: CompilerKind,
    storage: CompiledMethodStorage,
}

impl CompilerDriver {
    pub fn new(backend: Box<dyn CodegenBackend>, kind: CompilerKind) -> Self {
        Self {
            backend,
            kind,
            storage: CompiledMethodStorage::new(true),
        }
    }

    pub fn set_dedupe_enabled(&self, enabled: bool) {
        self.storage.set_dedupe_enabled(enabled);
    }

    pub fn storage(&self) -> &CompiledMethodStorage {
        &self.storage
    }

    pub fn kind(&self) -> CompilerKind {
        self.kind
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Run the backend. Errors and panics both count as a failed compile.
    pub fn jit_compile(&self, thread: &dyn ThreadContext, request: &JitCompileRequest<'_>) -> bool {
        let name = request.method.pretty_name();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.backend.jit_compile(thread, request)
        }));
        match result {
            Ok(Ok(entry)) => {
                log::debug!(
                    "{} compiled {} at {:#x} ({} bytes)",
                    self.backend.name(),
                    name,
                    entry.code_ptr,
                    entry.size
                );
                true
            }
            Ok(Err(e)) => {
                log::debug!("{} failed to compile {}: {}", self.backend.name(), name, e);
                false
            }
            Err(_) => {
                log::error!("{} panicked while compiling {}", self.backend.name(), name);
                false
            }
        }
    }
}
