// This module defines what the JIT needs from its host runtime. JitRuntime is the injected
// provider of everything the compiler used to look up globally: the option tokens, the
// resident instruction set, the live debuggable flag, the active boot image path, the method
// code cache, the arena pool, the debug-info registrar and the timing sink. ThreadContext and
// JitMethod describe the calling thread and the method being compiled. ClassDescriptor is the
// host's description of a newly loaded type, used for type-level debug records.
// StandaloneRuntime is a self-contained host used by the jitopts tool and the tests; its
// option tokens and debuggable flag can be changed while compilers are live.

//! Host runtime interface.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};

use crate::core::arena::ArenaPool;
use crate::core::timing::{CumulativeLogger, JIT_TIMINGS};
use crate::debug::registrar::{DebugInfoRegistrar, JitDebugRegistry};
use crate::isa::InstructionSet;

use super::cache::{CodeCache, JitCodeCache};

/// Stable identity of a method within the host runtime.
pub type MethodId = u64;

/// Services the JIT consumes from the host runtime.
pub trait JitRuntime: Send + Sync {
    /// Instruction set of the host process.
    fn instruction_set(&self) -> InstructionSet;

    /// Current compiler option tokens, e.g. `--inline-max-code-units=16`.
    fn compiler_options(&self) -> Vec<String>;

    /// Live debuggable state of the runtime.
    fn is_debuggable(&self) -> bool;

    /// Path of the boot image in use, if any.
    fn image_location(&self) -> Option<String>;

    fn code_cache(&self) -> &dyn CodeCache;

    fn arena_pool(&self) -> &ArenaPool;

    fn debug_registrar(&self) -> &dyn DebugInfoRegistrar;

    /// Sink for per-compile phase timings.
    fn timings(&self) -> &Mutex<CumulativeLogger> {
        &JIT_TIMINGS
    }

    /// Directory receiving the perf map written by the JIT logger.
    fn perf_map_dir(&self) -> PathBuf {
        std::env::temp_dir()
    }
}

/// The thread a compile request runs on.
pub trait ThreadContext {
    fn name(&self) -> &str;

    /// Whether an exception is pending on this thread.
    fn is_exception_pending(&self) -> bool;
}

/// A method handed to the JIT.
pub trait JitMethod: Send + Sync {
    fn id(&self) -> MethodId;

    /// Human readable name, used in logs and the perf map.
    fn pretty_name(&self) -> String;

    fn is_proxy(&self) -> bool;

    fn is_declaring_class_resolved(&self) -> bool;
}

/// A field of a loaded type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub type_descriptor: String,
}

/// A loaded type, as described to the debug metadata emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDescriptor {
    /// Type descriptor such as `Ljava/lang/Object;`.
    pub descriptor: String,
    pub super_descriptor: Option<String>,
    pub source_file: Option<String>,
    pub object_size: u32,
    pub fields: Vec<FieldDescriptor>,
}

impl ClassDescriptor {
    pub fn new(descriptor: impl Into<String>) -> Self {
        Self {
            descriptor: descriptor.into(),
            super_descriptor: None,
            source_file: None,
            object_size: 0,
            fields: Vec::new(),
        }
    }

    pub fn with_super(mut self, super_descriptor: impl Into<String>) -> Self {
        self.super_descriptor = Some(super_descriptor.into());
        self
    }

    pub fn with_source_file(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = Some(source_file.into());
        self
    }

    pub fn with_object_size(mut self, object_size: u32) -> Self {
        self.object_size = object_size;
        self
    }

    pub fn with_field(
        mut self,
        name: impl Into<String>,
        type_descriptor: impl Into<String>,
    ) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.into(),
            type_descriptor: type_descriptor.into(),
        });
        self
    }
}

/// A plain method description.
#[derive(Debug, Clone)]
pub struct SimpleMethod {
    pub id: MethodId,
    pub name: String,
    pub proxy: bool,
    pub class_resolved: bool,
}

impl SimpleMethod {
    pub fn new(id: MethodId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            proxy: false,
            class_resolved: true,
        }
    }
}

impl JitMethod for SimpleMethod {
    fn id(&self) -> MethodId {
        self.id
    }

    fn pretty_name(&self) -> String {
        self.name.clone()
    }

    fn is_proxy(&self) -> bool {
        self.proxy
    }

    fn is_declaring_class_resolved(&self) -> bool {
        self.class_resolved
    }
}

/// A compiler worker thread.
#[derive(Debug, Clone)]
pub struct WorkerThread {
    pub name: String,
    pub exception_pending: bool,
}

impl WorkerThread {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exception_pending: false,
        }
    }
}

impl ThreadContext for WorkerThread {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_exception_pending(&self) -> bool {
        self.exception_pending
    }
}

/// Self-contained host runtime.
pub struct StandaloneRuntime {
    isa: InstructionSet,
    options: RwLock<Vec<String>>,
    debuggable: AtomicBool,
    image_location: Option<String>,
    perf_map_dir: PathBuf,
    code_cache: JitCodeCache,
    arena_pool: ArenaPool,
    registry: JitDebugRegistry,
    /// Private timing sink; the process-wide one is used when absent.
    timings: Option<Mutex<CumulativeLogger>>,
}

impl StandaloneRuntime {
    /// Runtime for the instruction set this crate was built for.
    pub fn new() -> Self {
        Self::for_isa(InstructionSet::RUNTIME)
    }

    pub fn for_isa(isa: InstructionSet) -> Self {
        Self {
            isa,
            options: RwLock::new(Vec::new()),
            debuggable: AtomicBool::new(false),
            image_location: None,
            perf_map_dir: std::env::temp_dir(),
            code_cache: JitCodeCache::new(),
            arena_pool: ArenaPool::new(),
            registry: JitDebugRegistry::new(),
            timings: None,
        }
    }

    pub fn with_options<I, S>(self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_options(tokens);
        self
    }

    pub fn with_debuggable(self, debuggable: bool) -> Self {
        self.set_debuggable(debuggable);
        self
    }

    pub fn with_image_location(mut self, location: impl Into<String>) -> Self {
        self.image_location = Some(location.into());
        self
    }

    pub fn with_perf_map_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.perf_map_dir = dir.into();
        self
    }

    pub fn with_code_cache(mut self, code_cache: JitCodeCache) -> Self {
        self.code_cache = code_cache;
        self
    }

    /// Record timings here instead of in the process-wide sink.
    pub fn with_private_timings(mut self) -> Self {
        self.timings = Some(Mutex::new(CumulativeLogger::default()));
        self
    }

    /// Replace the option tokens seen by the next resolution.
    pub fn set_options<I, S>(&self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens = tokens.into_iter().map(Into::into).collect();
        *self.options.write().unwrap_or_else(|e| e.into_inner()) = tokens;
    }

    pub fn set_debuggable(&self, debuggable: bool) {
        self.debuggable.store(debuggable, Ordering::Release);
    }

    pub fn jit_code_cache(&self) -> &JitCodeCache {
        &self.code_cache
    }

    pub fn debug_registry(&self) -> &JitDebugRegistry {
        &self.registry
    }
}

impl Default for StandaloneRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl JitRuntime for StandaloneRuntime {
    fn instruction_set(&self) -> InstructionSet {
        self.isa
    }

    fn compiler_options(&self) -> Vec<String> {
        self.options
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn is_debuggable(&self) -> bool {
        self.debuggable.load(Ordering::Acquire)
    }

    fn image_location(&self) -> Option<String> {
        self.image_location.clone()
    }

    fn code_cache(&self) -> &dyn CodeCache {
        &self.code_cache
    }

    fn arena_pool(&self) -> &ArenaPool {
        &self.arena_pool
    }

    fn debug_registrar(&self) -> &dyn DebugInfoRegistrar {
        &self.registry
    }

    fn timings(&self) -> &Mutex<CumulativeLogger> {
        match &self.timings {
            Some(timings) => timings,
            None => &*JIT_TIMINGS,
        }
    }

    fn perf_map_dir(&self) -> PathBuf {
        self.perf_map_dir.clone()
    }
}
