//! Compile requests through the facade.
//!
//! Uses the x86-64 stub backend and fake backends against a standalone
//! runtime with private timings.

use std::sync::Arc;

use jit_driver::core::error::CodegenError;
use jit_driver::core::timing::{PHASE_COMPILING, PHASE_TRIM_MAPS};
use jit_driver::jit::{
    jit_compile_method, CodeCache, CodeEntry, CodegenBackend, JitCompileRequest, JitCompiler,
    JitRuntime, SimpleMethod, StandaloneRuntime, ThreadContext, WorkerThread,
};
use jit_driver::x64::StubBackend;
use jit_driver::InstructionSet;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn runtime(tokens: &[&str]) -> Arc<StandaloneRuntime> {
    Arc::new(
        StandaloneRuntime::for_isa(InstructionSet::X86_64)
            .with_options(tokens.iter().copied())
            .with_private_timings(),
    )
}

/// Backend that allocates scratch memory and panics.
struct PanickingBackend;

impl CodegenBackend for PanickingBackend {
    fn name(&self) -> &str {
        "panicking"
    }

    fn jit_compile(
        &self,
        _thread: &dyn ThreadContext,
        request: &JitCompileRequest<'_>,
    ) -> Result<CodeEntry, CodegenError> {
        let arena = request.arena_pool.acquire();
        arena.alloc_slice_fill_copy(4096, 0u8);
        panic!("backend bug");
    }
}

#[test]
fn test_compile_commits_code_and_records_phases() {
    init_logger();
    let rt = runtime(&[]);
    let compiler = JitCompiler::try_new(rt.clone(), Box::new(StubBackend::new())).unwrap();
    let thread = WorkerThread::new("jit-0");

    assert!(jit_compile_method(&compiler, &SimpleMethod::new(3, "long A.f()"), &thread, false));
    assert!(jit_compile_method(&compiler, &SimpleMethod::new(3, "long A.f()"), &thread, true));

    let cache = rt.jit_code_cache();
    assert_eq!(cache.len(), 2);
    assert!(cache.lookup(3, false).is_some());
    assert!(cache.lookup(3, true).is_some());

    let timings = rt.timings().lock().unwrap();
    assert_eq!(timings.iterations(), 2);
    assert_eq!(timings.count(PHASE_COMPILING), 2);
    assert_eq!(timings.count(PHASE_TRIM_MAPS), 2);
}

#[test]
fn test_arena_trimmed_after_every_compile() {
    init_logger();
    let rt = runtime(&[]);
    let compiler = JitCompiler::try_new(rt.clone(), Box::new(StubBackend::new())).unwrap();
    let thread = WorkerThread::new("jit-0");

    for id in 1..=3 {
        assert!(compiler.compile_method(&thread, &SimpleMethod::new(id, "m"), false));
        assert_eq!(rt.arena_pool().idle_bytes(), 0);
    }
    let stats = rt.arena_pool().stats();
    assert_eq!(stats.trims, 3);
    assert_eq!(stats.acquisitions, 3);
}

#[test]
fn test_identical_code_gets_separate_entries() {
    init_logger();
    let rt = runtime(&[]);
    let compiler =
        JitCompiler::try_new(rt.clone(), Box::new(StubBackend::returning(42))).unwrap();
    let thread = WorkerThread::new("jit-0");

    assert!(compiler.compile_method(&thread, &SimpleMethod::new(1, "int A.a()"), false));
    assert!(compiler.compile_method(&thread, &SimpleMethod::new(2, "int A.b()"), false));

    let cache = rt.jit_code_cache();
    let a = cache.code(1, false).unwrap();
    let b = cache.code(2, false).unwrap();
    assert_eq!(a, b);
    assert!(!Arc::ptr_eq(&a, &b));

    // Retiring one method leaves the other in place.
    assert_eq!(cache.remove_method(1), 1);
    assert!(cache.lookup(2, false).is_some());
}

#[test]
fn test_debuggable_stub_keeps_frame() {
    init_logger();
    let rt = runtime(&["--debuggable"]);
    let compiler = JitCompiler::try_new(rt.clone(), Box::new(StubBackend::new())).unwrap();
    assert!(compiler.compile_method(
        &WorkerThread::new("jit-0"),
        &SimpleMethod::new(5, "m"),
        false
    ));

    let code = rt.jit_code_cache().code(5, false).unwrap();
    assert_eq!(code[0], 0x55);
    assert_eq!(&code[code.len() - 2..], &[0x5d, 0xc3]);
}

#[test]
fn test_unsupported_isa_fails_quietly() {
    init_logger();
    let rt = Arc::new(StandaloneRuntime::for_isa(InstructionSet::Arm64).with_private_timings());
    let compiler = JitCompiler::try_new(rt.clone(), Box::new(StubBackend::new())).unwrap();
    assert!(!compiler.compile_method(
        &WorkerThread::new("jit-0"),
        &SimpleMethod::new(1, "m"),
        false
    ));
    assert!(rt.jit_code_cache().is_empty());
    assert_eq!(rt.arena_pool().stats().trims, 1);
}

#[test]
fn test_backend_panic_reports_failure() {
    init_logger();
    let rt = runtime(&[]);
    let compiler = JitCompiler::try_new(rt.clone(), Box::new(PanickingBackend)).unwrap();
    let ok =
        compiler.compile_method(&WorkerThread::new("jit-0"), &SimpleMethod::new(1, "m"), false);

    assert!(!ok);
    // The arena unwound back into the pool and was trimmed.
    assert_eq!(rt.arena_pool().idle_bytes(), 0);
    assert_eq!(rt.timings().lock().unwrap().count(PHASE_TRIM_MAPS), 1);
}

#[test]
fn test_full_code_cache_fails_compile() {
    init_logger();
    let rt = Arc::new(
        StandaloneRuntime::for_isa(InstructionSet::X86_64)
            .with_code_cache(jit_driver::jit::JitCodeCache::with_capacity(1))
            .with_private_timings(),
    );
    let compiler = JitCompiler::try_new(rt.clone(), Box::new(StubBackend::new())).unwrap();
    assert!(!compiler.compile_method(
        &WorkerThread::new("jit-0"),
        &SimpleMethod::new(1, "m"),
        false
    ));
}

#[test]
fn test_concurrent_compiles() {
    init_logger();
    let rt = runtime(&[]);
    let compiler = JitCompiler::try_new(rt.clone(), Box::new(StubBackend::new())).unwrap();

    std::thread::scope(|s| {
        for worker in 0..4u64 {
            let compiler = &compiler;
            s.spawn(move || {
                let thread = WorkerThread::new(format!("jit-{worker}"));
                for i in 0..8u64 {
                    let id = worker * 100 + i;
                    assert!(compiler.compile_method(&thread, &SimpleMethod::new(id, "m"), false));
                }
            });
        }
    });

    assert_eq!(rt.jit_code_cache().len(), 32);
    assert_eq!(rt.timings().lock().unwrap().iterations(), 32);
}

#[test]
fn test_perf_map_follows_debug_info_setting() {
    init_logger();
    let dir = std::env::temp_dir().join(format!("jit-perf-map-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let rt = Arc::new(
        StandaloneRuntime::for_isa(InstructionSet::X86_64)
            .with_options(["-g"])
            .with_perf_map_dir(&dir)
            .with_private_timings(),
    );
    let mut compiler = JitCompiler::try_new(rt.clone(), Box::new(StubBackend::new())).unwrap();
    let path = compiler.jit_logger().unwrap().path().to_path_buf();
    assert!(compiler.compile_method(
        &WorkerThread::new("jit-0"),
        &SimpleMethod::new(9, "void P.q()"),
        false
    ));

    rt.set_options(Vec::<String>::new());
    compiler.update_config();
    assert!(compiler.jit_logger().is_none());

    let map = std::fs::read_to_string(&path).unwrap();
    let entry = rt.jit_code_cache().lookup(9, false).unwrap();
    assert_eq!(map, format!("{:x} {:x} void P.q()\n", entry.code_ptr, entry.size));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "not resolved")]
fn test_unresolved_declaring_class_is_rejected() {
    let rt = runtime(&[]);
    let compiler = JitCompiler::try_new(rt, Box::new(StubBackend::new())).unwrap();
    let mut method = SimpleMethod::new(1, "void Lazy.init()");
    method.class_resolved = false;
    compiler.compile_method(&WorkerThread::new("jit-0"), &method, false);
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "proxy")]
fn test_proxy_method_is_rejected() {
    let rt = runtime(&[]);
    let compiler = JitCompiler::try_new(rt, Box::new(StubBackend::new())).unwrap();
    let mut method = SimpleMethod::new(1, "$Proxy0.invoke");
    method.proxy = true;
    compiler.compile_method(&WorkerThread::new("jit-0"), &method, false);
}
