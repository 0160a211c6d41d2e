//! Resolve JIT compiler options for a host description.
//!
//! Prints the resolved configuration, optionally compiles a batch of stub
//! methods and dumps the collected phase timings.
//!
//! ```text
//! jitopts --isa x86 -- --instruction-set-variant=silvermont --debuggable
//! ```

use std::sync::Arc;

use clap::Parser;
use jit_driver::isa::InstructionSet;
use jit_driver::jit::{
    jit_compile_method, jit_generate_debug_info, jit_load, jit_types_loaded, jit_unload,
    ClassDescriptor, CodeCache, JitRuntime, SimpleMethod, StandaloneRuntime, WorkerThread,
};
use jit_driver::x64::StubBackend;

#[derive(Parser)]
#[command(name = "jitopts")]
#[command(about = "Resolve JIT compiler options and exercise the stub backend")]
struct Args {
    /// Host instruction set (defaults to the build host)
    #[arg(long)]
    isa: Option<InstructionSet>,

    /// Host runtime is debuggable
    #[arg(long)]
    debuggable: bool,

    /// Boot image location reported by the host
    #[arg(long)]
    image: Option<String>,

    /// Number of stub methods to compile
    #[arg(short = 'n', long = "compile", default_value = "0")]
    compile: u64,

    /// Report this many synthetic loaded types
    #[arg(long, default_value = "0")]
    types: usize,

    /// Compiler option tokens handed to the JIT
    #[arg(last = true)]
    options: Vec<String>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut runtime = StandaloneRuntime::for_isa(args.isa.unwrap_or(InstructionSet::RUNTIME))
        .with_options(args.options.iter().cloned())
        .with_debuggable(args.debuggable)
        .with_private_timings();
    if let Some(image) = &args.image {
        runtime = runtime.with_image_location(image.as_str());
    }
    let runtime = Arc::new(runtime);

    let jit = jit_load(runtime.clone(), Box::new(StubBackend::new()));
    print!("{}", jit.options());

    if args.types > 0 {
        let types: Vec<_> = (0..args.types)
            .map(|i| {
                ClassDescriptor::new(format!("LSynthetic{i};")).with_super("Ljava/lang/Object;")
            })
            .collect();
        jit_types_loaded(&jit, &types);
        println!(
            "Debug info: {} ({} images registered)",
            jit_generate_debug_info(&jit),
            runtime.debug_registry().len()
        );
    }

    if args.compile > 0 {
        let thread = WorkerThread::new("jit-worker-0");
        let compiled = (1..=args.compile)
            .filter(|id| {
                let method = SimpleMethod::new(*id, format!("long Stub.m{id}()"));
                jit_compile_method(&jit, &method, &thread, false)
            })
            .count();
        println!("Compiled {}/{} methods", compiled, args.compile);
        println!("Code cache entries: {}", runtime.jit_code_cache().len());
        print!("{}", runtime.arena_pool().stats());
        let timings = runtime.timings().lock().unwrap_or_else(|e| e.into_inner());
        print!("{}", timings.info_pretty());
    }

    jit_unload(jit);
}
