// This module provides StubBackend, a minimal optimizing-tier backend for x86-64 built on the
// iced-x86 code assembler. Every compiled method becomes a function returning a 64-bit
// constant: the method id by default, or a fixed value so that distinct methods produce
// byte-identical code. Debuggable configurations keep a System V frame (push rbp; mov rbp,
// rsp ... pop rbp) so debuggers can unwind through the stub. The instruction plan is built
// in an arena borrowed from the runtime's pool, which is what the post-compile trim releases.

//! x86-64 stub backend using iced-x86.

use bumpalo::collections::Vec as BumpVec;
use iced_x86::code_asm::*;
use iced_x86::IcedError;

use crate::core::error::CodegenError;
use crate::isa::InstructionSet;
use crate::jit::cache::CodeEntry;
use crate::jit::driver::{CodegenBackend, JitCompileRequest};
use crate::jit::runtime::ThreadContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StubOp {
    Prologue,
    LoadResult(u64),
    Epilogue,
    Return,
}

/// Backend emitting constant-returning stubs.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubBackend {
    constant: Option<u64>,
}

impl StubBackend {
    /// Stubs return the id of the compiled method.
    pub fn new() -> Self {
        Self { constant: None }
    }

    /// Stubs return `value` for every method.
    pub fn returning(value: u64) -> Self {
        Self {
            constant: Some(value),
        }
    }
}

fn asm_err(e: IcedError) -> CodegenError {
    CodegenError::Assembly(e.to_string())
}

fn assemble(ops: &[StubOp]) -> Result<Vec<u8>, CodegenError> {
    let mut a = CodeAssembler::new(64).map_err(asm_err)?;
    for op in ops {
        match *op {
            StubOp::Prologue => {
                a.push(rbp).map_err(asm_err)?;
                a.mov(rbp, rsp).map_err(asm_err)?;
            }
            StubOp::LoadResult(value) => a.mov(rax, value as i64).map_err(asm_err)?,
            StubOp::Epilogue => a.pop(rbp).map_err(asm_err)?,
            StubOp::Return => a.ret().map_err(asm_err)?,
        }
    }
    a.assemble(0).map_err(asm_err)
}

impl CodegenBackend for StubBackend {
    fn name(&self) -> &str {
        "x64-stub"
    }

    fn jit_compile(
        &self,
        _thread: &dyn ThreadContext,
        request: &JitCompileRequest<'_>,
    ) -> Result<CodeEntry, CodegenError> {
        let isa = request.options.instruction_set();
        if isa != InstructionSet::X86_64 {
            return Err(CodegenError::UnsupportedIsa(isa));
        }
        debug_assert!(!request.baseline, "stub backend is optimizing only");

        let arena = request.arena_pool.acquire();
        let mut ops = BumpVec::new_in(&*arena);
        let frame = request.options.is_debuggable();
        if frame {
            ops.push(StubOp::Prologue);
        }
        ops.push(StubOp::LoadResult(self.constant.unwrap_or_else(|| request.method.id())));
        if frame {
            ops.push(StubOp::Epilogue);
        }
        ops.push(StubOp::Return);

        let code = assemble(&ops)?;
        request.commit(&code)
    }
}
