//! Debug metadata for JIT code and loaded types.
//!
//! [`elf_writer`] serializes type records into ELF images and [`registrar`]
//! hands them to native debuggers.

pub mod elf_writer;
pub mod registrar;

pub use elf_writer::write_debug_elf_file_for_classes;
pub use registrar::{DebugInfoRegistrar, JitDebugRegistry, NativeDebugInfo};
