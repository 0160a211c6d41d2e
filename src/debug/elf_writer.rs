// This module serializes type-level debug records into a relocatable ELF image using the
// object crate's writer. Every loaded type becomes one record in the .debug_jit_types
// section and one data symbol named after its descriptor, pointing at that record. The
// .jit_isa_features section carries the resolved feature string so a debugger can tell
// which code variant it is looking at. Record layout, all integers little endian:
// descriptor NUL, super descriptor NUL, source file NUL, object size u32, field count u32,
// then per field: name NUL, type descriptor NUL. Absent strings are written empty.

//! Debug ELF images for loaded types.

use object::write::{Object, Symbol, SymbolSection};
use object::{
    Architecture, BinaryFormat, Endianness, SectionKind, SymbolFlags, SymbolKind, SymbolScope,
};

use crate::core::error::DebugInfoError;
use crate::isa::{FeatureSet, InstructionSet};
use crate::jit::runtime::ClassDescriptor;

/// Section holding the type records.
pub const TYPES_SECTION: &str = ".debug_jit_types";

/// Section holding the instruction set feature string.
pub const FEATURES_SECTION: &str = ".jit_isa_features";

fn architecture(isa: InstructionSet) -> Result<Architecture, DebugInfoError> {
    match isa {
        InstructionSet::X86 => Ok(Architecture::I386),
        InstructionSet::X86_64 => Ok(Architecture::X86_64),
        InstructionSet::Arm | InstructionSet::Thumb2 => Ok(Architecture::Arm),
        InstructionSet::Arm64 => Ok(Architecture::Aarch64),
        InstructionSet::Riscv64 => Ok(Architecture::Riscv64),
        InstructionSet::None => Err(DebugInfoError::UnsupportedIsa(isa)),
    }
}

fn push_str(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(s.as_bytes());
    out.push(0);
}

fn encode_record(class: &ClassDescriptor) -> Vec<u8> {
    let mut out = Vec::new();
    push_str(&mut out, &class.descriptor);
    push_str(&mut out, class.super_descriptor.as_deref().unwrap_or(""));
    push_str(&mut out, class.source_file.as_deref().unwrap_or(""));
    out.extend_from_slice(&class.object_size.to_le_bytes());
    out.extend_from_slice(&(class.fields.len() as u32).to_le_bytes());
    for field in &class.fields {
        push_str(&mut out, &field.name);
        push_str(&mut out, &field.type_descriptor);
    }
    out
}

/// Write a debug ELF image describing `classes`.
pub fn write_debug_elf_file_for_classes(
    isa: InstructionSet,
    features: Option<&FeatureSet>,
    classes: &[ClassDescriptor],
) -> Result<Vec<u8>, DebugInfoError> {
    let mut obj = Object::new(BinaryFormat::Elf, architecture(isa)?, Endianness::Little);

    let types = obj.add_section(Vec::new(), TYPES_SECTION.as_bytes().to_vec(), SectionKind::Debug);
    for class in classes {
        let record = encode_record(class);
        let offset = obj.append_section_data(types, &record, 1);
        obj.add_symbol(Symbol {
            name: class.descriptor.as_bytes().to_vec(),
            value: offset,
            size: record.len() as u64,
            kind: SymbolKind::Data,
            scope: SymbolScope::Compilation,
            weak: false,
            section: SymbolSection::Section(types),
            flags: SymbolFlags::None,
        });
    }

    let feature_string = features.map_or_else(|| "none".to_string(), FeatureSet::feature_string);
    let isa_section = obj.add_section(
        Vec::new(),
        FEATURES_SECTION.as_bytes().to_vec(),
        SectionKind::ReadOnlyData,
    );
    obj.append_section_data(isa_section, feature_string.as_bytes(), 1);

    let elf = obj.write()?;
    log::debug!(
        "Wrote {} byte debug ELF for {} types on {}",
        elf.len(),
        classes.len(),
        isa
    );
    Ok(elf)
}
