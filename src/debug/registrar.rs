//! Registration of JIT debug info with native debuggers.

use std::sync::Mutex;

/// A registered debug ELF image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeDebugInfo {
    /// Code the image describes; `None` for type-level info.
    pub code_ptr: Option<usize>,
    pub elf: Vec<u8>,
}

impl NativeDebugInfo {
    pub fn is_type_info(&self) -> bool {
        self.code_ptr.is_none()
    }
}

/// Sink for debug ELF images produced by the JIT.
pub trait DebugInfoRegistrar: Send + Sync {
    fn add_native_debug_info_for_jit(&self, code_ptr: Option<usize>, elf: Vec<u8>);

    /// Unregister the image for `code_ptr`. Type-level images have no code
    /// address and stay registered.
    fn remove_native_debug_info_for_jit(&self, code_ptr: usize) -> bool;
}

/// In-process registry of debug images.
#[derive(Debug, Default)]
pub struct JitDebugRegistry {
    entries: Mutex<Vec<NativeDebugInfo>>,
}

impl JitDebugRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all registered images in registration order.
    pub fn entries(&self) -> Vec<NativeDebugInfo> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn type_entries(&self) -> Vec<NativeDebugInfo> {
        self.entries()
            .into_iter()
            .filter(NativeDebugInfo::is_type_info)
            .collect()
    }
}

impl DebugInfoRegistrar for JitDebugRegistry {
    fn add_native_debug_info_for_jit(&self, code_ptr: Option<usize>, elf: Vec<u8>) {
        log::trace!("Registering {} byte debug image for {:?}", elf.len(), code_ptr);
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(NativeDebugInfo { code_ptr, elf });
    }

    fn remove_native_debug_info_for_jit(&self, code_ptr: usize) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|entry| entry.code_ptr != Some(code_ptr));
        entries.len() != before
    }
}
