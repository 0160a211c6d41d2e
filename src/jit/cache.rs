//! Method code cache.
//!
//! The compiler facade only passes the cache through to the backend. The
//! cache owns its own synchronization; concurrent commits from several
//! compiling threads are safe.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::core::error::CodegenError;

use super::runtime::MethodId;

/// Location of committed code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeEntry {
    pub code_ptr: usize,
    pub size: usize,
}

/// Storage for generated method code.
pub trait CodeCache: Send + Sync {
    /// Store `code` for `method`, replacing any previous entry for the same
    /// method and OSR flag.
    fn commit(
        &self,
        method: MethodId,
        osr: bool,
        code: Arc<[u8]>,
    ) -> Result<CodeEntry, CodegenError>;

    fn lookup(&self, method: MethodId, osr: bool) -> Option<CodeEntry>;

    /// Drop every entry of `method`. Returns the number of entries removed.
    fn remove_method(&self, method: MethodId) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn entry_of(code: &Arc<[u8]>) -> CodeEntry {
    CodeEntry {
        code_ptr: code.as_ptr() as usize,
        size: code.len(),
    }
}

/// In-memory code cache with an optional byte capacity.
#[derive(Debug, Default)]
pub struct JitCodeCache {
    entries: RwLock<HashMap<(MethodId, bool), Arc<[u8]>>>,
    capacity: Option<usize>,
}

impl JitCodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            entries: RwLock::default(),
            capacity: Some(bytes),
        }
    }

    /// Total bytes of committed code.
    pub fn used_bytes(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .map(|code| code.len())
            .sum()
    }

    /// Shared handle to the committed code, if any.
    pub fn code(&self, method: MethodId, osr: bool) -> Option<Arc<[u8]>> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(method, osr))
            .cloned()
    }
}

impl CodeCache for JitCodeCache {
    fn commit(
        &self,
        method: MethodId,
        osr: bool,
        code: Arc<[u8]>,
    ) -> Result<CodeEntry, CodegenError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if let Some(capacity) = self.capacity {
            let replaced = entries.get(&(method, osr)).map_or(0, |c| c.len());
            let used: usize = entries.values().map(|c| c.len()).sum();
            if used - replaced + code.len() > capacity {
                return Err(CodegenError::CodeCacheFull(format!(
                    "method {method} needs {} bytes, {} of {capacity} in use",
                    code.len(),
                    used
                )));
            }
        }
        let entry = entry_of(&code);
        entries.insert((method, osr), code);
        Ok(entry)
    }

    fn lookup(&self, method: MethodId, osr: bool) -> Option<CodeEntry> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(method, osr))
            .map(entry_of)
    }

    fn remove_method(&self, method: MethodId) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|(id, _), _| *id != method);
        before - entries.len()
    }

    fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}
