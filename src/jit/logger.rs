//! Perf map diagnostics log.
//!
//! While debug info generation is enabled the JIT records every committed
//! method in `perf-<pid>.map`, one `"{addr:x} {size:x} {name}"` line per
//! method, so external profilers can symbolize JIT code.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::cache::CodeEntry;

pub struct JitLogger {
    path: PathBuf,
    file: Mutex<Option<BufWriter<File>>>,
}

impl JitLogger {
    /// Open the perf map in `dir`.
    ///
    /// A file that cannot be created is logged and leaves the logger
    /// inert; compilation is never blocked on diagnostics.
    pub fn open(dir: &Path) -> Self {
        let path = dir.join(format!("perf-{}.map", std::process::id()));
        let file = match File::create(&path) {
            Ok(file) => {
                log::info!("JIT perf map opened at {}", path.display());
                Some(BufWriter::new(file))
            }
            Err(e) => {
                log::warn!("Could not create perf map {}: {}", path.display(), e);
                None
            }
        };
        Self {
            path,
            file: Mutex::new(file),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.file.lock().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    pub fn write_log(&self, entry: &CodeEntry, name: &str) {
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(out) = file.as_mut() {
            if let Err(e) = writeln!(out, "{:x} {:x} {}", entry.code_ptr, entry.size, name) {
                log::warn!("Failed to write perf map entry for {}: {}", name, e);
            }
        }
    }

    /// Flush and close the log. Later writes are dropped.
    pub fn close_log(&self) {
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(mut out) = file.take() {
            if let Err(e) = out.flush() {
                log::warn!("Failed to flush perf map {}: {}", self.path.display(), e);
            }
            log::debug!("JIT perf map closed");
        }
    }
}

impl Drop for JitLogger {
    fn drop(&mut self) {
        self.close_log();
    }
}
