// This module provides the arena pool backing JIT compilations, built on the bumpalo crate.
// Backends acquire a PooledArena for scratch allocations during a compile; dropping the guard
// resets the arena and returns it to the pool, so its chunks stay mapped for reuse by the next
// compile. `trim_maps` is the maintenance pass run after every compile: it drops the chunks of
// all idle arenas and hands the memory back to the system allocator, reporting how many bytes
// were released. PoolStats records acquisitions, trims and released bytes for diagnostics.

//! Arena pool for compiler scratch memory.
//!
//! Compilations allocate from [`bumpalo::Bump`] arenas borrowed from an
//! [`ArenaPool`]. Idle arenas keep their chunks until [`ArenaPool::trim_maps`]
//! releases them.

use bumpalo::Bump;
use std::fmt;
use std::ops::Deref;
use std::sync::Mutex;

/// Pool of reusable bump arenas shared by all compiling threads.
pub struct ArenaPool {
    /// Arenas not currently lent out.
    free: Mutex<Vec<Bump>>,

    /// Pool statistics.
    stats: Mutex<PoolStats>,
}

impl ArenaPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            stats: Mutex::new(PoolStats::default()),
        }
    }

    /// Borrow an arena from the pool, creating one if none is idle.
    pub fn acquire(&self) -> PooledArena<'_> {
        let arena = self
            .free
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop()
            .unwrap_or_default();
        self.stats.lock().unwrap_or_else(|e| e.into_inner()).acquisitions += 1;
        PooledArena { pool: self, arena }
    }

    /// Release the memory held by idle arenas.
    ///
    /// Returns the number of bytes handed back to the allocator.
    pub fn trim_maps(&self) -> usize {
        let mut free = self.free.lock().unwrap_or_else(|e| e.into_inner());
        let mut released = 0;
        for arena in free.iter_mut() {
            released += arena.allocated_bytes();
            *arena = Bump::new();
        }
        drop(free);

        let mut stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
        stats.trims += 1;
        stats.bytes_released += released;
        log::trace!("Trimmed arena pool, released {} bytes", released);
        released
    }

    /// Bytes currently reserved by idle arenas.
    pub fn idle_bytes(&self) -> usize {
        self.free
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(Bump::allocated_bytes)
            .sum()
    }

    /// Number of idle arenas.
    pub fn idle_arenas(&self) -> usize {
        self.free.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Snapshot of the pool statistics.
    pub fn stats(&self) -> PoolStats {
        self.stats.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn release(&self, mut arena: Bump) {
        arena.reset();
        self.free
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(arena);
    }
}

impl Default for ArenaPool {
    fn default() -> Self {
        Self::new()
    }
}

/// An arena lent out by an [`ArenaPool`]; returned to the pool on drop.
pub struct PooledArena<'pool> {
    pool: &'pool ArenaPool,
    arena: Bump,
}

impl Deref for PooledArena<'_> {
    type Target = Bump;

    fn deref(&self) -> &Bump {
        &self.arena
    }
}

impl Drop for PooledArena<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.arena));
    }
}

/// Arena pool statistics.
#[derive(Debug, Default, Clone)]
pub struct PoolStats {
    /// Number of arenas lent out.
    pub acquisitions: usize,

    /// Number of trim passes.
    pub trims: usize,

    /// Total bytes released by trimming.
    pub bytes_released: usize,
}

impl fmt::Display for PoolStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Arena Pool Statistics:")?;
        writeln!(f, "  Acquisitions: {}", self.acquisitions)?;
        writeln!(f, "  Trims: {}", self.trims)?;
        writeln!(f, "  Bytes released: {}", self.bytes_released)
    }
}
