// This module collects the infrastructure shared by the JIT driver: error types built on
// thiserror, the bumpalo arena pool that compilations allocate scratch memory from and that
// is trimmed after every compile, and the phase timing loggers whose results are folded into
// a process-wide cumulative sink.

//! Core JIT driver infrastructure.
//!
//! # Key Components
//!
//! ## Errors (`error`)
//! - Option, feature, debug info and codegen error enums
//! - Fatal abort path for unparseable configuration
//!
//! ## Arena Pool (`arena`)
//! - Reusable `bumpalo` arenas lent to compiling threads
//! - `trim_maps` releasing idle arena memory
//!
//! ## Timing (`timing`)
//! - RAII phase timing per compile
//! - Cumulative per-phase totals across compiles

pub mod arena;
pub mod error;
pub mod timing;

pub use arena::{ArenaPool, PoolStats, PooledArena};
pub use error::{
    CodegenError, ConfigError, ConfigResult, DebugInfoError, FeatureError, FeatureResult,
};
pub use timing::{CumulativeLogger, ScopedTiming, TimingLogger, JIT_TIMINGS};
