//! Phase timing for JIT compilations.
//!
//! Each compile records its phases into a [`TimingLogger`] through RAII
//! [`ScopedTiming`] guards. Finished loggers are folded into a
//! [`CumulativeLogger`], by default the process-wide [`JIT_TIMINGS`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{LazyLock, Mutex};
use std::time::{Duration, Instant};

/// Name of the per-compile timing logger.
pub const JIT_TIMING_LOGGER_NAME: &str = "JIT compiler timing logger";

/// Phase label for backend code generation.
pub const PHASE_COMPILING: &str = "Compiling";

/// Phase label for the post-compile arena trim.
pub const PHASE_TRIM_MAPS: &str = "TrimMaps";

/// Ordered list of timed phases for a single operation.
#[derive(Debug, Clone)]
pub struct TimingLogger {
    name: &'static str,
    verbose: bool,
    splits: Vec<(&'static str, Duration)>,
}

impl TimingLogger {
    pub fn new(name: &'static str, verbose: bool) -> Self {
        Self {
            name,
            verbose,
            splits: Vec::new(),
        }
    }

    /// Logger for one JIT compile; per-phase traces follow the trace log level.
    pub fn for_jit_compile() -> Self {
        Self::new(JIT_TIMING_LOGGER_NAME, log::log_enabled!(log::Level::Trace))
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Start timing `label`; the phase ends when the guard is dropped.
    pub fn scoped(&mut self, label: &'static str) -> ScopedTiming<'_> {
        ScopedTiming {
            logger: self,
            label,
            start: Instant::now(),
        }
    }

    /// Record an already measured phase.
    pub fn record(&mut self, label: &'static str, duration: Duration) {
        if self.verbose {
            log::trace!("{}: {} took {:?}", self.name, label, duration);
        }
        self.splits.push((label, duration));
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn splits(&self) -> &[(&'static str, Duration)] {
        &self.splits
    }

    pub fn total(&self) -> Duration {
        self.splits.iter().map(|(_, d)| *d).sum()
    }

    pub fn duration_of(&self, label: &str) -> Option<Duration> {
        self.splits
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, d)| *d)
    }
}

impl fmt::Display for TimingLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: total {:?}", self.name, self.total())?;
        for (label, duration) in &self.splits {
            writeln!(f, "  {:?} {}", duration, label)?;
        }
        Ok(())
    }
}

/// Guard measuring one phase of a [`TimingLogger`].
pub struct ScopedTiming<'a> {
    logger: &'a mut TimingLogger,
    label: &'static str,
    start: Instant,
}

impl Drop for ScopedTiming<'_> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        self.logger.record(self.label, elapsed);
    }
}

/// Aggregated phase durations over many timing loggers.
#[derive(Default, Debug)]
pub struct CumulativeLogger {
    totals: HashMap<&'static str, Duration>,
    counts: HashMap<&'static str, u64>,
    iterations: u64,
}

impl CumulativeLogger {
    pub fn add_logger(&mut self, logger: &TimingLogger) {
        for (label, duration) in logger.splits() {
            *self.totals.entry(*label).or_default() += *duration;
            *self.counts.entry(*label).or_default() += 1;
        }
        self.iterations += 1;
    }

    /// Per-phase `(label, average, total, count)`, slowest average first.
    pub fn info(&self) -> Vec<(&'static str, Duration, Duration, u64)> {
        let mut average: Vec<_> = self
            .totals
            .iter()
            .filter_map(|(label, total)| {
                let count = *self.counts.get(label).unwrap_or(&0);
                (count > 0).then(|| {
                    (
                        *label,
                        *total / count as u32,
                        *total,
                        count,
                    )
                })
            })
            .collect();
        average.sort_by(|a, b| b.1.cmp(&a.1));
        average
    }

    pub fn info_pretty(&self) -> String {
        let mut out = format!(
            "[PERF] JIT timings (iterations={}, total={:?}):\n",
            self.iterations,
            self.total()
        );
        for (label, avg, total, count) in self.info() {
            out.push_str(&format!(
                "  {:<12} avg={:?} total={:?} count={}\n",
                label, avg, total, count
            ));
        }
        out
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn count(&self, label: &str) -> u64 {
        self.counts.get(label).copied().unwrap_or(0)
    }

    pub fn total_for(&self, label: &str) -> Duration {
        self.totals.get(label).copied().unwrap_or_default()
    }

    pub fn total(&self) -> Duration {
        self.totals.values().sum()
    }

    pub fn reset(&mut self) {
        self.totals.clear();
        self.counts.clear();
        self.iterations = 0;
    }
}

/// Process-wide sink for JIT compile timings.
pub static JIT_TIMINGS: LazyLock<Mutex<CumulativeLogger>> =
    LazyLock::new(|| Mutex::new(CumulativeLogger::default()));
