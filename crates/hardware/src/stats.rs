//! End-of-run statistics.

use serde::Serialize;

/// Counters gathered over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SimStats {
    /// Clock cycles simulated, pipeline fill and stalls included.
    pub cycles: u64,
    /// Instructions retired through the writeback boundary.
    pub instructions: u64,
    /// Data-cache hits.
    pub cache_hits: u64,
    /// Data-cache misses.
    pub cache_misses: u64,
    /// Data-cache evictions.
    pub cache_evictions: u64,
}

impl SimStats {
    /// Cycles per retired instruction; zero when nothing retired.
    pub fn cpi(&self) -> f64 {
        if self.instructions == 0 {
            0.0
        } else {
            self.cycles as f64 / self.instructions as f64
        }
    }

    /// Fraction of counted data accesses that hit; zero when the cache
    /// was never touched.
    pub fn cache_hit_rate(&self) -> f64 {
        let accesses = self.cache_hits + self.cache_misses;
        if accesses == 0 {
            0.0
        } else {
            self.cache_hits as f64 / accesses as f64
        }
    }
}

impl std::fmt::Display for SimStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} instructions, {} cycles, CPI {:.2}",
            self.instructions,
            self.cycles,
            self.cpi()
        )?;
        write!(
            f,
            "cache: {} hits, {} misses, {} evictions ({:.1}% hit rate)",
            self.cache_hits,
            self.cache_misses,
            self.cache_evictions,
            self.cache_hit_rate() * 100.0
        )
    }
}
