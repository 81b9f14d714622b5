//! Run and cache configuration.
//!
//! Both structs deserialize from the CLI or from a config file and carry
//! defaults matching the classic simulator: a 64 KiB memory image, a
//! 10 000-instruction ceiling, and five cycles of headroom per
//! instruction.

use serde::Deserialize;

use crate::common::SimError;

/// Geometry and timing of the data cache.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// `s`: the set index is `s` bits wide (`2^s` sets).
    pub set_bits: u32,
    /// `b`: the block offset is `b` bits wide (`2^b`-byte blocks).
    pub block_bits: u32,
    /// `E`: lines per set.
    pub associativity: usize,
    /// Extra cycles a data access stalls the pipeline on a miss.
    pub miss_penalty: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            set_bits: 3,
            block_bits: 4,
            associativity: 2,
            miss_penalty: 10,
        }
    }
}

/// Limits and options for one simulation run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Memory image size in bytes.
    pub mem_size: usize,
    /// Stop after this many retired instructions.
    pub instr_limit: u64,
    /// Stop after this many cycles; `None` allows five cycles per
    /// permitted instruction.
    pub cycle_limit: Option<u64>,
    /// Cross-check the final state against the sequential reference
    /// interpreter.
    pub check: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            mem_size: 1 << 16,
            instr_limit: 10_000,
            cycle_limit: None,
            check: false,
        }
    }
}

impl RunConfig {
    /// The effective cycle ceiling.
    pub fn effective_cycle_limit(&self) -> u64 {
        self.cycle_limit
            .unwrap_or_else(|| self.instr_limit.saturating_mul(5))
    }

    /// Sanity-checks the limits.
    ///
    /// # Errors
    ///
    /// Rejects a zero-byte memory image and zero ceilings.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.mem_size == 0 {
            return Err(SimError::Config(String::from("memory size must be nonzero")));
        }
        if self.instr_limit == 0 {
            return Err(SimError::Config(String::from(
                "instruction limit must be nonzero",
            )));
        }
        if self.effective_cycle_limit() == 0 {
            return Err(SimError::Config(String::from("cycle limit must be nonzero")));
        }
        Ok(())
    }
}
