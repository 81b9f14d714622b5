//! The simulated machine: architectural state plus the pipeline model.

/// ALU value and flag computation.
pub mod alu;
/// The flat memory image.
pub mod memory;
/// The five-stage pipeline.
pub mod pipeline;
/// Timing-model units (the data cache).
pub mod units;

use crate::common::{ConditionCodes, RegisterFile, SimError, Status};
use crate::config::CacheConfig;

pub use memory::{MemDelta, Memory};
pub use units::Cache;

/// Architectural state plus the run counters. The pipeline latches live
/// separately in [`pipeline::Pipeline`]; everything an instruction can
/// observe or retire into is here.
#[derive(Debug, Clone)]
pub struct Machine {
    /// The memory image.
    pub mem: Memory,
    /// The register file.
    pub regs: RegisterFile,
    /// The condition codes.
    pub cc: ConditionCodes,
    /// The data cache.
    pub cache: Cache,
    /// Status of the run as a whole, derived from the retiring
    /// instruction each cycle.
    pub status: Status,
    /// Cycles simulated so far.
    pub cycles: u64,
    /// Instructions retired so far.
    pub instructions: u64,
}

impl Machine {
    /// A powered-on machine with a zeroed image of `mem_size` bytes.
    ///
    /// # Errors
    ///
    /// Fails if the cache geometry cannot be built.
    pub fn new(mem_size: usize, cache_config: &CacheConfig) -> Result<Self, SimError> {
        Ok(Machine {
            mem: Memory::new(mem_size),
            regs: RegisterFile::new(),
            cc: ConditionCodes::default(),
            cache: Cache::new(cache_config)?,
            status: Status::Normal,
            cycles: 0,
            instructions: 0,
        })
    }

    /// Clears registers, flags, cache contents and counters, and the run
    /// counters. The memory image is left alone; reload it for a fresh
    /// program.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.cc = ConditionCodes::default();
        self.cache.reset();
        self.status = Status::Normal;
        self.cycles = 0;
        self.instructions = 0;
    }
}
