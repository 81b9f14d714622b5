//! The run harness: load a program, run the pipeline, report.

use std::io::BufRead;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::common::{ConditionCodes, RegDelta, RegisterFile, SimError, Status};
use crate::config::{CacheConfig, RunConfig};
use crate::core::pipeline::Pipeline;
use crate::core::{Machine, MemDelta, Memory};
use crate::sim::loader;
use crate::sim::oracle::Oracle;
use crate::stats::SimStats;

/// Outcome of the cross-check against the sequential reference.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// True when both machines agree on registers, memory and flags.
    pub matched: bool,
    /// Registers where they disagree (`old` = reference, `new` =
    /// pipeline).
    pub reg_mismatches: Vec<RegDelta>,
    /// Memory words where they disagree.
    pub mem_mismatches: Vec<MemDelta>,
    /// Whether the condition codes agree.
    pub cc_matched: bool,
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Final run status.
    pub status: Status,
    /// Final condition codes.
    pub cc: ConditionCodes,
    /// Cycle, instruction and cache counters.
    pub stats: SimStats,
    /// Registers changed relative to power-on.
    pub reg_changes: Vec<RegDelta>,
    /// Memory words changed relative to the loaded image.
    pub mem_changes: Vec<MemDelta>,
    /// Reference cross-check, when requested.
    pub check: Option<CheckResult>,
}

/// A loaded, ready-to-run simulation.
#[derive(Debug)]
pub struct Simulator {
    machine: Machine,
    pipeline: Pipeline,
    run_config: RunConfig,
    /// The image as loaded, for diffs and for the reference run.
    initial_mem: Memory,
}

impl Simulator {
    /// Builds a simulator over an already-opened object file.
    ///
    /// # Errors
    ///
    /// Configuration problems or a rejected object file.
    pub fn load<R: BufRead>(
        run_config: RunConfig,
        cache_config: &CacheConfig,
        object: R,
    ) -> Result<Self, SimError> {
        run_config.validate()?;
        let mut machine = Machine::new(run_config.mem_size, cache_config)?;
        let loaded = loader::load_object(&mut machine.mem, object)?;
        info!(target: "ysim::sim", bytes = loaded, "simulator ready");
        Ok(Simulator {
            initial_mem: machine.mem.clone(),
            machine,
            pipeline: Pipeline::new(),
            run_config,
        })
    }

    /// Builds a simulator from an object file on disk.
    ///
    /// # Errors
    ///
    /// As [`Simulator::load`], plus I/O failures opening the file.
    pub fn load_file<P: AsRef<Path>>(
        run_config: RunConfig,
        cache_config: &CacheConfig,
        path: P,
    ) -> Result<Self, SimError> {
        run_config.validate()?;
        let mut machine = Machine::new(run_config.mem_size, cache_config)?;
        let loaded = loader::load_object_file(&mut machine.mem, path)?;
        info!(target: "ysim::sim", bytes = loaded, "simulator ready");
        Ok(Simulator {
            initial_mem: machine.mem.clone(),
            machine,
            pipeline: Pipeline::new(),
            run_config,
        })
    }

    /// The machine, for inspection between or after runs.
    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    /// Runs to completion (terminal status or a ceiling) and reports.
    pub fn run(&mut self) -> Report {
        let status = self.pipeline.run(
            &mut self.machine,
            self.run_config.instr_limit,
            self.run_config.effective_cycle_limit(),
        );

        let stats = SimStats {
            cycles: self.machine.cycles,
            instructions: self.machine.instructions,
            cache_hits: self.machine.cache.hits(),
            cache_misses: self.machine.cache.misses(),
            cache_evictions: self.machine.cache.evictions(),
        };

        let check = self.run_config.check.then(|| self.cross_check());

        Report {
            status,
            cc: self.machine.cc,
            stats,
            reg_changes: RegisterFile::new().diff(&self.machine.regs),
            mem_changes: self.initial_mem.diff(&self.machine.mem),
            check,
        }
    }

    /// Re-runs the program on the sequential reference and diffs the two
    /// final states.
    fn cross_check(&self) -> CheckResult {
        let mut oracle = Oracle::new(self.initial_mem.clone());
        oracle.run(self.run_config.instr_limit);

        let reg_mismatches = oracle.regs.diff(&self.machine.regs);
        let mem_mismatches = oracle.mem.diff(&self.machine.mem);
        let cc_matched = oracle.cc == self.machine.cc;
        CheckResult {
            matched: reg_mismatches.is_empty() && mem_mismatches.is_empty() && cc_matched,
            reg_mismatches,
            mem_mismatches,
            cc_matched,
        }
    }
}
