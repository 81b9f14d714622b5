//! A cycle-accurate Y86-64 pipelined processor simulator.
//!
//! The model is the classic five-stage pipeline (Fetch, Decode, Execute,
//! Memory, Writeback) with forwarding, hazard-driven stalls and bubbles,
//! and a set-associative LRU data cache that charges a configurable miss
//! penalty. A sequential reference interpreter runs the same ISA tables
//! for cross-checking.
//!
//! ```no_run
//! use ysim_core::config::{CacheConfig, RunConfig};
//! use ysim_core::sim::Simulator;
//!
//! # fn main() -> Result<(), ysim_core::common::SimError> {
//! let mut sim = Simulator::load_file(
//!     RunConfig::default(),
//!     &CacheConfig::default(),
//!     "prog.yo",
//! )?;
//! let report = sim.run();
//! println!("{} in {} cycles", report.status, report.stats.cycles);
//! # Ok(())
//! # }
//! ```

/// Shared vocabulary: status, errors, registers, flags.
pub mod common;
/// Run and cache configuration.
pub mod config;
/// The machine: memory, ALU, cache, pipeline.
pub mod core;
/// The instruction set.
pub mod isa;
/// Loader, reference interpreter, run harness.
pub mod sim;
/// End-of-run statistics.
pub mod stats;

pub use crate::common::{SimError, Status};
pub use crate::config::{CacheConfig, RunConfig};
pub use crate::core::pipeline::Pipeline;
pub use crate::core::Machine;
pub use crate::sim::Simulator;
pub use crate::stats::SimStats;
