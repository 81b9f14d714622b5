//! The five-stage pipeline model.
//!
//! One cycle is: commit every latch, evaluate the stages in reverse order
//! (Writeback, Memory, Execute, Decode, Fetch), run the hazard unit, and
//! schedule the latch operations for the next edge. Committing first means
//! each cycle's stage evaluation sees exactly the state the previous
//! cycle's control decisions produced.

/// The hazard/stall unit.
pub mod hazards;
/// Latches and their payloads.
pub mod latches;
/// Per-instruction control-signal tables.
pub mod signals;
/// The stage evaluators.
pub mod stages;

use tracing::debug;

use crate::common::Status;
use crate::core::Machine;

pub use latches::{LatchBank, LatchOp};

/// The pipeline state machine: the latch bank plus the cycle driver.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    /// The five latches.
    pub latches: LatchBank,
}

impl Pipeline {
    /// An empty pipeline, all slots bubbled.
    pub fn new() -> Self {
        Pipeline::default()
    }

    /// Back to power-on state.
    pub fn reset(&mut self) {
        self.latches.reset();
    }

    /// Simulates one clock cycle and returns the run status it leaves the
    /// machine in.
    ///
    /// The run status is the retiring instruction's status, with a bubble
    /// reading as [`Status::Normal`] (an empty retirement slot is not a
    /// condition, it is the absence of one). A poisoned latch short-
    /// circuits everything: the machine stops in `ControlError` without
    /// draining.
    pub fn step(&mut self, machine: &mut Machine) -> Status {
        self.latches.commit_all();
        if self.latches.control_error() {
            machine.status = Status::ControlError;
            return Status::ControlError;
        }

        stages::writeback_stage(machine, &self.latches);
        let dmem_ready = stages::memory_stage(machine, &mut self.latches);
        stages::execute_stage(machine, &mut self.latches);
        stages::decode_stage(machine, &mut self.latches);
        stages::fetch_stage(machine, &mut self.latches);

        let ctl = hazards::evaluate(&self.latches, dmem_ready);
        hazards::apply(&mut self.latches, &ctl);

        machine.cycles += 1;
        let retiring = self.latches.writeback.current();
        let run_status = if retiring.status == Status::Bubble {
            Status::Normal
        } else {
            machine.instructions += 1;
            retiring.status
        };
        machine.status = run_status;

        debug!(
            target: "ysim::pipeline",
            cycle = machine.cycles,
            retired = machine.instructions,
            status = %run_status,
            "cycle"
        );
        run_status
    }

    /// Runs until a terminal status or until either ceiling is reached,
    /// and returns the final run status.
    pub fn run(
        &mut self,
        machine: &mut Machine,
        instr_limit: u64,
        cycle_limit: u64,
    ) -> Status {
        while machine.instructions < instr_limit && machine.cycles < cycle_limit {
            if self.step(machine) != Status::Normal {
                break;
            }
        }
        machine.status
    }
}
