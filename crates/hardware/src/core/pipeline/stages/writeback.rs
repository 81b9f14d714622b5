//! Writeback: retire results into the register file.

use tracing::trace;

use crate::common::Status;
use crate::core::pipeline::latches::LatchBank;
use crate::core::Machine;

/// Evaluates the Writeback stage. This is the only place the register
/// file is written.
///
/// `dstE` retires before `dstM`, so `popq %rsp` leaves the loaded word in
/// `%rsp` rather than the incremented stack pointer. Only normally
/// completing instructions retire state; bubbles and exception carriers
/// write nothing.
pub fn writeback_stage(machine: &mut Machine, bank: &LatchBank) {
    let w = bank.writeback.current();
    if w.status != Status::Normal {
        return;
    }
    machine.regs.write(w.dst_e, w.vale);
    machine.regs.write(w.dst_m, w.valm);
    if w.dst_e.is_some() || w.dst_m.is_some() {
        trace!(
            target: "ysim::writeback",
            pc = format_args!("{:#x}", w.pc),
            "retire"
        );
    }
}
