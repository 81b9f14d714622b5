//! Execute: ALU, condition codes, branch and move conditions.

use tracing::trace;

use crate::common::Status;
use crate::core::pipeline::latches::{LatchBank, MemoryEntry};
use crate::core::pipeline::signals::{self, AluASel, AluBSel};
use crate::core::{alu, Machine};
use crate::isa::{AluFn, Icode, Ifun};

/// Evaluates the Execute stage, writing the memory latch's `next` side.
///
/// Condition codes commit here, not at retirement, so a `jXX` one cycle
/// behind an `OPq` resolves against the right flags. An exception already
/// past Memory suppresses the update: the flag write belongs to an
/// instruction that architecturally never ran.
pub fn execute_stage(machine: &mut Machine, bank: &mut LatchBank) {
    let e = bank.execute.current().clone();

    let a = match signals::alu_a(e.icode) {
        AluASel::ValA => e.vala,
        AluASel::ValC => e.valc,
        AluASel::StackInc => 8,
        AluASel::StackDec => (-8i64) as u64,
        AluASel::Zero => 0,
    };
    let b = match signals::alu_b(e.icode) {
        AluBSel::ValB => e.valb,
        AluBSel::Zero => 0,
    };
    let alu_fn = match e.ifun {
        Ifun::Alu(f) => f,
        _ => AluFn::Add,
    };
    let vale = alu::compute(alu_fn, a, b);

    let exception_in_flight = bank.writeback.next().status.is_exception()
        || bank.writeback.current().status.is_exception();
    if e.icode == Icode::Alu && e.status == Status::Normal && !exception_in_flight {
        machine.cc = alu::flags(alu_fn, a, b);
    }

    // The condition reads the flags as updated above; a cmov after an OPq
    // sees the fresh outcome.
    let cond = match e.ifun {
        Ifun::Cond(c) => c.holds(machine.cc),
        _ => true,
    };
    let dst_e = if e.icode == Icode::Cmov && !cond {
        None
    } else {
        e.dst_e
    };

    trace!(
        target: "ysim::execute",
        pc = format_args!("{:#x}", e.pc),
        vale = format_args!("{vale:#x}"),
        cond,
        "execute"
    );

    *bank.memory.next_mut() = MemoryEntry {
        icode: e.icode,
        ifun: e.ifun,
        cond,
        vale,
        vala: e.vala,
        src_a: e.src_a,
        dst_e,
        dst_m: e.dst_m,
        pc: e.pc,
        status: e.status,
    };
}
