//! Decode: resolve source registers and forward the freshest values.

use tracing::trace;

use crate::common::{Register, RegisterFile};
use crate::core::pipeline::latches::{ExecuteEntry, LatchBank};
use crate::core::pipeline::signals;
use crate::core::Machine;
use crate::isa::Icode;

/// Evaluates the Decode stage, writing the execute latch's `next` side.
///
/// `call` and `jXX` route their fall-through address (`valP`) down the
/// `valA` bus; Memory and Writeback pick it back up for misprediction
/// recovery and the return push. All other `valA`/`valB` reads go through
/// the forwarding network.
pub fn decode_stage(machine: &Machine, bank: &mut LatchBank) {
    let d = bank.decode.current().clone();

    let src_a = signals::src_a(d.icode, d.ra);
    let src_b = signals::src_b(d.icode, d.rb);

    let vala = if matches!(d.icode, Icode::Call | Icode::Jmp) {
        d.valp
    } else {
        forward(src_a, bank, &machine.regs)
    };
    let valb = forward(src_b, bank, &machine.regs);

    trace!(
        target: "ysim::decode",
        pc = format_args!("{:#x}", d.pc),
        vala = format_args!("{vala:#x}"),
        valb = format_args!("{valb:#x}"),
        "decode"
    );

    *bank.execute.next_mut() = ExecuteEntry {
        icode: d.icode,
        ifun: d.ifun,
        valc: d.valc,
        vala,
        valb,
        src_a,
        src_b,
        dst_e: signals::dst_e(d.icode, d.rb),
        dst_m: signals::dst_m(d.icode, d.ra),
        pc: d.pc,
        status: d.status,
    };
}

/// The forwarding network: the value of `src` as the youngest in-flight
/// producer sees it.
///
/// Probe order, freshest first:
/// 1. the ALU result computed this cycle (memory latch `next`, `dstE`),
/// 2. the ALU result one cycle older (memory latch `current`, `dstE`),
/// 3. the memory word read this cycle (writeback latch `next`, `dstM`),
/// 4. the retiring instruction, its load result before its ALU result
///    (writeback latch `current`, `dstM` then `dstE`),
/// 5. the register file.
fn forward(src: Option<Register>, bank: &LatchBank, regs: &RegisterFile) -> u64 {
    let Some(reg) = src else {
        return 0;
    };
    let src = Some(reg);

    let m_next = bank.memory.next();
    if m_next.dst_e == src {
        return m_next.vale;
    }
    let m = bank.memory.current();
    if m.dst_e == src {
        return m.vale;
    }
    let w_next = bank.writeback.next();
    if w_next.dst_m == src {
        return w_next.valm;
    }
    let w = bank.writeback.current();
    if w.dst_m == src {
        return w.valm;
    }
    if w.dst_e == src {
        return w.vale;
    }
    regs.read(src)
}
