//! Fetch: select the PC, pull the instruction bytes, predict the next PC.

use tracing::debug;

use crate::common::{Register, Status};
use crate::core::pipeline::latches::{DecodeEntry, LatchBank};
use crate::core::Machine;
use crate::isa::{self, Icode, Ifun};

/// Evaluates the Fetch stage, writing the decode latch's `next` side and
/// the fetch latch's own `next` side.
///
/// PC selection prefers a mispredicted branch resolving in Memory (the
/// fall-through address travels in that instruction's `valA`), then a
/// `ret` retiring in Writeback (the return address is its `valM`), then
/// the predicted PC. Instruction fetch reads the memory image directly;
/// only data accesses go through the cache.
pub fn fetch_stage(machine: &Machine, bank: &mut LatchBank) {
    let m = bank.memory.current();
    let w = bank.writeback.current();

    let pc = if m.icode == Icode::Jmp && !m.cond {
        m.vala
    } else if w.icode == Icode::Ret {
        w.valm
    } else {
        bank.fetch.current().pred_pc
    };

    let entry = read_instruction(machine, pc);

    // Taken-control-transfer targets come from the constant word;
    // everything else falls through.
    let pred_pc = if matches!(entry.icode, Icode::Jmp | Icode::Call) {
        entry.valc
    } else {
        entry.valp
    };

    debug!(
        target: "ysim::fetch",
        pc = format_args!("{pc:#x}"),
        instr = isa::instruction_name(entry.icode, entry.ifun),
        status = %entry.status,
        pred_pc = format_args!("{pred_pc:#x}"),
        "fetch"
    );

    bank.fetch.next_mut().pred_pc = pred_pc;
    // The fetch slot itself only reports whether it produced an
    // instruction this cycle.
    bank.fetch.next_mut().status = if entry.status == Status::Normal {
        Status::Normal
    } else {
        Status::Bubble
    };
    *bank.decode.next_mut() = entry;
}

/// Decodes the bytes at `pc` into a decode-latch payload. Failures keep
/// the payload harmless (a `nop` shape) and report through the status:
/// unreadable bytes are `InvalidAddress`, an unknown opcode is
/// `InvalidInstruction`, and `halt` itself fetches fine but carries
/// `Halt`.
fn read_instruction(machine: &Machine, pc: u64) -> DecodeEntry {
    let mut entry = DecodeEntry {
        icode: Icode::Nop,
        ifun: Ifun::None,
        ra: None,
        rb: None,
        valc: 0,
        valp: pc.wrapping_add(1),
        pc,
        status: Status::Normal,
    };

    let Some(opcode) = machine.mem.read_byte(pc) else {
        entry.status = Status::InvalidAddress;
        return entry;
    };

    let decoded = Icode::from_nibble(opcode >> 4)
        .and_then(|icode| Ifun::decode(icode, opcode & 0xF).map(|ifun| (icode, ifun)));
    let Some((icode, ifun)) = decoded else {
        entry.status = Status::InvalidInstruction;
        return entry;
    };
    entry.icode = icode;
    entry.ifun = ifun;
    entry.valp = pc.wrapping_add(icode.len());

    let mut operand_pc = pc.wrapping_add(1);
    if icode.needs_regids() {
        let Some(regids) = machine.mem.read_byte(operand_pc) else {
            entry.status = Status::InvalidAddress;
            return entry;
        };
        entry.ra = Register::from_nibble(regids >> 4);
        entry.rb = Register::from_nibble(regids & 0xF);
        operand_pc = operand_pc.wrapping_add(1);
    }
    if icode.needs_valc() {
        let Some(valc) = machine.mem.read_word(operand_pc) else {
            entry.status = Status::InvalidAddress;
            return entry;
        };
        entry.valc = valc;
    }

    if icode == Icode::Halt {
        entry.status = Status::Halt;
    }
    entry
}
