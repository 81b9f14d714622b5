//! Memory: the data-cache access.

use tracing::{debug, trace};

use crate::common::Status;
use crate::core::pipeline::latches::{LatchBank, Payload, WritebackEntry};
use crate::core::pipeline::signals::{self, MemAddr, MemOp};
use crate::core::units::Port;
use crate::core::Machine;

/// Evaluates the Memory stage, writing the writeback latch's `next` side.
///
/// Returns `false` while the data cache is servicing a miss; the hazard
/// unit then freezes everything upstream and feeds Writeback bubbles, and
/// this stage re-presents the same access next cycle. The memory image is
/// only touched in the cycle the port reports ready, so a store completes
/// exactly once. Instructions with a non-normal status never touch memory
/// or the cache.
pub fn memory_stage(machine: &mut Machine, bank: &mut LatchBank) -> bool {
    let m = bank.memory.current().clone();
    let mut status = m.status;
    let mut valm = 0;

    if status == Status::Normal {
        match signals::mem_op(m.icode) {
            MemOp::None => {}
            op @ (MemOp::Read(sel) | MemOp::Write(sel)) => {
                let addr = match sel {
                    MemAddr::ValE => m.vale,
                    MemAddr::ValA => m.vala,
                };
                if machine.cache.request(addr) == Port::Busy {
                    debug!(
                        target: "ysim::memory",
                        pc = format_args!("{:#x}", m.pc),
                        addr = format_args!("{addr:#x}"),
                        "cache miss, waiting"
                    );
                    *bank.writeback.next_mut() = WritebackEntry::bubble();
                    return false;
                }
                match op {
                    MemOp::Read(_) => match machine.mem.read_word(addr) {
                        Some(word) => valm = word,
                        None => status = Status::InvalidAddress,
                    },
                    MemOp::Write(_) => {
                        if !machine.mem.write_word(addr, m.vala) {
                            status = Status::InvalidAddress;
                        }
                    }
                    MemOp::None => {}
                }
                trace!(
                    target: "ysim::memory",
                    pc = format_args!("{:#x}", m.pc),
                    addr = format_args!("{addr:#x}"),
                    valm = format_args!("{valm:#x}"),
                    status = %status,
                    "access"
                );
            }
        }
    }

    *bank.writeback.next_mut() = WritebackEntry {
        icode: m.icode,
        ifun: m.ifun,
        vale: m.vale,
        valm,
        dst_e: m.dst_e,
        dst_m: m.dst_m,
        pc: m.pc,
        status,
    };
    true
}
