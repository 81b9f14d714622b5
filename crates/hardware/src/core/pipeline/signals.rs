//! Per-instruction control signals.
//!
//! Everything here is a pure table over the instruction class: which
//! registers an instruction reads and writes, what the ALU operand buses
//! carry, and what (if anything) it does to memory. The stages and the
//! hazard unit both consult these tables, so a given icode can never be
//! decoded two different ways in two places.

use crate::common::Register;
use crate::isa::Icode;

/// What drives the ALU's first operand bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluASel {
    /// The forwarded `valA`.
    ValA,
    /// The constant word.
    ValC,
    /// `+8`, for the stack pops.
    StackInc,
    /// `-8`, for the stack pushes.
    StackDec,
    /// Zero.
    Zero,
}

/// What drives the ALU's second operand bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluBSel {
    /// The forwarded `valB`.
    ValB,
    /// Zero.
    Zero,
}

/// Which computed value addresses a memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemAddr {
    /// The ALU result.
    ValE,
    /// The forwarded `valA` (stack pointer for `popq`/`ret`).
    ValA,
}

/// An instruction's data-memory behavior. Store data is always the
/// carried `valA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemOp {
    /// No data-memory access.
    None,
    /// Read a word.
    Read(MemAddr),
    /// Write a word.
    Write(MemAddr),
}

/// The register `valA` is read from.
pub fn src_a(icode: Icode, ra: Option<Register>) -> Option<Register> {
    match icode {
        Icode::Cmov | Icode::Rmmovq | Icode::Alu | Icode::Pushq => ra,
        Icode::Popq | Icode::Ret => Some(Register::Rsp),
        _ => None,
    }
}

/// The register `valB` is read from.
pub fn src_b(icode: Icode, rb: Option<Register>) -> Option<Register> {
    match icode {
        Icode::Rmmovq | Icode::Mrmovq | Icode::Alu => rb,
        Icode::Pushq | Icode::Popq | Icode::Call | Icode::Ret => Some(Register::Rsp),
        _ => None,
    }
}

/// The register the ALU result retires to (before `cmovXX` gating).
pub fn dst_e(icode: Icode, rb: Option<Register>) -> Option<Register> {
    match icode {
        Icode::Cmov | Icode::Irmovq | Icode::Alu => rb,
        Icode::Pushq | Icode::Popq | Icode::Call | Icode::Ret => Some(Register::Rsp),
        _ => None,
    }
}

/// The register a memory read retires to.
pub fn dst_m(icode: Icode, ra: Option<Register>) -> Option<Register> {
    match icode {
        Icode::Mrmovq | Icode::Popq => ra,
        _ => None,
    }
}

/// First ALU operand selection.
pub fn alu_a(icode: Icode) -> AluASel {
    match icode {
        Icode::Cmov | Icode::Alu => AluASel::ValA,
        Icode::Irmovq | Icode::Rmmovq | Icode::Mrmovq => AluASel::ValC,
        Icode::Popq | Icode::Ret => AluASel::StackInc,
        Icode::Pushq | Icode::Call => AluASel::StackDec,
        _ => AluASel::Zero,
    }
}

/// Second ALU operand selection.
pub fn alu_b(icode: Icode) -> AluBSel {
    match icode {
        Icode::Rmmovq
        | Icode::Mrmovq
        | Icode::Alu
        | Icode::Call
        | Icode::Ret
        | Icode::Pushq
        | Icode::Popq => AluBSel::ValB,
        _ => AluBSel::Zero,
    }
}

/// Data-memory behavior.
pub fn mem_op(icode: Icode) -> MemOp {
    match icode {
        Icode::Rmmovq | Icode::Pushq | Icode::Call => MemOp::Write(MemAddr::ValE),
        Icode::Mrmovq => MemOp::Read(MemAddr::ValE),
        Icode::Popq | Icode::Ret => MemOp::Read(MemAddr::ValA),
        _ => MemOp::None,
    }
}

/// Instructions whose memory-read result feeds a register (the load-use
/// hazard sources).
pub fn is_load(icode: Icode) -> bool {
    matches!(icode, Icode::Mrmovq | Icode::Popq)
}
