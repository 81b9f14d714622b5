//! Pipeline latches: the double-buffered state between stages.
//!
//! Each latch holds a `current` payload (what the downstream stage reads
//! this cycle) and a `next` payload (what the upstream stage computed for
//! the following cycle), plus an operation chosen by the hazard unit. At
//! the top of every cycle [`Latch::commit`] applies the operation:
//!
//! | op       | effect                                        |
//! |----------|-----------------------------------------------|
//! | `Load`   | `current <- next`                             |
//! | `Stall`  | `current` kept                                |
//! | `Bubble` | `current <- bubble payload`                   |
//! | `Error`  | bubble with `ControlError` status, and sticky |
//!
//! `Load` is restored after every commit except `Error`, which latches
//! permanently; a stall and a bubble requested in the same cycle is a
//! control-logic contradiction, not a recoverable condition.

use crate::common::{Register, Status};
use crate::isa::{Icode, Ifun};

/// What a latch does at the next clock edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LatchOp {
    /// Normal flow: adopt the upstream stage's output.
    #[default]
    Load,
    /// Hold the current payload; the upstream output is discarded.
    Stall,
    /// Replace the current payload with the no-op bubble.
    Bubble,
    /// Stall and bubble were both requested; poisons the latch.
    Error,
}

/// A latch payload: one instruction's worth of state at a stage boundary.
pub trait Payload: Clone + std::fmt::Debug {
    /// The payload an empty latch slot carries.
    fn bubble() -> Self;
    /// The instruction status travelling with this payload.
    fn status(&self) -> Status;
    /// Overwrites the travelling status.
    fn set_status(&mut self, status: Status);
}

/// A double-buffered pipeline latch.
#[derive(Debug, Clone)]
pub struct Latch<P: Payload> {
    current: P,
    next: P,
    op: LatchOp,
}

impl<P: Payload> Default for Latch<P> {
    fn default() -> Self {
        Latch {
            current: P::bubble(),
            next: P::bubble(),
            op: LatchOp::Load,
        }
    }
}

impl<P: Payload> Latch<P> {
    /// The side the downstream stage reads this cycle.
    pub fn current(&self) -> &P {
        &self.current
    }

    /// The side the upstream stage wrote this cycle.
    pub fn next(&self) -> &P {
        &self.next
    }

    /// Write access to the upstream side. Exactly one stage writes each
    /// latch's `next` per cycle.
    pub fn next_mut(&mut self) -> &mut P {
        &mut self.next
    }

    /// The operation the hazard unit scheduled for the coming edge.
    pub fn op(&self) -> LatchOp {
        self.op
    }

    /// Schedules the operation for the coming edge. A poisoned latch
    /// ignores further scheduling.
    pub fn set_op(&mut self, op: LatchOp) {
        if self.op != LatchOp::Error {
            self.op = op;
        }
    }

    /// Applies the scheduled operation at the clock edge.
    pub fn commit(&mut self) {
        match self.op {
            LatchOp::Load => self.current = self.next.clone(),
            LatchOp::Stall => {}
            LatchOp::Bubble => self.current = P::bubble(),
            LatchOp::Error => {
                self.current = P::bubble();
                self.current.set_status(Status::ControlError);
                return;
            }
        }
        self.op = LatchOp::Load;
    }

    /// Back to power-on state: both sides bubbled, op `Load`.
    pub fn reset(&mut self) {
        *self = Latch::default();
    }
}

/// State entering Fetch: the predicted program counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchEntry {
    /// Where fetch will look next absent any redirect.
    pub pred_pc: u64,
    /// Status of the fetch slot.
    pub status: Status,
}

impl Payload for FetchEntry {
    fn bubble() -> Self {
        FetchEntry {
            pred_pc: 0,
            status: Status::Normal,
        }
    }
    fn status(&self) -> Status {
        self.status
    }
    fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}

/// State entering Decode: the raw decoded fields of one instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeEntry {
    /// Instruction class.
    pub icode: Icode,
    /// Function nibble, typed.
    pub ifun: Ifun,
    /// First register specifier.
    pub ra: Option<Register>,
    /// Second register specifier.
    pub rb: Option<Register>,
    /// Constant word, if the encoding carries one.
    pub valc: u64,
    /// Address of the following instruction.
    pub valp: u64,
    /// Address this instruction was fetched from.
    pub pc: u64,
    /// Travelling status.
    pub status: Status,
}

impl Payload for DecodeEntry {
    fn bubble() -> Self {
        DecodeEntry {
            icode: Icode::Nop,
            ifun: Ifun::None,
            ra: None,
            rb: None,
            valc: 0,
            valp: 0,
            pc: 0,
            status: Status::Bubble,
        }
    }
    fn status(&self) -> Status {
        self.status
    }
    fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}

/// State entering Execute: operands selected and sources resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteEntry {
    /// Instruction class.
    pub icode: Icode,
    /// Function nibble, typed.
    pub ifun: Ifun,
    /// Constant word.
    pub valc: u64,
    /// First operand (forwarded).
    pub vala: u64,
    /// Second operand (forwarded).
    pub valb: u64,
    /// Where `vala` architecturally came from.
    pub src_a: Option<Register>,
    /// Where `valb` architecturally came from.
    pub src_b: Option<Register>,
    /// ALU-result destination.
    pub dst_e: Option<Register>,
    /// Memory-read destination.
    pub dst_m: Option<Register>,
    /// Fetch address, for traces.
    pub pc: u64,
    /// Travelling status.
    pub status: Status,
}

impl Payload for ExecuteEntry {
    fn bubble() -> Self {
        ExecuteEntry {
            icode: Icode::Nop,
            ifun: Ifun::None,
            valc: 0,
            vala: 0,
            valb: 0,
            src_a: None,
            src_b: None,
            dst_e: None,
            dst_m: None,
            pc: 0,
            status: Status::Bubble,
        }
    }
    fn status(&self) -> Status {
        self.status
    }
    fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}

/// State entering Memory: the ALU result and the branch outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryEntry {
    /// Instruction class.
    pub icode: Icode,
    /// Function nibble, typed.
    pub ifun: Ifun,
    /// Branch / move condition outcome from Execute.
    pub cond: bool,
    /// ALU result.
    pub vale: u64,
    /// First operand, carried through (store data, or `valp` for
    /// call/jump).
    pub vala: u64,
    /// Source of `vala`, carried for the forwarding probes.
    pub src_a: Option<Register>,
    /// ALU-result destination (already gated for a failed `cmovXX`).
    pub dst_e: Option<Register>,
    /// Memory-read destination.
    pub dst_m: Option<Register>,
    /// Fetch address, for traces.
    pub pc: u64,
    /// Travelling status.
    pub status: Status,
}

impl Payload for MemoryEntry {
    fn bubble() -> Self {
        MemoryEntry {
            icode: Icode::Nop,
            ifun: Ifun::None,
            cond: false,
            vale: 0,
            vala: 0,
            src_a: None,
            dst_e: None,
            dst_m: None,
            pc: 0,
            status: Status::Bubble,
        }
    }
    fn status(&self) -> Status {
        self.status
    }
    fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}

/// State entering Writeback: everything needed to retire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritebackEntry {
    /// Instruction class.
    pub icode: Icode,
    /// Function nibble, typed.
    pub ifun: Ifun,
    /// ALU result.
    pub vale: u64,
    /// Memory-read result.
    pub valm: u64,
    /// ALU-result destination.
    pub dst_e: Option<Register>,
    /// Memory-read destination.
    pub dst_m: Option<Register>,
    /// Fetch address, for traces.
    pub pc: u64,
    /// Travelling status.
    pub status: Status,
}

impl Payload for WritebackEntry {
    fn bubble() -> Self {
        WritebackEntry {
            icode: Icode::Nop,
            ifun: Ifun::None,
            vale: 0,
            valm: 0,
            dst_e: None,
            dst_m: None,
            pc: 0,
            status: Status::Bubble,
        }
    }
    fn status(&self) -> Status {
        self.status
    }
    fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}

/// The five latches of the pipeline. Each is named for the stage that
/// reads its `current` side.
#[derive(Debug, Clone, Default)]
pub struct LatchBank {
    /// Feeds Fetch (holds the predicted PC).
    pub fetch: Latch<FetchEntry>,
    /// Feeds Decode.
    pub decode: Latch<DecodeEntry>,
    /// Feeds Execute.
    pub execute: Latch<ExecuteEntry>,
    /// Feeds Memory.
    pub memory: Latch<MemoryEntry>,
    /// Feeds Writeback.
    pub writeback: Latch<WritebackEntry>,
}

impl LatchBank {
    /// Fresh bank: every slot a bubble.
    pub fn new() -> Self {
        LatchBank::default()
    }

    /// Commits every latch at the clock edge.
    pub fn commit_all(&mut self) {
        self.fetch.commit();
        self.decode.commit();
        self.execute.commit();
        self.memory.commit();
        self.writeback.commit();
    }

    /// True once any latch has been poisoned by a stall/bubble conflict.
    pub fn control_error(&self) -> bool {
        self.fetch.current().status() == Status::ControlError
            || self.decode.current().status() == Status::ControlError
            || self.execute.current().status() == Status::ControlError
            || self.memory.current().status() == Status::ControlError
            || self.writeback.current().status() == Status::ControlError
    }

    /// Back to power-on state.
    pub fn reset(&mut self) {
        *self = LatchBank::default();
    }
}
