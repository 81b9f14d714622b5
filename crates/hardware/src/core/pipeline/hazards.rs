//! The hazard unit: stall and bubble decisions for the coming clock edge.
//!
//! Runs after all five stage evaluators. It reads the `current` sides of
//! the latch bank plus exactly two `next` sides computed this cycle: the
//! branch outcome entering the memory latch and the status entering the
//! writeback latch.

use tracing::{error, trace};

use crate::core::pipeline::latches::{LatchBank, LatchOp};
use crate::core::pipeline::signals;
use crate::isa::Icode;

/// Stall/bubble request for one latch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageCtl {
    /// Hold the current payload.
    pub stall: bool,
    /// Squash to a bubble.
    pub bubble: bool,
}

impl StageCtl {
    /// The latch operation this request maps to. Both at once is the
    /// control contradiction that poisons the latch.
    pub fn op(self) -> LatchOp {
        match (self.stall, self.bubble) {
            (true, true) => LatchOp::Error,
            (true, false) => LatchOp::Stall,
            (false, true) => LatchOp::Bubble,
            (false, false) => LatchOp::Load,
        }
    }
}

/// One request per latch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineCtl {
    /// Fetch latch (the predicted PC).
    pub fetch: StageCtl,
    /// Decode latch.
    pub decode: StageCtl,
    /// Execute latch.
    pub execute: StageCtl,
    /// Memory latch.
    pub memory: StageCtl,
    /// Writeback latch.
    pub writeback: StageCtl,
}

/// Computes this cycle's stall and bubble requests.
///
/// `dmem_ready` is the memory stage's report for the cycle; while it is
/// false the four upstream latches freeze and Writeback takes bubbles, so
/// the stalled access replays and nothing younger advances. The memory
/// wait takes precedence over the return and misprediction bubbles on the
/// frozen latches; those conditions still hold once the cache answers and
/// are re-derived then.
pub fn evaluate(bank: &LatchBank, dmem_ready: bool) -> PipelineCtl {
    let d = bank.decode.current();
    let e = bank.execute.current();
    let m = bank.memory.current();

    // The decode-stage source registers, re-derived from the same tables
    // the stages use.
    let src_a = signals::src_a(d.icode, d.ra);
    let src_b = signals::src_b(d.icode, d.rb);

    let load_use = signals::is_load(e.icode)
        && e.dst_m.is_some()
        && (e.dst_m == src_a || e.dst_m == src_b);

    let ret_in_flight = d.icode == Icode::Ret || e.icode == Icode::Ret || m.icode == Icode::Ret;

    // Branch resolved this cycle in Execute; outcome sits on the memory
    // latch's next side.
    let mispredicted = e.icode == Icode::Jmp && !bank.memory.next().cond;

    // An exception reaching Writeback drains the pipeline: the memory
    // latch feeds bubbles and the writeback latch holds the exception.
    let exception_next = bank.writeback.next().status.is_exception();
    let exception_held = bank.writeback.current().status.is_exception();

    let mem_wait = !dmem_ready;

    let ctl = if mem_wait {
        PipelineCtl {
            fetch: StageCtl {
                stall: true,
                bubble: false,
            },
            decode: StageCtl {
                stall: true,
                bubble: false,
            },
            execute: StageCtl {
                stall: true,
                bubble: false,
            },
            memory: StageCtl {
                stall: true,
                bubble: false,
            },
            writeback: StageCtl {
                stall: false,
                bubble: true,
            },
        }
    } else {
        PipelineCtl {
            fetch: StageCtl {
                stall: load_use || ret_in_flight,
                bubble: false,
            },
            decode: StageCtl {
                stall: load_use,
                // The load-use stall wins over the ret bubble when both
                // hold; the mispredicted branch cannot coincide with
                // load-use (one execute-stage instruction cannot be both).
                bubble: mispredicted || (ret_in_flight && !load_use),
            },
            execute: StageCtl {
                stall: false,
                bubble: mispredicted || load_use,
            },
            memory: StageCtl {
                stall: false,
                bubble: exception_next || exception_held,
            },
            writeback: StageCtl {
                stall: exception_held,
                bubble: false,
            },
        }
    };

    trace!(
        target: "ysim::hazards",
        load_use,
        ret_in_flight,
        mispredicted,
        mem_wait,
        drain = exception_next || exception_held,
        "control"
    );
    ctl
}

/// Schedules the computed operations onto the latch bank.
pub fn apply(bank: &mut LatchBank, ctl: &PipelineCtl) {
    for (latch_op, name) in [
        (ctl.fetch.op(), "fetch"),
        (ctl.decode.op(), "decode"),
        (ctl.execute.op(), "execute"),
        (ctl.memory.op(), "memory"),
        (ctl.writeback.op(), "writeback"),
    ] {
        if latch_op == LatchOp::Error {
            error!(target: "ysim::hazards", latch = name, "stall and bubble requested together");
        }
    }
    bank.fetch.set_op(ctl.fetch.op());
    bank.decode.set_op(ctl.decode.op());
    bank.execute.set_op(ctl.execute.op());
    bank.memory.set_op(ctl.memory.op());
    bank.writeback.set_op(ctl.writeback.op());
}
