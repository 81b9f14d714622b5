//! The sequential reference interpreter.
//!
//! Executes one instruction at a time against the same ISA tables the
//! pipeline uses, with no latches, no cache, and no hazards. After a run,
//! its register file, memory image and flags are what the pipeline must
//! have produced; the harness diffs the two to catch pipeline bugs.

use tracing::trace;

use crate::common::{ConditionCodes, RegisterFile, Status};
use crate::core::pipeline::signals::{self, AluASel, AluBSel, MemAddr, MemOp};
use crate::core::{alu, Memory};
use crate::isa::{AluFn, Icode, Ifun};

/// The reference machine.
#[derive(Debug, Clone)]
pub struct Oracle {
    /// Memory image.
    pub mem: Memory,
    /// Register file.
    pub regs: RegisterFile,
    /// Condition codes.
    pub cc: ConditionCodes,
    /// Program counter.
    pub pc: u64,
    /// Status after the last step.
    pub status: Status,
}

impl Oracle {
    /// A reference machine over a (typically freshly loaded) image.
    pub fn new(mem: Memory) -> Self {
        Oracle {
            mem,
            regs: RegisterFile::new(),
            cc: ConditionCodes::default(),
            pc: 0,
            status: Status::Normal,
        }
    }

    /// Executes one instruction. Once the status is terminal further
    /// steps do nothing.
    pub fn step(&mut self) -> Status {
        if self.status != Status::Normal {
            return self.status;
        }

        // Fetch and decode.
        let Some(opcode) = self.mem.read_byte(self.pc) else {
            self.status = Status::InvalidAddress;
            return self.status;
        };
        let decoded = Icode::from_nibble(opcode >> 4)
            .and_then(|icode| Ifun::decode(icode, opcode & 0xF).map(|ifun| (icode, ifun)));
        let Some((icode, ifun)) = decoded else {
            self.status = Status::InvalidInstruction;
            return self.status;
        };

        let mut operand_pc = self.pc.wrapping_add(1);
        let (mut ra, mut rb) = (None, None);
        if icode.needs_regids() {
            let Some(regids) = self.mem.read_byte(operand_pc) else {
                self.status = Status::InvalidAddress;
                return self.status;
            };
            ra = crate::common::Register::from_nibble(regids >> 4);
            rb = crate::common::Register::from_nibble(regids & 0xF);
            operand_pc = operand_pc.wrapping_add(1);
        }
        let mut valc = 0;
        if icode.needs_valc() {
            let Some(word) = self.mem.read_word(operand_pc) else {
                self.status = Status::InvalidAddress;
                return self.status;
            };
            valc = word;
        }
        let valp = self.pc.wrapping_add(icode.len());

        // Register reads, through the same source tables as the pipeline.
        let vala = self.regs.read(signals::src_a(icode, ra));
        let valb = self.regs.read(signals::src_b(icode, rb));

        // Execute.
        let a = match signals::alu_a(icode) {
            AluASel::ValA => vala,
            AluASel::ValC => valc,
            AluASel::StackInc => 8,
            AluASel::StackDec => (-8i64) as u64,
            AluASel::Zero => 0,
        };
        let b = match signals::alu_b(icode) {
            AluBSel::ValB => valb,
            AluBSel::Zero => 0,
        };
        let alu_fn = match ifun {
            Ifun::Alu(f) => f,
            _ => AluFn::Add,
        };
        let vale = alu::compute(alu_fn, a, b);
        if icode == Icode::Alu {
            self.cc = alu::flags(alu_fn, a, b);
        }
        let cond = match ifun {
            Ifun::Cond(c) => c.holds(self.cc),
            _ => true,
        };

        // Memory. `call` pushes the fall-through address.
        let mut valm = 0;
        let store_data = if icode == Icode::Call { valp } else { vala };
        match signals::mem_op(icode) {
            MemOp::None => {}
            MemOp::Read(sel) => {
                let addr = if sel == MemAddr::ValE { vale } else { vala };
                match self.mem.read_word(addr) {
                    Some(word) => valm = word,
                    None => {
                        self.status = Status::InvalidAddress;
                        return self.status;
                    }
                }
            }
            MemOp::Write(sel) => {
                let addr = if sel == MemAddr::ValE { vale } else { vala };
                if !self.mem.write_word(addr, store_data) {
                    self.status = Status::InvalidAddress;
                    return self.status;
                }
            }
        }

        // Writeback; a failed cmov drops its destination.
        let dst_e = if icode == Icode::Cmov && !cond {
            None
        } else {
            signals::dst_e(icode, rb)
        };
        self.regs.write(dst_e, vale);
        self.regs.write(signals::dst_m(icode, ra), valm);

        // PC update.
        self.pc = match icode {
            Icode::Call => valc,
            Icode::Ret => valm,
            Icode::Jmp if cond => valc,
            _ => valp,
        };

        if icode == Icode::Halt {
            self.status = Status::Halt;
        }
        trace!(
            target: "ysim::oracle",
            pc = format_args!("{:#x}", self.pc),
            instr = crate::isa::instruction_name(icode, ifun),
            "step"
        );
        self.status
    }

    /// Runs up to `max_instructions` instructions and returns the final
    /// status.
    pub fn run(&mut self, max_instructions: u64) -> Status {
        for _ in 0..max_instructions {
            if self.step() != Status::Normal {
                break;
            }
        }
        self.status
    }
}
