//! Instruction names for traces and reports.

use super::{AluFn, Cond, Icode, Ifun};

/// The assembly mnemonic for a decoded opcode byte.
pub fn instruction_name(icode: Icode, ifun: Ifun) -> &'static str {
    match (icode, ifun) {
        (Icode::Halt, _) => "halt",
        (Icode::Nop, _) => "nop",
        (Icode::Cmov, Ifun::Cond(c)) => match c {
            Cond::Always => "rrmovq",
            Cond::Le => "cmovle",
            Cond::L => "cmovl",
            Cond::E => "cmove",
            Cond::Ne => "cmovne",
            Cond::Ge => "cmovge",
            Cond::G => "cmovg",
        },
        (Icode::Irmovq, _) => "irmovq",
        (Icode::Rmmovq, _) => "rmmovq",
        (Icode::Mrmovq, _) => "mrmovq",
        (Icode::Alu, Ifun::Alu(f)) => match f {
            AluFn::Add => "addq",
            AluFn::Sub => "subq",
            AluFn::And => "andq",
            AluFn::Xor => "xorq",
        },
        (Icode::Jmp, Ifun::Cond(c)) => match c {
            Cond::Always => "jmp",
            Cond::Le => "jle",
            Cond::L => "jl",
            Cond::E => "je",
            Cond::Ne => "jne",
            Cond::Ge => "jge",
            Cond::G => "jg",
        },
        (Icode::Call, _) => "call",
        (Icode::Ret, _) => "ret",
        (Icode::Pushq, _) => "pushq",
        (Icode::Popq, _) => "popq",
        // An icode whose ifun variant does not match only arises from
        // hand-built payloads; name the class rather than panic.
        (Icode::Cmov, _) => "rrmovq",
        (Icode::Alu, _) => "addq",
        (Icode::Jmp, _) => "jmp",
    }
}
