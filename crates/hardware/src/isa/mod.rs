//! The Y86-64 instruction set: opcodes, function nibbles, and encoding
//! properties.
//!
//! An instruction is one byte of opcode (`icode` in the high nibble, `ifun`
//! in the low nibble), optionally followed by a register-specifier byte and
//! optionally an 8-byte little-endian constant. Nothing in here touches the
//! pipeline; this module only knows what the bytes mean.

use crate::common::ConditionCodes;

mod disasm;

pub use disasm::instruction_name;

/// Instruction class, the high nibble of the opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icode {
    /// `halt` (0x0).
    Halt,
    /// `nop` (0x1).
    Nop,
    /// `rrmovq` / `cmovXX` (0x2).
    Cmov,
    /// `irmovq` (0x3).
    Irmovq,
    /// `rmmovq` (0x4).
    Rmmovq,
    /// `mrmovq` (0x5).
    Mrmovq,
    /// `OPq` arithmetic (0x6).
    Alu,
    /// `jXX` (0x7).
    Jmp,
    /// `call` (0x8).
    Call,
    /// `ret` (0x9).
    Ret,
    /// `pushq` (0xA).
    Pushq,
    /// `popq` (0xB).
    Popq,
}

impl Icode {
    /// Decodes the high nibble of an opcode byte. Nibbles above 0xB do not
    /// name an instruction.
    pub fn from_nibble(nibble: u8) -> Option<Icode> {
        Some(match nibble {
            0x0 => Icode::Halt,
            0x1 => Icode::Nop,
            0x2 => Icode::Cmov,
            0x3 => Icode::Irmovq,
            0x4 => Icode::Rmmovq,
            0x5 => Icode::Mrmovq,
            0x6 => Icode::Alu,
            0x7 => Icode::Jmp,
            0x8 => Icode::Call,
            0x9 => Icode::Ret,
            0xA => Icode::Pushq,
            0xB => Icode::Popq,
            _ => return None,
        })
    }

    /// The encoding nibble for this class.
    pub fn nibble(self) -> u8 {
        match self {
            Icode::Halt => 0x0,
            Icode::Nop => 0x1,
            Icode::Cmov => 0x2,
            Icode::Irmovq => 0x3,
            Icode::Rmmovq => 0x4,
            Icode::Mrmovq => 0x5,
            Icode::Alu => 0x6,
            Icode::Jmp => 0x7,
            Icode::Call => 0x8,
            Icode::Ret => 0x9,
            Icode::Pushq => 0xA,
            Icode::Popq => 0xB,
        }
    }

    /// Whether the encoding carries a register-specifier byte.
    pub fn needs_regids(self) -> bool {
        matches!(
            self,
            Icode::Cmov
                | Icode::Irmovq
                | Icode::Rmmovq
                | Icode::Mrmovq
                | Icode::Alu
                | Icode::Pushq
                | Icode::Popq
        )
    }

    /// Whether the encoding carries an 8-byte constant word.
    pub fn needs_valc(self) -> bool {
        matches!(
            self,
            Icode::Irmovq | Icode::Rmmovq | Icode::Mrmovq | Icode::Jmp | Icode::Call
        )
    }

    /// Total encoded length in bytes.
    pub fn len(self) -> u64 {
        1 + u64::from(self.needs_regids()) + 8 * u64::from(self.needs_valc())
    }
}

/// ALU operation, the low nibble of an `OPq` opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluFn {
    /// `addq` (0x0).
    Add,
    /// `subq` (0x1).
    Sub,
    /// `andq` (0x2).
    And,
    /// `xorq` (0x3).
    Xor,
}

impl AluFn {
    /// Decodes the low nibble of an `OPq` opcode byte.
    pub fn from_nibble(nibble: u8) -> Option<AluFn> {
        Some(match nibble {
            0x0 => AluFn::Add,
            0x1 => AluFn::Sub,
            0x2 => AluFn::And,
            0x3 => AluFn::Xor,
            _ => return None,
        })
    }

    /// The encoding nibble for this operation.
    pub fn nibble(self) -> u8 {
        match self {
            AluFn::Add => 0x0,
            AluFn::Sub => 0x1,
            AluFn::And => 0x2,
            AluFn::Xor => 0x3,
        }
    }
}

/// Branch / move condition, the low nibble of a `jXX` or `cmovXX` opcode
/// byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cond {
    /// Unconditional (0x0): plain `jmp` / `rrmovq`.
    Always,
    /// `le` (0x1).
    Le,
    /// `l` (0x2).
    L,
    /// `e` (0x3).
    E,
    /// `ne` (0x4).
    Ne,
    /// `ge` (0x5).
    Ge,
    /// `g` (0x6).
    G,
}

impl Cond {
    /// Decodes the low nibble of a conditional opcode byte.
    pub fn from_nibble(nibble: u8) -> Option<Cond> {
        Some(match nibble {
            0x0 => Cond::Always,
            0x1 => Cond::Le,
            0x2 => Cond::L,
            0x3 => Cond::E,
            0x4 => Cond::Ne,
            0x5 => Cond::Ge,
            0x6 => Cond::G,
            _ => return None,
        })
    }

    /// The encoding nibble for this condition.
    pub fn nibble(self) -> u8 {
        match self {
            Cond::Always => 0x0,
            Cond::Le => 0x1,
            Cond::L => 0x2,
            Cond::E => 0x3,
            Cond::Ne => 0x4,
            Cond::Ge => 0x5,
            Cond::G => 0x6,
        }
    }

    /// Evaluates the condition against a set of flags.
    pub fn holds(self, cc: ConditionCodes) -> bool {
        let ConditionCodes { zf, sf, of } = cc;
        match self {
            Cond::Always => true,
            Cond::Le => (sf ^ of) | zf,
            Cond::L => sf ^ of,
            Cond::E => zf,
            Cond::Ne => !zf,
            Cond::Ge => !(sf ^ of),
            Cond::G => !(sf ^ of) & !zf,
        }
    }
}

/// Typed view of the function nibble, specific to the instruction class.
///
/// Classes without a function nibble use [`Ifun::None`]; a nibble outside
/// its class's valid range fails to decode, which the fetch stage reports
/// as an invalid instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ifun {
    /// No function nibble (the nibble must be zero).
    #[default]
    None,
    /// ALU operation selector for `OPq`.
    Alu(AluFn),
    /// Condition selector for `jXX` and `cmovXX`.
    Cond(Cond),
}

impl Ifun {
    /// Decodes the low nibble of an opcode byte given its class.
    pub fn decode(icode: Icode, nibble: u8) -> Option<Ifun> {
        match icode {
            Icode::Alu => AluFn::from_nibble(nibble).map(Ifun::Alu),
            Icode::Jmp | Icode::Cmov => Cond::from_nibble(nibble).map(Ifun::Cond),
            _ => (nibble == 0).then_some(Ifun::None),
        }
    }

    /// The encoding nibble for this function.
    pub fn nibble(self) -> u8 {
        match self {
            Ifun::None => 0,
            Ifun::Alu(f) => f.nibble(),
            Ifun::Cond(c) => c.nibble(),
        }
    }
}
