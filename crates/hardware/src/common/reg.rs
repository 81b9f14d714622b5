use serde::Serialize;

/// A Y86-64 program register.
///
/// The encoding reserves the nibble `0xF` for "no register"; that case is
/// represented as `Option::<Register>::None` throughout the simulator, so
/// two absent operands can never compare equal by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[allow(missing_docs)]
pub enum Register {
    Rax = 0x0,
    Rcx = 0x1,
    Rdx = 0x2,
    Rbx = 0x3,
    Rsp = 0x4,
    Rbp = 0x5,
    Rsi = 0x6,
    Rdi = 0x7,
    R8 = 0x8,
    R9 = 0x9,
    R10 = 0xA,
    R11 = 0xB,
    R12 = 0xC,
    R13 = 0xD,
    R14 = 0xE,
}

impl Register {
    /// All fifteen registers in encoding order.
    pub const ALL: [Register; 15] = [
        Register::Rax,
        Register::Rcx,
        Register::Rdx,
        Register::Rbx,
        Register::Rsp,
        Register::Rbp,
        Register::Rsi,
        Register::Rdi,
        Register::R8,
        Register::R9,
        Register::R10,
        Register::R11,
        Register::R12,
        Register::R13,
        Register::R14,
    ];

    /// Decodes a register nibble. `0xF` is the architectural "no register"
    /// and decodes to `None`; anything above `0xF` never appears in a
    /// nibble and also yields `None`.
    pub fn from_nibble(nibble: u8) -> Option<Register> {
        match nibble {
            n if (n as usize) < Register::ALL.len() => Some(Register::ALL[n as usize]),
            _ => None,
        }
    }

    /// Assembly name, e.g. `%rax`.
    pub fn name(self) -> &'static str {
        match self {
            Register::Rax => "%rax",
            Register::Rcx => "%rcx",
            Register::Rdx => "%rdx",
            Register::Rbx => "%rbx",
            Register::Rsp => "%rsp",
            Register::Rbp => "%rbp",
            Register::Rsi => "%rsi",
            Register::Rdi => "%rdi",
            Register::R8 => "%r8",
            Register::R9 => "%r9",
            Register::R10 => "%r10",
            Register::R11 => "%r11",
            Register::R12 => "%r12",
            Register::R13 => "%r13",
            Register::R14 => "%r14",
        }
    }
}

impl std::fmt::Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One register whose value differs between two register files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegDelta {
    /// The register in question.
    pub reg: Register,
    /// Its value in the file `diff` was called on.
    pub old: u64,
    /// Its value in the file compared against.
    pub new: u64,
}

/// The fifteen-entry architectural register file.
///
/// Reads and writes take `Option<Register>`; the `None` port reads as zero
/// and swallows writes, which is exactly how the no-register nibble behaves
/// in the datapath.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterFile {
    values: [u64; 15],
}

impl RegisterFile {
    /// A register file with every register zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a register port. The absent port reads as zero.
    pub fn read(&self, reg: Option<Register>) -> u64 {
        match reg {
            Some(r) => self.values[r as usize],
            None => 0,
        }
    }

    /// Writes a register port. Writes to the absent port are dropped.
    pub fn write(&mut self, reg: Option<Register>, value: u64) {
        if let Some(r) = reg {
            self.values[r as usize] = value;
        }
    }

    /// Zeroes every register.
    pub fn reset(&mut self) {
        self.values = [0; 15];
    }

    /// Registers whose values differ between `self` and `other`.
    pub fn diff(&self, other: &RegisterFile) -> Vec<RegDelta> {
        Register::ALL
            .iter()
            .filter_map(|&reg| {
                let old = self.values[reg as usize];
                let new = other.values[reg as usize];
                (old != new).then_some(RegDelta { reg, old, new })
            })
            .collect()
    }
}
