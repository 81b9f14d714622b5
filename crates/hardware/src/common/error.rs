use serde::Serialize;
use thiserror::Error;

/// Per-instruction (and, at the writeback boundary, whole-run) status.
///
/// Every pipeline latch payload carries one of these. A status is attached
/// where the condition is first observed and then rides forward with the
/// instruction unchanged; the driver reads the retiring status off the
/// writeback boundary to decide whether the run continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    /// Instruction is progressing normally.
    Normal,
    /// Latch slot holds no instruction.
    Bubble,
    /// A `halt` instruction was fetched.
    Halt,
    /// The fetched byte does not encode a valid instruction.
    InvalidInstruction,
    /// A memory access fell outside the memory image.
    InvalidAddress,
    /// A latch was told to stall and bubble in the same cycle.
    ControlError,
}

impl Status {
    /// True for the statuses that terminate a run once they retire.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Status::Normal | Status::Bubble)
    }

    /// True for the error statuses that force the pipeline to drain
    /// (everything terminal except a clean halt is still drained the same
    /// way, so halt is included here).
    pub fn is_exception(self) -> bool {
        matches!(
            self,
            Status::Halt | Status::InvalidInstruction | Status::InvalidAddress
        )
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Status::Normal => "AOK",
            Status::Bubble => "BUB",
            Status::Halt => "HLT",
            Status::InvalidInstruction => "INS",
            Status::InvalidAddress => "ADR",
            Status::ControlError => "PIP",
        };
        write!(f, "{name}")
    }
}

/// Host-level failures: everything that can go wrong *around* a simulation,
/// as opposed to the simulated conditions [`Status`] covers.
#[derive(Debug, Error)]
pub enum SimError {
    /// Cache geometry that cannot be built (zero ways, degenerate block
    /// size, or an address split wider than the machine word).
    #[error("invalid cache geometry: {0}")]
    CacheGeometry(String),
    /// A run parameter that makes no sense (zero memory, zero limits).
    #[error("invalid configuration: {0}")]
    Config(String),
    /// A line of the object file that does not parse.
    #[error("object file line {line}: {reason}")]
    ObjectFormat {
        /// 1-based line number within the object file.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },
    /// An object file that parsed but contributed no code bytes.
    #[error("object file contains no code bytes")]
    EmptyObject,
    /// Failure reading the object file itself.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
