//! Common vocabulary shared across the simulator.
//!
//! 1. **Status codes:** per-instruction and whole-run processor status.
//! 2. **Errors:** host-level failures (configuration, object format, I/O).
//! 3. **Registers:** Y86-64 register identifiers and the register file.
//! 4. **Condition codes:** the ZF/SF/OF flag triple.

/// Condition-code register (ZF, SF, OF).
pub mod cc;
/// Processor status codes and host-level error types.
pub mod error;
/// Register identifiers and the register file.
pub mod reg;

pub use cc::ConditionCodes;
pub use error::{SimError, Status};
pub use reg::{RegDelta, Register, RegisterFile};
