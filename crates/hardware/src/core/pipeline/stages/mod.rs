//! The five stage evaluators.
//!
//! Each evaluator is a free function reading the `current` sides of the
//! latch bank and writing exactly one latch's `next` side. The driver
//! calls them in reverse pipeline order (Writeback, Memory, Execute,
//! Decode, Fetch) so that the two sanctioned same-cycle reads of a `next`
//! side see fresh values: Decode's forwarding probes and the hazard unit's
//! branch-outcome and exception probes.

mod decode;
mod execute;
mod fetch;
mod memory;
mod writeback;

pub use decode::decode_stage;
pub use execute::execute_stage;
pub use fetch::fetch_stage;
pub use memory::memory_stage;
pub use writeback::writeback_stage;
