//! Loading programs and running whole simulations.

/// The `.yo` object-file loader.
pub mod loader;
/// The sequential reference interpreter.
pub mod oracle;
/// The run harness: load, run, report.
pub mod simulator;

pub use loader::{load_object, load_object_file};
pub use oracle::Oracle;
pub use simulator::{CheckResult, Report, Simulator};
