//! Timing-model units attached to the datapath.

/// Set-associative data cache with LRU replacement.
pub mod cache;

pub use cache::{AddrParts, Cache, Lookup, Port};
