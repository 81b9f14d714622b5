//! The flat byte-addressable memory image.
//!
//! Words are 8 bytes, little-endian, and may sit at any byte address. Every
//! accessor signals out-of-range addresses instead of panicking; the stages
//! turn that signal into an [`InvalidAddress`](crate::common::Status)
//! status.

use serde::Serialize;

/// One aligned word whose value differs between two memory images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemDelta {
    /// Word address (multiple of 8).
    pub addr: u64,
    /// The word in the image `diff` was called on.
    pub old: u64,
    /// The word in the image compared against.
    pub new: u64,
}

/// A memory image of fixed size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    bytes: Vec<u8>,
}

impl Memory {
    /// A zero-filled image of `size` bytes.
    pub fn new(size: usize) -> Self {
        Memory {
            bytes: vec![0; size],
        }
    }

    /// Image size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when the image holds no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Reads one byte, or `None` if the address is out of range.
    pub fn read_byte(&self, addr: u64) -> Option<u8> {
        usize::try_from(addr)
            .ok()
            .and_then(|a| self.bytes.get(a).copied())
    }

    /// Reads a little-endian word, or `None` if any byte of it is out of
    /// range.
    pub fn read_word(&self, addr: u64) -> Option<u64> {
        let start = usize::try_from(addr).ok()?;
        let end = start.checked_add(8)?;
        let slice = self.bytes.get(start..end)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(slice);
        Some(u64::from_le_bytes(raw))
    }

    /// Writes one byte; `false` if the address is out of range.
    pub fn write_byte(&mut self, addr: u64, value: u8) -> bool {
        match usize::try_from(addr).ok().and_then(|a| self.bytes.get_mut(a)) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Writes a little-endian word; `false` if any byte of it is out of
    /// range (in which case nothing is written).
    pub fn write_word(&mut self, addr: u64, value: u64) -> bool {
        let Some(start) = usize::try_from(addr).ok() else {
            return false;
        };
        let Some(end) = start.checked_add(8) else {
            return false;
        };
        match self.bytes.get_mut(start..end) {
            Some(slice) => {
                slice.copy_from_slice(&value.to_le_bytes());
                true
            }
            None => false,
        }
    }

    /// Aligned words that differ between `self` and `other`. Both images
    /// are scanned over the shorter of the two lengths.
    pub fn diff(&self, other: &Memory) -> Vec<MemDelta> {
        let limit = self.len().min(other.len()) as u64;
        (0..limit)
            .step_by(8)
            .filter_map(|addr| {
                let old = self.read_word(addr)?;
                let new = other.read_word(addr)?;
                (old != new).then_some(MemDelta { addr, old, new })
            })
            .collect()
    }
}
