//! The `.yo` object-file loader.
//!
//! A `.yo` file is the assembler's listing format: one line per emitted
//! chunk, `0xADDR: BYTES | source comment`. Lines without an address part
//! (pure comments, blank lines) are skipped. The byte field may be empty
//! (a label line). Everything after `|` is ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::info;

use crate::common::SimError;
use crate::core::Memory;

/// Loads an object file into memory and returns the number of code bytes
/// written.
///
/// # Errors
///
/// A malformed line, a byte destined outside the image, or an object that
/// contributes no bytes at all.
pub fn load_object<R: BufRead>(mem: &mut Memory, reader: R) -> Result<u64, SimError> {
    let mut loaded = 0u64;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        loaded += load_line(mem, &line, index + 1)?;
    }
    if loaded == 0 {
        return Err(SimError::EmptyObject);
    }
    info!(target: "ysim::loader", bytes = loaded, "program loaded");
    Ok(loaded)
}

/// Opens and loads an object file from disk.
///
/// # Errors
///
/// I/O failures plus everything [`load_object`] rejects.
pub fn load_object_file<P: AsRef<Path>>(mem: &mut Memory, path: P) -> Result<u64, SimError> {
    let file = File::open(path)?;
    load_object(mem, BufReader::new(file))
}

fn load_line(mem: &mut Memory, line: &str, lineno: usize) -> Result<u64, SimError> {
    let code = line.split('|').next().unwrap_or("").trim();
    if code.is_empty() {
        return Ok(0);
    }

    let Some((addr_text, byte_text)) = code.split_once(':') else {
        return Err(SimError::ObjectFormat {
            line: lineno,
            reason: String::from("expected `0xADDR:` before the byte field"),
        });
    };
    let addr_text = addr_text.trim();
    let digits = addr_text
        .strip_prefix("0x")
        .or_else(|| addr_text.strip_prefix("0X"))
        .unwrap_or(addr_text);
    let mut addr = u64::from_str_radix(digits, 16).map_err(|_| SimError::ObjectFormat {
        line: lineno,
        reason: format!("bad address `{addr_text}`"),
    })?;

    let hex: String = byte_text.split_whitespace().collect();
    if hex.len() % 2 != 0 {
        return Err(SimError::ObjectFormat {
            line: lineno,
            reason: String::from("odd number of hex digits in byte field"),
        });
    }

    let mut written = 0u64;
    for pair in hex.as_bytes().chunks(2) {
        let text = std::str::from_utf8(pair).map_err(|_| SimError::ObjectFormat {
            line: lineno,
            reason: String::from("non-ASCII byte field"),
        })?;
        let byte = u8::from_str_radix(text, 16).map_err(|_| SimError::ObjectFormat {
            line: lineno,
            reason: format!("bad hex byte `{text}`"),
        })?;
        if !mem.write_byte(addr, byte) {
            return Err(SimError::ObjectFormat {
                line: lineno,
                reason: format!("byte at {addr:#x} falls outside the memory image"),
            });
        }
        addr += 1;
        written += 1;
    }
    Ok(written)
}
