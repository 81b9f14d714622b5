//! The arithmetic unit and condition-code computation.
//!
//! `subq` computes `b - a` (destination minus source); subtraction of the
//! inputs is never the other way around anywhere in the datapath.

use crate::common::ConditionCodes;
use crate::isa::AluFn;

/// Applies an ALU function to the two operand buses.
pub fn compute(f: AluFn, a: u64, b: u64) -> u64 {
    match f {
        AluFn::Add => b.wrapping_add(a),
        AluFn::Sub => b.wrapping_sub(a),
        AluFn::And => b & a,
        AluFn::Xor => b ^ a,
    }
}

/// The flags an ALU operation would set for the two operand buses.
///
/// OF reflects signed two's-complement overflow; the logical operations
/// never overflow.
pub fn flags(f: AluFn, a: u64, b: u64) -> ConditionCodes {
    let (value, of) = match f {
        AluFn::Add => {
            let (v, o) = (b as i64).overflowing_add(a as i64);
            (v, o)
        }
        AluFn::Sub => {
            let (v, o) = (b as i64).overflowing_sub(a as i64);
            (v, o)
        }
        AluFn::And => ((b & a) as i64, false),
        AluFn::Xor => ((b ^ a) as i64, false),
    };
    ConditionCodes {
        zf: value == 0,
        sf: value < 0,
        of,
    }
}
