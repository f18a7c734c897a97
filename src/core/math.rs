//! Multi-byte unsigned arithmetic.
//!
//! Buffers are little-endian: byte 0 is the least significant. The 64-bit
//! helpers return the wrapped result alongside the carry, borrow or overflow
//! bit, so callers can chain them into wider arithmetic.

use std::cmp::Ordering;

use crate::utils::error::{ExtError, Result};

/// Returns `true` if every byte of `buf` is zero.
pub fn is_zero(buf: &[u8]) -> bool {
    let (chunks, rest) = buf.split_at(buf.len() - buf.len() % 8);
    chunks
        .chunks_exact(8)
        .all(|c| u64::from_ne_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]) == 0)
        && rest.iter().all(|&b| b == 0)
}

/// 64-bit addition. Returns the wrapped sum and the carry.
pub fn add64(a: u64, b: u64) -> (u64, bool) {
    a.overflowing_add(b)
}

/// 64-bit subtraction of `b` from `a`. Returns the wrapped difference and the borrow.
pub fn sub64(a: u64, b: u64) -> (u64, bool) {
    a.overflowing_sub(b)
}

/// Two's complement negation, equivalent to multiplying by -1.
pub fn negate64(a: u64) -> u64 {
    (!a).wrapping_add(1)
}

pub fn cmp64(a: u64, b: u64) -> Ordering {
    a.cmp(&b)
}

pub fn shiftr64(a: u64) -> u64 {
    a >> 1
}

/// 64-bit multiplication. Returns the wrapped product and whether it overflowed.
pub fn mult64(a: u64, b: u64) -> (u64, bool) {
    a.overflowing_mul(b)
}

/// Unsigned compare of two little-endian 256-bit values.
pub fn cmp256(a: &[u8; 32], b: &[u8; 32]) -> Ordering {
    // most significant word first
    let words = |v: &[u8; 32]| {
        let mut out = [0u64; 4];
        for (word, chunk) in out.iter_mut().zip(v.chunks_exact(8)) {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(chunk);
            *word = u64::from_le_bytes(bytes);
        }
        out
    };
    words(a).iter().rev().cmp(words(b).iter().rev())
}

fn check_lengths(a: &[u8], b: &[u8], c: &[u8]) -> Result<()> {
    if a.len() != b.len() || a.len() != c.len() {
        return Err(ExtError::invalid_argument(format!(
            "operand lengths differ ({}, {}, {})",
            a.len(),
            b.len(),
            c.len()
        )));
    }
    Ok(())
}

/// Byte-wise addition of `a` and `b` into `c`. Returns the final carry.
pub fn multi_add(a: &[u8], b: &[u8], c: &mut [u8]) -> Result<bool> {
    check_lengths(a, b, c)?;

    let mut carry = 0u16;
    for ((x, y), z) in a.iter().zip(b).zip(c.iter_mut()) {
        let t = u16::from(*x) + u16::from(*y) + carry;
        carry = t >> 8;
        *z = t as u8;
    }

    Ok(carry != 0)
}

/// Byte-wise subtraction of `b` from `a` into `c`. Returns the final borrow.
pub fn multi_sub(a: &[u8], b: &[u8], c: &mut [u8]) -> Result<bool> {
    check_lengths(a, b, c)?;

    let mut borrow = 0i16;
    for ((x, y), z) in a.iter().zip(b).zip(c.iter_mut()) {
        let t = i16::from(*x) - i16::from(*y) - borrow;
        borrow = (t >> 8) & 1;
        *z = t as u8;
    }

    Ok(borrow != 0)
}

/// In-place variant of [`multi_add`], accumulating `b` into `acc`.
pub fn multi_add_assign(acc: &mut [u8], b: &[u8]) -> Result<bool> {
    if acc.len() != b.len() {
        return Err(ExtError::invalid_argument("operand lengths differ"));
    }
    let a = acc.to_vec();
    multi_add(&a, b, acc)
}
