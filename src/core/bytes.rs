//! Fixed-width integer access on byte buffers, plus memory helpers.

use std::fmt::{self, Write};

use crate::utils::error::{ExtError, Result};

const MEMSWAP_CHUNK: usize = 1024;

pub fn get16(buf: &[u8]) -> Option<u16> {
    Some(u16::from_le_bytes(buf.get(..2)?.try_into().ok()?))
}

pub fn put16(buf: &mut [u8], value: u16) -> Option<()> {
    buf.get_mut(..2)?.copy_from_slice(&value.to_le_bytes());
    Some(())
}

pub fn get32(buf: &[u8]) -> Option<u32> {
    Some(u32::from_le_bytes(buf.get(..4)?.try_into().ok()?))
}

pub fn put32(buf: &mut [u8], value: u32) -> Option<()> {
    buf.get_mut(..4)?.copy_from_slice(&value.to_le_bytes());
    Some(())
}

pub fn get64(buf: &[u8]) -> Option<u64> {
    Some(u64::from_le_bytes(buf.get(..8)?.try_into().ok()?))
}

pub fn put64(buf: &mut [u8], value: u64) -> Option<()> {
    buf.get_mut(..8)?.copy_from_slice(&value.to_le_bytes());
    Some(())
}

/// Swaps the contents of `a` and `b`, at most [`MEMSWAP_CHUNK`] bytes at a time.
pub fn memswap(a: &mut [u8], b: &mut [u8]) -> Result<()> {
    if a.len() != b.len() {
        return Err(ExtError::invalid_argument(format!(
            "cannot swap {} bytes with {} bytes",
            a.len(),
            b.len()
        )));
    }

    for (ca, cb) in a.chunks_mut(MEMSWAP_CHUNK).zip(b.chunks_mut(MEMSWAP_CHUNK)) {
        ca.swap_with_slice(cb);
    }
    Ok(())
}

/// Appends formatted text to `buf` without letting it grow past `cap - 1`
/// bytes. Returns the number of bytes the complete text needs, including
/// one byte for a terminator, whether or not it was truncated.
pub fn append_bounded(buf: &mut String, cap: usize, args: fmt::Arguments<'_>) -> usize {
    let mut text = String::new();
    // formatting into a String only fails if a Display impl does
    let _ = text.write_fmt(args);

    let room = cap.saturating_sub(1).saturating_sub(buf.len());
    let mut take = text.len().min(room);
    while !text.is_char_boundary(take) {
        take -= 1;
    }
    buf.push_str(&text[..take]);

    text.len() + 1
}
