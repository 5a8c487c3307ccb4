//! Cursor-based operand decoding over a script buffer.
//!
//! Every helper takes the buffer and an offset and returns
//! `(value, new_offset)`. Nothing is read through a stored pointer, so a
//! short buffer becomes a [`ScriptError::Truncated`] instead of an overrun.

use crate::canvas::Color;
use crate::error::{Result, ScriptError};

/// Round an operand length up to the next multiple of four.
pub const fn padded_len(len: usize) -> usize {
    len + (4 - len % 4) % 4
}

pub fn bytes(buf: &[u8], offset: usize, len: usize) -> Result<(&[u8], usize)> {
    let available = buf.len().saturating_sub(offset);
    if len > available {
        return Err(ScriptError::Truncated {
            offset,
            needed: len,
            available,
        });
    }
    Ok((&buf[offset..offset + len], offset + len))
}

pub fn array<const N: usize>(buf: &[u8], offset: usize) -> Result<([u8; N], usize)> {
    let (raw, next) = bytes(buf, offset, N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(raw);
    Ok((out, next))
}

pub fn u16_at(buf: &[u8], offset: usize) -> Result<(u16, usize)> {
    let (raw, next) = array::<2>(buf, offset)?;
    Ok((u16::from_be_bytes(raw), next))
}

pub fn u32_at(buf: &[u8], offset: usize) -> Result<(u32, usize)> {
    let (raw, next) = array::<4>(buf, offset)?;
    Ok((u32::from_be_bytes(raw), next))
}

pub fn f32_at(buf: &[u8], offset: usize) -> Result<(f32, usize)> {
    let (raw, next) = array::<4>(buf, offset)?;
    Ok((f32::from_be_bytes(raw), next))
}

/// `N` consecutive floats.
pub fn floats<const N: usize>(buf: &[u8], offset: usize) -> Result<([f32; N], usize)> {
    let mut out = [0f32; N];
    let mut cursor = offset;
    for value in out.iter_mut() {
        (*value, cursor) = f32_at(buf, cursor)?;
    }
    Ok((out, cursor))
}

pub fn color(buf: &[u8], offset: usize) -> Result<(Color, usize)> {
    let (raw, next) = array::<4>(buf, offset)?;
    Ok((Color::from(raw), next))
}

/// A variable-length operand followed by padding to a four-byte boundary.
///
/// Only the operand itself has to be present; padding missing at the very
/// end of a script is tolerated.
pub fn padded(buf: &[u8], offset: usize, len: usize) -> Result<(&[u8], usize)> {
    let (raw, _) = bytes(buf, offset, len)?;
    let next = (offset + padded_len(len)).min(buf.len());
    Ok((raw, next))
}
