//! Protocol codec
//!
//! Fixed-width big-endian integer encoding plus the checksum group that
//! travels with it.
//!
//! ## Frame Layout
//! ```text
//! ┌───────────────────┬───────────────────┐
//! │   data (length)   │ checksum (length) │
//! └───────────────────┴───────────────────┘
//! ```
//!
//! The checksum is `sum(data) mod 256`, re-encoded into the same `length`
//! as the data. For `length > 1` every checksum byte but the last is zero.

use crate::error::{LinkError, Result};

/// Width of the command code field in bytes
pub const CODE_WIDTH: usize = 4;

/// Encode `value` as exactly `length` big-endian bytes
///
/// Fails with `LinkError::Overflow` if `value` does not fit.
pub fn to_be_bytes(value: u64, length: usize) -> Result<Vec<u8>> {
    // Shifting by 64 would overflow, and anything 8 bytes wide holds a u64
    let fits = length >= 8 || value >> (8 * length) == 0;
    if !fits {
        return Err(LinkError::Overflow { value, length });
    }

    let mut bytes = vec![0u8; length];
    let raw = value.to_be_bytes();
    let n = length.min(raw.len());
    bytes[length - n..].copy_from_slice(&raw[raw.len() - n..]);

    Ok(bytes)
}

/// Sum of the bytes, mod 256
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Encode a value and its checksum group
///
/// Returns `(data_bytes, check_bytes)`, both `length` bytes long.
pub fn encode(value: u64, length: usize) -> Result<(Vec<u8>, Vec<u8>)> {
    let data = to_be_bytes(value, length)?;
    let check = to_be_bytes(u64::from(checksum(&data)), length)?;
    Ok((data, check))
}
