//! Sequence key encoding
//!
//! Keys are 8-byte big-endian sequence numbers, so the store's byte order
//! equals numeric order.

use crate::error::{StoreError, StoreResult};

/// Length of an encoded sequence key
pub const KEY_LEN: usize = 8;

/// Encode a sequence number as a big-endian key
pub fn encode(sequence: u64) -> [u8; KEY_LEN] {
    sequence.to_be_bytes()
}

/// Decode a big-endian key back into its sequence number
pub fn decode(key: &[u8]) -> StoreResult<u64> {
    let bytes: [u8; KEY_LEN] = key
        .try_into()
        .map_err(|_| StoreError::InvalidKey(key.len()))?;
    Ok(u64::from_be_bytes(bytes))
}
