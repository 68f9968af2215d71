//! Per-record view handed to replay visitors

use serde::de::DeserializeOwned;

use crate::codec::Codec;
use crate::error::StoreResult;

/// One stored event, borrowed from the read transaction
///
/// A `Record` is bound to exactly one stored payload, so decoding it can
/// never read another record's bytes. It cannot outlive the visitor call.
#[derive(Debug)]
pub struct Record<'a, C> {
    event_type: &'a str,
    sequence: u64,
    bytes: &'a [u8],
    codec: &'a C,
}

impl<'a, C: Codec> Record<'a, C> {
    pub(crate) fn new(event_type: &'a str, sequence: u64, bytes: &'a [u8], codec: &'a C) -> Self {
        Self {
            event_type,
            sequence,
            bytes,
            codec,
        }
    }

    /// Event type this record was logged under
    pub fn event_type(&self) -> &'a str {
        self.event_type
    }

    /// Sequence number assigned when the record was appended
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Raw encoded payload
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Decode the payload into `T`
    pub fn decode<T: DeserializeOwned>(&self) -> StoreResult<T> {
        self.codec.decode(self.bytes)
    }
}
