//! Typed, append-only event logger
//!
//! Every event type gets its own namespace. Appends take the next
//! sequence number for that namespace inside the same write transaction
//! as the payload insert, so a failed append consumes nothing. Replays
//! walk a namespace in ascending key order, which is append order.

use std::path::Path;

use redb::{ReadableTable, ReadableTableMetadata, TableError, WriteTransaction};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace};

use crate::codec::{Codec, PostcardCodec};
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::handle::{SEQUENCES, StoreHandle, namespace, namespace_name};
use crate::key;
use crate::record::Record;

/// Append-only event log over a [`StoreHandle`]
///
/// Holds no mutable state besides the handle, so one instance can be
/// shared across threads behind an `Arc`. Writers are serialized by the
/// store; readers work on snapshots.
#[derive(Debug)]
pub struct EventLogger<C = PostcardCodec> {
    store: StoreHandle,
    codec: C,
}

impl EventLogger<PostcardCodec> {
    /// Open or create an event log at `path` with default settings
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with(StoreConfig::new(path), PostcardCodec)
    }
}

impl<C: Codec> EventLogger<C> {
    /// Open or create an event log with explicit configuration and codec
    pub fn open_with(config: StoreConfig, codec: C) -> StoreResult<Self> {
        let store = StoreHandle::open(&config)?;
        Ok(Self::from_handle(store, codec))
    }

    /// Wrap an already open store handle
    pub fn from_handle(store: StoreHandle, codec: C) -> Self {
        Self { store, codec }
    }

    /// Path of the backing store
    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// Codec used for payloads
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Append an event under `event_type`
    ///
    /// Returns the sequence number assigned to the event. Either the event
    /// and its sequence number are both committed or neither is.
    pub fn log<T: Serialize + ?Sized>(&self, event_type: &str, event: &T) -> StoreResult<u64> {
        let payload = self.codec.encode(event)?;
        self.log_raw(event_type, &payload)
    }

    /// Append an already encoded payload under `event_type`
    #[instrument(skip(self, payload), fields(len = payload.len()))]
    pub fn log_raw(&self, event_type: &str, payload: &[u8]) -> StoreResult<u64> {
        let write_txn = self.store.begin_write()?;
        let sequence = append(&write_txn, event_type, payload)?;
        write_txn.commit().map_err(StoreError::commit)?;

        debug!(sequence, "Appended event");
        Ok(sequence)
    }

    /// Replay every event of `event_type` in append order
    ///
    /// The visitor is called once per record and stops the replay by
    /// returning an error, which is handed back unchanged. Iterating a type
    /// that was never logged fails with [`StoreError::NamespaceNotFound`].
    ///
    /// The read transaction stays open until the visitor returns for the
    /// last record. There is no cancellation: a visitor that blocks keeps
    /// its snapshot alive for as long as it blocks.
    pub fn iterate<F, E>(&self, event_type: &str, visitor: F) -> Result<(), E>
    where
        F: FnMut(Record<'_, C>) -> Result<(), E>,
        E: From<StoreError>,
    {
        self.replay(event_type, 0, visitor)
    }

    /// Replay events of `event_type` with a sequence number above `after`
    pub fn iterate_from<F, E>(&self, event_type: &str, after: u64, visitor: F) -> Result<(), E>
    where
        F: FnMut(Record<'_, C>) -> Result<(), E>,
        E: From<StoreError>,
    {
        self.replay(event_type, after, visitor)
    }

    #[instrument(skip(self, visitor))]
    fn replay<F, E>(&self, event_type: &str, after: u64, mut visitor: F) -> Result<(), E>
    where
        F: FnMut(Record<'_, C>) -> Result<(), E>,
        E: From<StoreError>,
    {
        let read_txn = self.store.begin_read()?;
        let name = namespace_name(event_type);
        let table = match read_txn.open_table(namespace(&name)) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => {
                return Err(StoreError::namespace_not_found(event_type).into());
            }
            Err(e) => return Err(StoreError::namespace(event_type, e).into()),
        };

        let Some(first) = after.checked_add(1) else {
            return Ok(());
        };
        let start = key::encode(first);
        let range = table
            .range(start.as_slice()..)
            .map_err(StoreError::from)?;

        for entry in range {
            let (k, v) = entry.map_err(StoreError::from)?;
            let sequence = key::decode(k.value())?;
            trace!(sequence, "Replaying record");
            visitor(Record::new(event_type, sequence, v.value(), &self.codec))?;
        }

        Ok(())
    }

    /// Decode every event of `event_type` into `T`, in append order
    pub fn read_all<T: DeserializeOwned>(&self, event_type: &str) -> StoreResult<Vec<(u64, T)>> {
        let mut events = Vec::new();
        self.iterate(event_type, |record| -> StoreResult<()> {
            events.push((record.sequence(), record.decode()?));
            Ok(())
        })?;
        Ok(events)
    }

    /// Whether `event_type` has ever been logged
    pub fn contains(&self, event_type: &str) -> StoreResult<bool> {
        let read_txn = self.store.begin_read()?;
        let name = namespace_name(event_type);
        match read_txn.open_table(namespace(&name)) {
            Ok(_) => Ok(true),
            Err(TableError::TableDoesNotExist(_)) => Ok(false),
            Err(e) => Err(StoreError::namespace(event_type, e)),
        }
    }

    /// Number of events logged under `event_type`
    pub fn len(&self, event_type: &str) -> StoreResult<u64> {
        let read_txn = self.store.begin_read()?;
        let name = namespace_name(event_type);
        match read_txn.open_table(namespace(&name)) {
            Ok(table) => Ok(table.len()?),
            Err(TableError::TableDoesNotExist(_)) => Ok(0),
            Err(e) => Err(StoreError::namespace(event_type, e)),
        }
    }

    /// Whether no event has been logged under `event_type`
    pub fn is_empty(&self, event_type: &str) -> StoreResult<bool> {
        Ok(self.len(event_type)? == 0)
    }

    /// Last sequence number issued for `event_type`, or 0 if none
    pub fn last_sequence(&self, event_type: &str) -> StoreResult<u64> {
        let read_txn = self.store.begin_read()?;
        let sequences = read_txn
            .open_table(SEQUENCES)
            .map_err(|e| StoreError::namespace(event_type, e))?;
        Ok(sequences.get(event_type)?.map(|v| v.value()).unwrap_or(0))
    }

    /// All event types logged so far, sorted
    pub fn event_types(&self) -> StoreResult<Vec<String>> {
        self.store.event_types()
    }

    /// Make all appended events durable
    pub fn flush(&self) -> StoreResult<()> {
        self.store.flush()
    }

    /// Flush and release the backing store
    pub fn close(self) -> StoreResult<()> {
        self.store.close()
    }
}

/// Append one payload inside an open write transaction
///
/// Creates the namespace on first use, then allocates and writes the next
/// sequence number. Nothing is visible until the caller commits.
pub(crate) fn append(
    write_txn: &WriteTransaction,
    event_type: &str,
    payload: &[u8],
) -> StoreResult<u64> {
    let name = namespace_name(event_type);
    let mut events = write_txn
        .open_table(namespace(&name))
        .map_err(|e| StoreError::namespace(event_type, e))?;
    let mut sequences = write_txn
        .open_table(SEQUENCES)
        .map_err(|e| StoreError::namespace(event_type, e))?;

    let last = sequences
        .get(event_type)
        .map_err(StoreError::commit)?
        .map(|v| v.value())
        .unwrap_or(0);
    let sequence = last
        .checked_add(1)
        .ok_or_else(|| StoreError::SequenceExhausted(event_type.to_string()))?;

    sequences
        .insert(event_type, sequence)
        .map_err(StoreError::commit)?;
    events
        .insert(key::encode(sequence).as_slice(), payload)
        .map_err(StoreError::commit)?;

    Ok(sequence)
}
