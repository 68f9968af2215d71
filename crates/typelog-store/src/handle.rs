//! Store handle and on-disk layout
//!
//! Owns the redb database for one file. Each event type lives in its own
//! table, and a reserved table holds the last sequence number issued per
//! event type.

use std::path::{Path, PathBuf};

use redb::{
    Builder, Database, Durability, ReadTransaction, TableDefinition, TableHandle,
    WriteTransaction,
};
use tracing::{debug, info, instrument};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};

/// Prefix of every event table name
const NAMESPACE_PREFIX: &str = "event:";

// Key: event type, Value: last issued sequence number
pub(crate) const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

/// Table name for an event type
pub(crate) fn namespace_name(event_type: &str) -> String {
    format!("{NAMESPACE_PREFIX}{event_type}")
}

/// Table definition for an event type
///
/// Key: 8-byte big-endian sequence, Value: encoded payload
pub(crate) fn namespace(name: &str) -> TableDefinition<'_, &'static [u8], &'static [u8]> {
    TableDefinition::new(name)
}

/// Exclusive handle on an open store file
///
/// Dropping the handle releases the database. Use [`StoreHandle::close`] to
/// also flush pending non-durable commits and observe failures.
pub struct StoreHandle {
    db: Database,
    path: PathBuf,
    sync_on_write: bool,
}

impl std::fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHandle")
            .field("path", &self.path)
            .field("sync_on_write", &self.sync_on_write)
            .finish_non_exhaustive()
    }
}

impl StoreHandle {
    /// Open or create the database
    #[instrument(skip(config), fields(path = %config.path.display()))]
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        if config.create_dirs {
            if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Open(format!("{}: {e}", parent.display())))?;
            }
        }

        let db = Builder::new()
            .set_cache_size(config.cache_size)
            .create(&config.path)
            .map_err(|e| StoreError::Open(format!("{}: {e}", config.path.display())))?;

        let handle = Self {
            db,
            path: config.path.clone(),
            sync_on_write: config.sync_on_write,
        };
        handle.init_tables()?;

        info!("Opened event store");
        Ok(handle)
    }

    /// Create the reserved tables so readers never see them missing
    fn init_tables(&self) -> StoreResult<()> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| StoreError::Open(e.to_string()))?;
        write_txn
            .open_table(SEQUENCES)
            .map_err(|e| StoreError::Open(e.to_string()))?;
        write_txn
            .commit()
            .map_err(|e| StoreError::Open(e.to_string()))?;

        debug!("Initialized reserved tables");
        Ok(())
    }

    /// Path the store was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Begin a write transaction with the configured durability
    pub(crate) fn begin_write(&self) -> StoreResult<WriteTransaction> {
        let mut txn = self.db.begin_write()?;
        if !self.sync_on_write {
            txn.set_durability(Durability::None);
        }
        Ok(txn)
    }

    /// Begin a read transaction over a consistent snapshot
    pub(crate) fn begin_read(&self) -> StoreResult<ReadTransaction> {
        Ok(self.db.begin_read()?)
    }

    /// Names of all event types that have a namespace, sorted
    pub fn event_types(&self) -> StoreResult<Vec<String>> {
        let read_txn = self.begin_read()?;
        let mut types: Vec<String> = read_txn
            .list_tables()?
            .filter_map(|table| {
                table
                    .name()
                    .strip_prefix(NAMESPACE_PREFIX)
                    .map(str::to_string)
            })
            .collect();
        types.sort();
        Ok(types)
    }

    /// Make every committed transaction durable
    ///
    /// An empty commit with immediate durability persists all earlier
    /// non-durable commits.
    pub fn flush(&self) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        write_txn.commit()?;
        Ok(())
    }

    /// Flush and release the store
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn close(self) -> StoreResult<()> {
        self.flush().map_err(|e| StoreError::Close(e.to_string()))?;
        drop(self.db);
        info!("Closed event store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_handle() -> (StoreHandle, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = StoreConfig::new(temp_dir.path().join("test.redb"));
        let handle = StoreHandle::open(&config).unwrap();
        (handle, temp_dir)
    }

    #[test]
    fn test_open_creates_file() {
        let (handle, temp) = create_test_handle();
        assert!(temp.path().join("test.redb").exists());
        assert_eq!(handle.path(), temp.path().join("test.redb"));
        assert!(handle.event_types().unwrap().is_empty());
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/deeper/events.redb");
        let handle = StoreHandle::open(&StoreConfig::new(&path)).unwrap();
        assert!(path.exists());
        handle.close().unwrap();
    }

    #[test]
    fn test_open_missing_parent_without_create_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let config = StoreConfig::new(temp_dir.path().join("missing/events.redb"))
            .with_create_dirs(false);
        let err = StoreHandle::open(&config).unwrap_err();
        assert!(matches!(err, StoreError::Open(_)));
    }

    #[test]
    fn test_open_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let err = StoreHandle::open(&StoreConfig::new(temp_dir.path())).unwrap_err();
        assert!(matches!(err, StoreError::Open(_)));
    }

    #[test]
    fn test_open_under_regular_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let not_a_dir = temp_dir.path().join("not_a_dir");
        std::fs::write(&not_a_dir, b"plain file").unwrap();

        let err = StoreHandle::open(&StoreConfig::new(not_a_dir.join("events.redb"))).unwrap_err();
        assert!(matches!(err, StoreError::Open(_)));

        let config = StoreConfig::new(not_a_dir.join("events.redb")).with_create_dirs(false);
        let err = StoreHandle::open(&config).unwrap_err();
        assert!(matches!(err, StoreError::Open(_)));
    }

    #[test]
    fn test_second_open_of_same_file_fails() {
        let (_handle, temp) = create_test_handle();
        let err = StoreHandle::open(&StoreConfig::new(temp.path().join("test.redb"))).unwrap_err();
        assert!(matches!(err, StoreError::Open(_)));
    }

    #[test]
    fn test_close_then_reopen() {
        let (handle, temp) = create_test_handle();
        handle.close().unwrap();

        let reopened = StoreHandle::open(&StoreConfig::new(temp.path().join("test.redb")));
        assert!(reopened.is_ok());
    }

    #[test]
    fn test_namespace_names() {
        assert_eq!(namespace_name("signup"), "event:signup");
        assert_eq!(namespace_name(""), "event:");
    }
}
