//! Configuration for opening an event log

use std::path::{Path, PathBuf};

/// Configuration for the backing store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the database file
    pub path: PathBuf,
    /// Page cache size in bytes
    pub cache_size: usize,
    /// Whether every append is durable on commit
    ///
    /// When false, appends commit without fsync and become durable on the
    /// next `flush` or on `close`.
    pub sync_on_write: bool,
    /// Create missing parent directories on open
    pub create_dirs: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/events.redb"),
            cache_size: 64 * 1024 * 1024, // 64MB
            sync_on_write: true,
            create_dirs: true,
        }
    }
}

impl StoreConfig {
    /// Default configuration for a database at `path`
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Set the page cache size
    pub fn with_cache_size(mut self, bytes: usize) -> Self {
        self.cache_size = bytes;
        self
    }

    /// Set whether appends are durable on commit
    pub fn with_sync_on_write(mut self, sync: bool) -> Self {
        self.sync_on_write = sync;
        self
    }

    /// Set whether missing parent directories are created
    pub fn with_create_dirs(mut self, create: bool) -> Self {
        self.create_dirs = create;
        self
    }
}
