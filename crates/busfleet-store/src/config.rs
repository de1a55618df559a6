//! Storage configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration for opening a [`RocksStore`](crate::RocksStore).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the database files.
    #[serde(default = "StoreConfig::default_path")]
    pub path: PathBuf,

    /// Create the database (and missing column families) if absent.
    #[serde(default = "StoreConfig::default_create_if_missing")]
    pub create_if_missing: bool,

    /// Fsync the write-ahead log on every committed batch.
    #[serde(default = "StoreConfig::default_sync_writes")]
    pub sync_writes: bool,
}

impl StoreConfig {
    /// Default configuration rooted at `path`.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    fn default_path() -> PathBuf {
        PathBuf::from("busfleet-data")
    }

    const fn default_create_if_missing() -> bool {
        true
    }

    const fn default_sync_writes() -> bool {
        true
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
            create_if_missing: Self::default_create_if_missing(),
            sync_writes: Self::default_sync_writes(),
        }
    }
}
