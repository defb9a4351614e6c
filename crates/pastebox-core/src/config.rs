//! Store configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::lifecycle::PurgeMode;

/// Settings for a [`FilesystemStore`](crate::storage::FilesystemStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Root directory of the durable medium
    pub root: PathBuf,

    /// How expired pastes found during reads are reclaimed
    #[serde(default)]
    pub purge_mode: PurgeMode,

    /// Flush record files to disk before publishing them
    #[serde(default = "default_fsync")]
    pub fsync: bool,
}

fn default_fsync() -> bool {
    true
}

impl StoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            purge_mode: PurgeMode::default(),
            fsync: default_fsync(),
        }
    }

    pub fn with_purge_mode(mut self, mode: PurgeMode) -> Self {
        self.purge_mode = mode;
        self
    }

    pub fn with_fsync(mut self, fsync: bool) -> Self {
        self.fsync = fsync;
        self
    }
}
