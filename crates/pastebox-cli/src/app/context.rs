//! Application context for the Pastebox CLI.
//!
//! Provides a unified context that combines CLI arguments with
//! lazily-loaded configuration.

use once_cell::unsync::OnceCell;

use pastebox_core::FilesystemStore;

use crate::cli::Cli;
use crate::config::{read_config, PasteboxConfig};

use super::resolver::resolve_config_path;

/// Application context that bundles CLI args with configuration.
///
/// This avoids repeatedly loading config and threading multiple parameters
/// through handler functions.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<PasteboxConfig>,
}

impl<'a> AppContext<'a> {
    /// Create a new application context from CLI arguments.
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
        }
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// Get the configuration, loading it lazily. A missing file means defaults.
    pub fn config(&self) -> anyhow::Result<&PasteboxConfig> {
        self.config.get_or_try_init(|| {
            let path = resolve_config_path()?;
            if path.exists() {
                read_config(&path)
            } else {
                Ok(PasteboxConfig::default())
            }
        })
    }

    /// Open the store at the resolved root.
    pub fn open_store(&self) -> anyhow::Result<FilesystemStore> {
        let store_config = self.config()?.store_config(self.cli.root.as_deref())?;
        tracing::debug!(root = %store_config.root.display(), "opening store");
        Ok(FilesystemStore::open(store_config)?)
    }
}
