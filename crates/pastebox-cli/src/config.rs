use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use pastebox_core::lifecycle::PurgeMode;
use pastebox_core::StoreConfig;

/// Default number of pastes removed by one `purge` run.
pub const DEFAULT_PURGE_BATCH_SIZE: usize = 10;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PasteboxConfig {
    #[serde(default)]
    pub store: StoreSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreSection {
    pub root: Option<String>,
    #[serde(default)]
    pub purge_mode: PurgeMode,
    #[serde(default = "default_fsync")]
    pub fsync: bool,
    #[serde(default = "default_purge_batch_size")]
    pub purge_batch_size: usize,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            root: None,
            purge_mode: PurgeMode::default(),
            fsync: default_fsync(),
            purge_batch_size: default_purge_batch_size(),
        }
    }
}

fn default_fsync() -> bool {
    true
}

fn default_purge_batch_size() -> usize {
    DEFAULT_PURGE_BATCH_SIZE
}

impl PasteboxConfig {
    /// Build the core store settings, letting `root_override` win over the file.
    ///
    /// A CLI process exits as soon as its command is done, which would kill a
    /// detached purge worker mid-flight, so background reclamation runs inline
    /// here.
    pub fn store_config(&self, root_override: Option<&str>) -> anyhow::Result<StoreConfig> {
        let root = match root_override.or(self.store.root.as_deref()) {
            Some(value) if !value.trim().is_empty() => PathBuf::from(value),
            _ => default_root_path()?,
        };
        let purge_mode = match self.store.purge_mode {
            PurgeMode::Background => PurgeMode::Inline,
            other => other,
        };
        Ok(StoreConfig::new(root)
            .with_purge_mode(purge_mode)
            .with_fsync(self.store.fsync))
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_root_path() -> anyhow::Result<PathBuf> {
    xdg_data_dir()
}

pub fn read_config(path: &Path) -> anyhow::Result<PasteboxConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("pastebox"));
        }
    }
    Ok(home_dir()?.join(".config").join("pastebox"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("pastebox"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("pastebox"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: PasteboxConfig = toml::from_str(
            "[store]\nroot = \"/srv/pastes\"\npurge_mode = \"inline\"\nfsync = false\npurge_batch_size = 50\n",
        )
        .unwrap();
        assert_eq!(config.store.root.as_deref(), Some("/srv/pastes"));
        assert_eq!(config.store.purge_mode, PurgeMode::Inline);
        assert!(!config.store.fsync);
        assert_eq!(config.store.purge_batch_size, 50);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: PasteboxConfig = toml::from_str("").unwrap();
        assert!(config.store.root.is_none());
        assert_eq!(config.store.purge_mode, PurgeMode::Background);
        assert!(config.store.fsync);
        assert_eq!(config.store.purge_batch_size, DEFAULT_PURGE_BATCH_SIZE);
    }

    #[test]
    fn test_root_override_wins() {
        let config: PasteboxConfig = toml::from_str("[store]\nroot = \"/from/file\"\n").unwrap();
        let store = config.store_config(Some("/from/flag")).unwrap();
        assert_eq!(store.root, PathBuf::from("/from/flag"));
        let store = config.store_config(None).unwrap();
        assert_eq!(store.root, PathBuf::from("/from/file"));
    }

    #[test]
    fn test_background_purge_runs_inline_in_cli() {
        let config: PasteboxConfig = toml::from_str("[store]\nroot = \"/srv\"\n").unwrap();
        assert_eq!(config.store.purge_mode, PurgeMode::Background);
        let store = config.store_config(None).unwrap();
        assert_eq!(store.purge_mode, PurgeMode::Inline);

        let config: PasteboxConfig =
            toml::from_str("[store]\nroot = \"/srv\"\npurge_mode = \"disabled\"\n").unwrap();
        assert_eq!(config.store_config(None).unwrap().purge_mode, PurgeMode::Disabled);
    }
}
