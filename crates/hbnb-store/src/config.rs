use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where records are persisted unless configured otherwise.
pub const DEFAULT_FILE_PATH: &str = "file.json";

/// Flush strategy after a save.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncMode {
    /// Rely on OS page-cache buffering.
    OsDefault,
    /// `fsync` the file after every save.
    EveryWrite,
}

impl Default for SyncMode {
    fn default() -> Self {
        Self::OsDefault
    }
}

/// Configuration for [`FileStorage`](crate::FileStorage).
///
/// Fixed for the lifetime of the storage; individual save/reload calls take
/// no path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// The persistence file.
    pub path: PathBuf,
    /// Pretty-print the JSON container.
    pub pretty: bool,
    pub sync_mode: SyncMode,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_FILE_PATH),
            pretty: false,
            sync_mode: SyncMode::default(),
        }
    }
}

impl StorageConfig {
    /// Default settings, persisting to `path`.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = StorageConfig::default();
        assert_eq!(c.path, PathBuf::from("file.json"));
        assert!(!c.pretty);
        assert_eq!(c.sync_mode, SyncMode::OsDefault);
    }

    #[test]
    fn at_overrides_path_only() {
        let c = StorageConfig::at("/tmp/objects.json");
        assert_eq!(c.path, PathBuf::from("/tmp/objects.json"));
        assert_eq!(c.sync_mode, SyncMode::OsDefault);
    }

    #[test]
    fn config_serde_roundtrip() {
        let c = StorageConfig {
            path: "data/store.json".into(),
            pretty: true,
            sync_mode: SyncMode::EveryWrite,
        };
        let json = serde_json::to_string(&c).unwrap();
        let parsed: StorageConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, c);
    }
}
