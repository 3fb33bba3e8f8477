//! Shell configuration.

use std::path::PathBuf;

use crate::model::{DEFAULT_FALLBACK_MESSAGE, DEFAULT_TITLE};
use crate::storage::default_storage_path;

/// Where the durable key-value storage lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    File(PathBuf),
    /// Nothing survives the process.
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub storage: StorageLocation,
    /// Initial navbar title.
    pub title: String,
    /// Text the route guard renders in place of a protected view.
    pub fallback_message: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            storage: StorageLocation::Memory,
            title: DEFAULT_TITLE.to_string(),
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
        }
    }
}

impl ShellConfig {
    /// Defaults with file storage at the platform path (or the env override).
    pub fn from_env() -> Self {
        Self {
            storage: StorageLocation::File(default_storage_path()),
            ..Self::default()
        }
    }

    pub fn with_storage(mut self, storage: StorageLocation) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_fallback_message(mut self, message: impl Into<String>) -> Self {
        self.fallback_message = message.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_in_memory() {
        let config = ShellConfig::default();
        assert_eq!(config.storage, StorageLocation::Memory);
        assert_eq!(config.title, "Dashboard");
        assert_eq!(config.fallback_message, "You are not authorized to view this route");
    }

    #[test]
    fn test_from_env_uses_a_storage_file() {
        let config = ShellConfig::from_env();
        assert_eq!(config.storage, StorageLocation::File(default_storage_path()));
        assert_eq!(config.title, "Dashboard");
    }
}
