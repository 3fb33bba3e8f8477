//! JSON file storage.
//!
//! Stores every key in one JSON object at `<config dir>/dashgate/storage.json`
//! (or wherever `DASHGATE_STORAGE_PATH` points).
//!
//! Uses an in-memory cache so toggles never hit the disk. Call `flush()` to
//! persist changes; the shell flushes on shutdown.

use std::cell::{Cell, RefCell};
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde_json::{Map, Value};

use super::KeyValueStorage;
use crate::error::StorageError;
use crate::model::constants::{APP_DIR_NAME, STORAGE_FILE_NAME, STORAGE_PATH_ENV};

/// Resolve the storage file path: env override, then the user config dir.
pub fn default_storage_path() -> PathBuf {
    if let Ok(path) = env::var(STORAGE_PATH_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join(STORAGE_FILE_NAME)
}

/// Durable key-value storage backed by a JSON file.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    cache: RefCell<Map<String, Value>>,
    dirty: Cell<bool>,
}

impl JsonFileStorage {
    /// Open the storage file, loading it into the cache.
    ///
    /// A missing file is an empty store. A file that is not a JSON object is
    /// logged and treated as empty; it will be overwritten on the next flush.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let cache = load_from_disk(&path)?;
        debug!("[JsonFileStorage] loaded {} key(s) from {}", cache.len(), path.display());
        Ok(Self {
            path,
            cache: RefCell::new(cache),
            dirty: Cell::new(false),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when the cache holds writes not yet flushed.
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }
}

fn load_from_disk(path: &Path) -> Result<Map<String, Value>, StorageError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Map::new()),
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    match serde_json::from_str::<Value>(&contents) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => {
            warn!("[JsonFileStorage] {} is not a JSON object; starting empty", path.display());
            Ok(Map::new())
        }
        Err(err) => {
            warn!("[JsonFileStorage] failed to parse {}: {err}; starting empty", path.display());
            Ok(Map::new())
        }
    }
}

impl KeyValueStorage for JsonFileStorage {
    fn get_item(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.cache.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let mut cache = self.cache.borrow_mut();
        if cache.get(key) != Some(&value) {
            cache.insert(key.to_string(), value);
            self.dirty.set(true);
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        if self.cache.borrow_mut().remove(key).is_some() {
            self.dirty.set(true);
        }
        Ok(())
    }

    /// Write the cache to disk if dirty.
    fn flush(&self) -> Result<(), StorageError> {
        if !self.dirty.get() {
            return Ok(());
        }
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let json = serde_json::to_string_pretty(&*self.cache.borrow())?;
        fs::write(&self.path, json).map_err(io_err)?;
        self.dirty.set(false);
        info!("[JsonFileStorage] flushed to {}", self.path.display());
        Ok(())
    }
}
