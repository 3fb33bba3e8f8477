//! Key-value storage backends.
//!
//! Two scopes exist: a durable store (one JSON file, holding only the
//! sidebar's persisted slice) and an ephemeral session store (the last
//! denied path). Both speak [`KeyValueStorage`].

mod local;

use std::cell::RefCell;
use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::StorageError;

pub use local::{default_storage_path, JsonFileStorage};

/// Minimal key-value contract shared by the durable and session stores.
pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> Result<Option<Value>, StorageError>;

    fn set_item(&self, key: &str, value: Value) -> Result<(), StorageError>;

    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Persist pending writes. In-memory backends have nothing to do.
    fn flush(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Process-lifetime storage with no durability.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<BTreeMap<String, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.items.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}
