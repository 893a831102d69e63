//! Raw key/value persistence
//!
//! Backends:
//! - `MemoryStorage`: in-process map (tests, headless runs)
//! - `FileStorage`: one file per key in a directory (native only)
//! - `LocalStorage`: browser LocalStorage (wasm32 only)
//!
//! Higher layers own the encoding; a backend only moves strings.

#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;
#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

use std::collections::HashMap;

use crate::error::StorageError;

/// Raw string storage keyed by name
pub trait Storage {
    /// Read the value stored under `key`, `None` when absent
    fn read_raw(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value
    fn write_raw(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for &mut S {
    fn read_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read_raw(key)
    }

    fn write_raw(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write_raw(key, value)
    }
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn read_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read_raw(key)
    }

    fn write_raw(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write_raw(key, value)
    }
}

/// In-memory storage
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn read_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn write_raw(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip() {
        let mut storage = MemoryStorage::new();
        assert!(storage.is_empty());
        assert_eq!(storage.read_raw("missing").unwrap(), None);

        storage.write_raw("k", "v1").unwrap();
        storage.write_raw("k", "v2").unwrap();
        assert_eq!(storage.read_raw("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_storage_through_mut_ref() {
        fn write_through(mut storage: impl Storage) {
            storage.write_raw("key", "value").unwrap();
        }

        let mut storage = MemoryStorage::new();
        write_through(&mut storage);
        assert_eq!(storage.read_raw("key").unwrap().as_deref(), Some("value"));
    }
}
