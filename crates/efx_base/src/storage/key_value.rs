use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, instrument};

use crate::{EfxResult, FilePath};

use super::traits::Storage;

/* 📖 # How does KeyValueStorage emulate directories?

A browser host only offers a flat key-value store. Files are stored under their
normalized path as key. A directory has no record of its own unless it was created
empty, in which case an empty marker entry is stored under the directory path.
A directory exists when some key equals its path or starts with its path followed
by `/`, which makes every directory query a scan over all keys.
*/

/// Flat key-value store backing [`KeyValueStorage`].
pub trait KeyValueStore: std::fmt::Debug + Send + Sync {
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    fn set(&self, key: &str, value: Vec<u8>);

    /// Returns whether the key was present.
    fn remove(&self, key: &str) -> bool;

    fn keys(&self) -> Vec<String>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// In-memory key-value store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: Vec<u8>) {
        self.entries.lock().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) -> bool {
        self.entries.lock().remove(key).is_some()
    }

    fn keys(&self) -> Vec<String> {
        self.entries.lock().keys().cloned().collect()
    }

    fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }
}

/// Storage emulated on top of a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct KeyValueStorage {
    store: Arc<dyn KeyValueStore>,
}

impl KeyValueStorage {
    /// KeyValueStorage over a fresh in-memory store.
    pub fn new() -> Self {
        Self::with_store(MemoryKeyValueStore::new())
    }

    pub fn with_store(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    fn is_within(key: &str, dir: &str) -> bool {
        key == dir
            || key
                .strip_prefix(dir)
                .is_some_and(|rest| rest.starts_with('/') || dir.ends_with('/'))
    }
}

impl Default for KeyValueStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for KeyValueStorage {
    fn has_file(&self, path: &FilePath) -> EfxResult<bool> {
        Ok(!path.is_empty() && self.store.contains(path.as_str()))
    }

    fn open_file(&self, path: &FilePath) -> EfxResult<Option<Vec<u8>>> {
        if path.is_empty() {
            return Ok(None);
        }
        Ok(self.store.get(path.as_str()))
    }

    #[instrument(skip(self, data), fields(path = %path, bytes = data.len()))]
    fn save_file(&self, path: &FilePath, data: &[u8]) -> EfxResult<()> {
        if !path.is_empty() {
            self.store.set(path.as_str(), data.to_vec());
        }
        Ok(())
    }

    fn delete_file(&self, path: &FilePath) -> EfxResult<()> {
        if !path.is_empty() {
            self.store.remove(path.as_str());
        }
        Ok(())
    }

    fn has_directory(&self, path: &FilePath) -> EfxResult<bool> {
        if path.is_empty() {
            return Ok(false);
        }
        let dir = path.as_str();
        Ok(self
            .store
            .keys()
            .iter()
            .any(|key| Self::is_within(key, dir)))
    }

    #[instrument(skip(self), fields(path = %path))]
    fn create_directory(&self, path: &FilePath) -> EfxResult<()> {
        if path.is_empty() || self.has_directory(path)? {
            return Ok(());
        }
        debug!("storing directory marker");
        self.store.set(path.as_str(), Vec::new());
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path))]
    fn delete_directory(&self, path: &FilePath) -> EfxResult<bool> {
        if path.is_empty() {
            return Ok(false);
        }
        let dir = path.as_str();
        let mut removed = 0;
        for key in self.store.keys() {
            if Self::is_within(&key, dir) && self.store.remove(&key) {
                removed += 1;
            }
        }
        debug!(removed, "removed keys under directory");
        Ok(removed > 0)
    }

    #[instrument(skip(self), fields(from = %from, to = %to))]
    fn copy_directory(&self, from: &FilePath, to: &FilePath) -> EfxResult<()> {
        if from.is_empty() || to.is_empty() || !self.has_directory(from)? {
            return Ok(());
        }
        let prefix = from.as_str();
        for key in self.store.keys() {
            if !Self::is_within(&key, prefix) {
                continue;
            }
            let target = FilePath::new(format!("{}{}", to, &key[prefix.len()..]));
            if let Some(value) = self.store.get(&key) {
                self.store.set(target.as_str(), value);
            }
        }
        Ok(())
    }
}
