use std::sync::Arc;

use crate::env::{Environment, PlatformType, RuntimeType};
use crate::{EfxResult, FilePath};

use super::{KeyValueStorage, LocalStorage, UnsupportedStorage};

/* 📖 # Why is Storage a trait instead of a branch per call?

Every host stores files differently: a process has a filesystem, a browser only
has a key-value store, some embedded engines have nothing usable yet. Each host
gets one Storage implementation, and StorageHandle::for_environment picks it once
from the detected runtime. Callers never branch on the runtime themselves.
*/

/// Uniform file and directory operations over a host storage backend.
///
/// Three implementations are provided:
/// - `LocalStorage`: the real filesystem via `std::fs`
/// - `KeyValueStorage`: browser-style key-value emulation, directories are key prefixes
/// - `UnsupportedStorage`: fails every operation with the unsupported error
pub trait Storage: std::fmt::Debug + Send + Sync + 'static {
    /// Check if a file exists at the given path.
    fn has_file(&self, path: &FilePath) -> EfxResult<bool>;

    /// Read the whole file. Returns `None` if the file does not exist.
    fn open_file(&self, path: &FilePath) -> EfxResult<Option<Vec<u8>>>;

    /// Write the whole file, creating its directory first if needed.
    fn save_file(&self, path: &FilePath, data: &[u8]) -> EfxResult<()>;

    /// Delete the file if it exists.
    fn delete_file(&self, path: &FilePath) -> EfxResult<()>;

    /// Check if a directory exists at the given path.
    fn has_directory(&self, path: &FilePath) -> EfxResult<bool>;

    /// Create a directory and every missing parent.
    fn create_directory(&self, path: &FilePath) -> EfxResult<()>;

    /// Delete a directory and all of its contents.
    ///
    /// Returns whether anything was deleted.
    fn delete_directory(&self, path: &FilePath) -> EfxResult<bool>;

    /// Copy a directory tree into `to`, overwriting files that already exist.
    fn copy_directory(&self, from: &FilePath, to: &FilePath) -> EfxResult<()>;

    /// Copy a single file, replacing the destination.
    ///
    /// Nothing happens when the source does not exist.
    fn copy_file(&self, from: &FilePath, to: &FilePath) -> EfxResult<()> {
        if from.is_empty() || to.is_empty() || !self.has_file(from)? {
            return Ok(());
        }
        let dir = to.parent();
        if !dir.is_empty() && dir != *to && !self.has_directory(&dir)? {
            self.create_directory(&dir)?;
        }
        if self.has_file(to)? {
            self.delete_file(to)?;
        }
        if let Some(data) = self.open_file(from)? {
            self.save_file(to, &data)?;
        }
        Ok(())
    }

    /// Read a file as UTF-8 text. A missing file reads as an empty string.
    fn open_text(&self, path: &FilePath) -> EfxResult<String> {
        match self.open_file(path)? {
            Some(data) => {
                String::from_utf8(data).map_err(|_e| crate::err!("File is not valid UTF-8: {}", path))
            }
            None => Ok(String::new()),
        }
    }

    /// Write text to a file. Empty text is not written.
    fn save_text(&self, path: &FilePath, text: &str) -> EfxResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.save_file(path, text.as_bytes())
    }
}

/// Handle to a Storage implementation, enabling shared ownership.
///
/// Internally wraps `Arc<dyn Storage>` for cheap cloning and thread-safe sharing.
///
/// # Examples
///
/// ```
/// use efx_base::{FilePath, KeyValueStorage, StorageHandle};
///
/// let storage = StorageHandle::new(KeyValueStorage::new());
/// storage.save_text(&FilePath::from("notes/a.txt"), "hello").unwrap();
/// assert!(storage.has_directory(&FilePath::from("notes")).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct StorageHandle(Arc<dyn Storage>);

impl StorageHandle {
    /// Create a new StorageHandle from a Storage implementation.
    pub fn new(storage: impl Storage + 'static) -> Self {
        Self(Arc::new(storage))
    }

    /// Select the backend for the given environment.
    pub fn for_environment(env: &Environment) -> Self {
        match env.runtime() {
            RuntimeType::Native | RuntimeType::Code => Self::new(LocalStorage::current_dir()),
            RuntimeType::Cocos | RuntimeType::Unity => {
                if env.platform() == PlatformType::Browser {
                    Self::new(KeyValueStorage::new())
                } else {
                    Self::new(LocalStorage::current_dir())
                }
            }
            RuntimeType::Dom => Self::new(KeyValueStorage::new()),
            RuntimeType::Unreal => Self::new(UnsupportedStorage::new(env)),
        }
    }
}

impl std::ops::Deref for StorageHandle {
    type Target = dyn Storage;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}
