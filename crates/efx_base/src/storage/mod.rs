/* 📖 # What does the storage module provide?

One `Storage` trait with an implementation per kind of host:
- `LocalStorage` for processes that can touch the filesystem
- `KeyValueStorage` for browser hosts, emulating directories over flat keys
- `UnsupportedStorage` for hosts without any file access

`StorageHandle::for_environment` picks the implementation once from the
detected `Environment`. All paths are `FilePath` values, so every backend
sees the same normalized form.
*/

mod key_value;
mod local;
mod traits;
mod unsupported;

pub use key_value::{KeyValueStorage, KeyValueStore, MemoryKeyValueStore};
pub use local::LocalStorage;
pub use traits::{Storage, StorageHandle};
pub use unsupported::UnsupportedStorage;
