/* 📖 # What does efx_base contain?
efx_base holds the pieces every other efx module builds on: the error type,
tracing setup, settings, path normalization, runtime/platform detection and
the storage abstraction selected from that detection.
*/

pub mod config;
pub mod env;
pub mod error;
pub mod path;
pub mod storage;
mod storage_tests;
pub mod tracing;

// Re-export commonly used types for convenience
pub use config::{Settings, load_settings};
pub use env::{AppInfo, Environment, PlatformType, RuntimeType};
pub use error::{EfxError, EfxResult, ErrorKind, ResultExt};
pub use path::FilePath;
pub use storage::{KeyValueStorage, LocalStorage, Storage, StorageHandle, UnsupportedStorage};
