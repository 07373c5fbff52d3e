use serde::Deserialize;

use crate::{EfxResult, FilePath, ResultExt, Storage};

/// Default name of the optional settings file.
pub const SETTINGS_FILE: &str = "efx.toml";

/// Library settings, read from an optional `efx.toml`.
///
/// Every field has a default, so an empty or missing file is valid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// File name of the package descriptor used to locate the local data path.
    pub descriptor: String,
    /// Name of the data directory created next to the descriptor.
    pub local_directory: String,
    /// Most verbose log level that is still printed, by name (`"debug"`, `"warn"`, ...).
    pub log_level: String,
    /// Extra directories searched for archive tools after `PATH`.
    pub archive_search_paths: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            descriptor: "package.json".to_string(),
            local_directory: "local".to_string(),
            log_level: "debug".to_string(),
            archive_search_paths: Vec::new(),
        }
    }
}

impl Settings {
    /// Parses settings from TOML text.
    pub fn from_toml(text: &str) -> EfxResult<Self> {
        toml::from_str(text).map_err(|e| crate::err!("Invalid settings: {}", e))
    }
}

/// Loads settings through the given storage.
///
/// A missing file yields the defaults.
pub fn load_settings(storage: &dyn Storage, path: &FilePath) -> EfxResult<Settings> {
    if !storage.has_file(path)? {
        return Ok(Settings::default());
    }
    let text = storage
        .open_text(path)
        .with_context(|| format!("Failed to read settings from '{}'", path))?;
    Settings::from_toml(&text).with_context(|| format!("Failed to load settings from '{}'", path))
}
