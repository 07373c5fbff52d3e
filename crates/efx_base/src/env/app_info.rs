use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{EfxResult, FilePath, Settings, Storage};

use super::{Environment, RuntimeType};

/// Placeholder used when a value could not be determined.
pub const UNKNOWN: &str = "Unknown";

/// Product information of the running application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    pub product: String,
    pub author: String,
    pub identifier: String,
    pub version: String,
    pub description: String,
}

impl Default for AppInfo {
    fn default() -> Self {
        Self {
            product: UNKNOWN.to_string(),
            author: UNKNOWN.to_string(),
            identifier: UNKNOWN.to_string(),
            version: "0.0".to_string(),
            description: String::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Author {
    Name(String),
    Person { name: Option<String> },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PackageDescriptor {
    name: Option<String>,
    #[serde(rename = "displayName")]
    display_name: Option<String>,
    publisher: Option<String>,
    author: Option<Author>,
    version: Option<String>,
    description: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl AppInfo {
    /// Builds the info from package descriptor JSON.
    pub fn from_json(text: &str) -> EfxResult<Self> {
        let package: PackageDescriptor = serde_json::from_str(text)
            .map_err(|e| crate::err!("Invalid package descriptor: {}", e))?;
        let defaults = AppInfo::default();

        let author = non_empty(package.publisher).or(match package.author {
            Some(Author::Name(name)) => non_empty(Some(name)),
            Some(Author::Person { name }) => non_empty(name),
            None => None,
        });

        Ok(Self {
            product: non_empty(package.display_name)
                .or_else(|| non_empty(package.name.clone()))
                .unwrap_or(defaults.product),
            author: author.unwrap_or(defaults.author),
            identifier: non_empty(package.name).unwrap_or(defaults.identifier),
            version: non_empty(package.version).unwrap_or(defaults.version),
            description: package.description.unwrap_or(defaults.description),
        })
    }

    /// Reads the info for the host.
    ///
    /// Processes read the package descriptor that sits next to the local data
    /// directory, engines report their own. A missing or broken descriptor
    /// silently yields the defaults.
    pub fn load(
        env: &Environment,
        storage: &dyn Storage,
        settings: &Settings,
        local_path: &FilePath,
    ) -> Self {
        if env.is_node() {
            let descriptor = FilePath::new(crate::path::join(&[
                local_path.as_str(),
                "..",
                settings.descriptor.as_str(),
            ]));
            return Self::read_descriptor(storage, &descriptor).unwrap_or_default();
        }
        env.engine()
            .and_then(|engine| engine.app_info())
            .unwrap_or_default()
    }

    fn read_descriptor(storage: &dyn Storage, descriptor: &FilePath) -> Option<Self> {
        if !storage.has_file(descriptor).ok()? {
            return None;
        }
        let text = storage.open_text(descriptor).ok()?;
        match Self::from_json(&text) {
            Ok(info) => Some(info),
            Err(e) => {
                debug!(error = %e, descriptor = %descriptor, "ignoring package descriptor");
                None
            }
        }
    }
}

/// Directories searched for the package descriptor of a process: the
/// directory of the executable, then the working directory.
pub fn default_roots() -> Vec<FilePath> {
    let mut roots = Vec::new();
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(FilePath::from))
    {
        roots.push(dir);
    }
    if let Ok(cwd) = std::env::current_dir() {
        roots.push(FilePath::from(cwd.as_path()));
    }
    roots
}

/// Resolves and creates the directory the application keeps its data in.
///
/// Returns [`UNKNOWN`] when a process has no package descriptor in any of the
/// `roots` or their parents, or when an engine reports no writable path.
#[instrument(skip(env, storage, settings, roots), fields(runtime = %env.runtime()))]
pub fn resolve_local_path(
    env: &Environment,
    storage: &dyn Storage,
    settings: &Settings,
    roots: &[FilePath],
) -> EfxResult<FilePath> {
    let resolved = match env.runtime() {
        RuntimeType::Native | RuntimeType::Code => {
            find_package_root(storage, settings, roots)?
                .map(|root| root.join(&settings.local_directory))
        }
        RuntimeType::Dom => Some(FilePath::from("file://")),
        RuntimeType::Cocos | RuntimeType::Unity | RuntimeType::Unreal => env
            .engine()
            .and_then(|engine| engine.writable_path())
            .map(|dir| FilePath::new(dir).join(&settings.local_directory)),
    };

    let Some(local) = resolved else {
        debug!("local path could not be resolved");
        return Ok(FilePath::from(UNKNOWN));
    };
    if !storage.has_directory(&local)? {
        storage.create_directory(&local)?;
    }
    debug!(local = %local, "resolved local path");
    Ok(local)
}

fn find_package_root(
    storage: &dyn Storage,
    settings: &Settings,
    roots: &[FilePath],
) -> EfxResult<Option<FilePath>> {
    for root in roots {
        if storage.has_file(&root.join(&settings.descriptor))? {
            return Ok(Some(root.clone()));
        }
        let parent = root.join("..");
        if !parent.is_empty() && storage.has_file(&parent.join(&settings.descriptor))? {
            return Ok(Some(parent));
        }
    }
    Ok(None)
}
