use std::fs;
use std::path::PathBuf;

use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::path::fold_segments;
use crate::{EfxError, EfxResult, FilePath};

use super::traits::Storage;

/// Storage implementation using the real filesystem via `std::fs`.
///
/// Relative paths are resolved against a configured base directory; absolute
/// paths are used as they are.
#[derive(Debug)]
pub struct LocalStorage {
    base_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage resolving relative paths against `base_dir`.
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// LocalStorage rooted at the process working directory.
    pub fn current_dir() -> Self {
        Self::new(PathBuf::from("."))
    }

    fn resolve_path(&self, path: &FilePath) -> PathBuf {
        let raw = path.as_path();
        if raw.is_absolute() || path.as_str().starts_with('/') {
            raw.to_path_buf()
        } else {
            self.base_dir.join(raw)
        }
    }

    fn is_root_segment(stack: &[String]) -> bool {
        match stack {
            [only] => only.is_empty() || only == "." || only.ends_with(':'),
            _ => false,
        }
    }
}

impl Storage for LocalStorage {
    #[instrument(skip(self), fields(path = %path))]
    fn has_file(&self, path: &FilePath) -> EfxResult<bool> {
        if path.is_empty() {
            return Ok(false);
        }
        let resolved = self.resolve_path(path);
        let exists = fs::metadata(&resolved).map(|m| m.is_file()).unwrap_or(false);
        debug!(exists, resolved = %resolved.display(), "checked file existence");
        Ok(exists)
    }

    #[instrument(skip(self), fields(path = %path))]
    fn open_file(&self, path: &FilePath) -> EfxResult<Option<Vec<u8>>> {
        if !self.has_file(path)? {
            return Ok(None);
        }
        let resolved = self.resolve_path(path);
        let data = fs::read(&resolved).map_err(|e| {
            debug!(error = %e, "failed to read file");
            Box::new(EfxError::file(resolved, e))
        })?;
        debug!(bytes = data.len(), "file read successfully");
        Ok(Some(data))
    }

    #[instrument(skip(self, data), fields(path = %path, bytes = data.len()))]
    fn save_file(&self, path: &FilePath, data: &[u8]) -> EfxResult<()> {
        if path.is_empty() {
            return Ok(());
        }
        let dir = path.parent();
        if !dir.is_empty() && dir != *path && !self.has_directory(&dir)? {
            self.create_directory(&dir)?;
        }
        let resolved = self.resolve_path(path);
        fs::write(&resolved, data).map_err(|e| {
            debug!(error = %e, "failed to write file");
            Box::new(EfxError::file(resolved, e))
        })?;
        debug!("file written successfully");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path))]
    fn delete_file(&self, path: &FilePath) -> EfxResult<()> {
        if !self.has_file(path)? {
            return Ok(());
        }
        let resolved = self.resolve_path(path);
        fs::remove_file(&resolved).map_err(|e| {
            debug!(error = %e, "failed to delete file");
            Box::new(EfxError::file(resolved, e))
        })?;
        debug!("file deleted");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path))]
    fn has_directory(&self, path: &FilePath) -> EfxResult<bool> {
        if path.is_empty() {
            return Ok(false);
        }
        let resolved = self.resolve_path(path);
        let exists = fs::metadata(&resolved).map(|m| m.is_dir()).unwrap_or(false);
        debug!(exists, resolved = %resolved.display(), "checked directory existence");
        Ok(exists)
    }

    #[instrument(skip(self), fields(path = %path))]
    fn create_directory(&self, path: &FilePath) -> EfxResult<()> {
        if path.is_empty() || self.has_directory(path)? {
            return Ok(());
        }
        if !path.scheme().is_empty() {
            debug!("scheme paths are not created on the local filesystem");
            return Ok(());
        }

        // One component at a time, checking before each create.
        let mut result: EfxResult<()> = Ok(());
        fold_segments(path.as_str(), |stack| {
            if result.is_err() || Self::is_root_segment(stack) {
                return;
            }
            let partial = FilePath::new(stack.join("/"));
            match self.has_directory(&partial) {
                Ok(true) => {}
                Ok(false) => {
                    let resolved = self.resolve_path(&partial);
                    debug!(resolved = %resolved.display(), "creating directory");
                    if let Err(e) = fs::create_dir(&resolved) {
                        debug!(error = %e, "failed to create directory");
                        result = Err(Box::new(EfxError::file(resolved, e)));
                    }
                }
                Err(e) => result = Err(e),
            }
        });
        result
    }

    #[instrument(skip(self), fields(path = %path))]
    fn delete_directory(&self, path: &FilePath) -> EfxResult<bool> {
        if !self.has_directory(path)? {
            return Ok(false);
        }
        let resolved = self.resolve_path(path);
        debug!(resolved = %resolved.display(), "removing directory and contents");
        fs::remove_dir_all(&resolved).map_err(|e| {
            debug!(error = %e, "failed to remove directory");
            Box::new(EfxError::file(resolved, e))
        })?;
        Ok(true)
    }

    #[instrument(skip(self), fields(from = %from, to = %to))]
    fn copy_directory(&self, from: &FilePath, to: &FilePath) -> EfxResult<()> {
        if from.is_empty() || to.is_empty() || !self.has_directory(from)? {
            return Ok(());
        }
        self.create_directory(to)?;

        let root = self.resolve_path(from);
        for entry in WalkDir::new(&root).min_depth(1) {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| root.clone());
                Box::new(EfxError::file(path, std::io::Error::other(e.to_string())))
            })?;
            let Ok(relative) = entry.path().strip_prefix(&root) else {
                continue;
            };
            let relative = relative.to_string_lossy();
            let target = to.join(relative.as_ref());
            if entry.file_type().is_dir() {
                self.create_directory(&target)?;
            } else {
                self.copy_file(&from.join(relative.as_ref()), &target)?;
            }
        }
        debug!("directory copied");
        Ok(())
    }
}
