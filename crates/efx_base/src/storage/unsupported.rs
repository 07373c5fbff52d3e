use crate::env::Environment;
use crate::{EfxError, EfxResult, ErrorKind, FilePath};

use super::traits::Storage;

/// Storage for hosts without any usable file access.
///
/// Every operation fails with [`ErrorKind::Unsupported`] naming the host.
#[derive(Debug, Clone)]
pub struct UnsupportedStorage {
    runtime: String,
    platform: String,
}

impl UnsupportedStorage {
    pub fn new(env: &Environment) -> Self {
        Self {
            runtime: env.runtime().to_string(),
            platform: env.platform().to_string(),
        }
    }

    fn fail<T>(&self, operation: &str, path: &FilePath) -> EfxResult<T> {
        Err(Box::new(
            EfxError::new(ErrorKind::Unsupported {
                runtime: self.runtime.clone(),
                platform: self.platform.clone(),
            })
            .context(format!("{} '{}'", operation, path)),
        ))
    }
}

impl Storage for UnsupportedStorage {
    fn has_file(&self, path: &FilePath) -> EfxResult<bool> {
        self.fail("has_file", path)
    }

    fn open_file(&self, path: &FilePath) -> EfxResult<Option<Vec<u8>>> {
        self.fail("open_file", path)
    }

    fn save_file(&self, path: &FilePath, _data: &[u8]) -> EfxResult<()> {
        self.fail("save_file", path)
    }

    fn delete_file(&self, path: &FilePath) -> EfxResult<()> {
        self.fail("delete_file", path)
    }

    fn has_directory(&self, path: &FilePath) -> EfxResult<bool> {
        self.fail("has_directory", path)
    }

    fn create_directory(&self, path: &FilePath) -> EfxResult<()> {
        self.fail("create_directory", path)
    }

    fn delete_directory(&self, path: &FilePath) -> EfxResult<bool> {
        self.fail("delete_directory", path)
    }

    fn copy_directory(&self, from: &FilePath, _to: &FilePath) -> EfxResult<()> {
        self.fail("copy_directory", from)
    }

    fn copy_file(&self, from: &FilePath, _to: &FilePath) -> EfxResult<()> {
        self.fail("copy_file", from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PlatformType, RuntimeType};

    #[test]
    fn test_every_operation_is_unsupported() {
        let env = Environment::new(RuntimeType::Unreal, PlatformType::Windows);
        let storage = UnsupportedStorage::new(&env);
        let path = FilePath::from("a/b.txt");

        let error = storage.open_file(&path).unwrap_err();
        assert_eq!(
            error.to_string(),
            "open_file 'a/b.txt': Unsupported runtime: Unreal on platform: Windows"
        );
        assert!(matches!(error.kind(), ErrorKind::Unsupported { .. }));

        assert!(storage.has_file(&path).is_err());
        assert!(storage.save_text(&path, "x").is_err());
        assert!(storage.delete_file(&path).is_err());
        assert!(storage.has_directory(&path).is_err());
        assert!(storage.create_directory(&path).is_err());
        assert!(storage.delete_directory(&path).is_err());
        assert!(storage.copy_file(&path, &path).is_err());
        assert!(storage.copy_directory(&path, &path).is_err());
    }
}
