use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Writes files beneath `base_path`; absolute paths passed to `write_file`
/// bypass the base.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Storage rooted at the process working directory.
    pub fn current_dir() -> Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }
}

/// Absolute form of `path` with `.` and `..` folded away lexically.
fn absolute_normalized(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

impl Storage for LocalStorage {
    fn root(&self) -> PathBuf {
        absolute_normalized(&self.base_path)
    }

    fn locate(&self, path: &str) -> PathBuf {
        absolute_normalized(&self.base_path.join(path))
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<PathBuf> {
        let full_path = self.locate(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&full_path, data)?;
        tracing::debug!("Wrote {} bytes to {}", data.len(), full_path.display());
        Ok(full_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_file_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        let written = storage.write_file("nested/cat.png", b"meow").await.unwrap();

        assert!(written.is_absolute());
        assert_eq!(written, temp_dir.path().join("nested/cat.png"));
        assert_eq!(fs::read(&written).unwrap(), b"meow");
    }

    #[tokio::test]
    async fn test_parent_components_are_collapsed() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().join("work/./sub"));

        let written = storage.write_file("../out.png", b"png").await.unwrap();

        assert_eq!(written, temp_dir.path().join("work/out.png"));
        assert_eq!(fs::read(temp_dir.path().join("work/out.png")).unwrap(), b"png");
        assert_eq!(storage.root(), temp_dir.path().join("work/sub"));
    }

    #[cfg(unix)]
    #[test]
    fn test_normalize_stops_at_root() {
        assert_eq!(absolute_normalized(Path::new("/../a/./b/..")), PathBuf::from("/a"));
    }

    #[tokio::test]
    async fn test_absolute_path_bypasses_base() {
        let base = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        let target = elsewhere.path().join("dog.png");
        let storage = LocalStorage::new(base.path());

        let written = storage
            .write_file(target.to_str().unwrap(), b"woof")
            .await
            .unwrap();

        assert_eq!(written, target);
        assert!(!base.path().join("dog.png").exists());
    }
}
