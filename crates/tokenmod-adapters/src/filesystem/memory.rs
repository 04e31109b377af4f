//! In-memory filesystem adapter for testing.
//!
//! Supports failure injection per path so partial-failure behaviour can be
//! exercised without touching the disk.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use tokenmod_core::{
    application::{ApplicationError, ports::FileSystem},
    error::{TokenmodError, TokenmodResult},
};

/// In-memory filesystem. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    files: BTreeMap<PathBuf, String>,
    unreadable: BTreeSet<PathBuf>,
    unwritable: BTreeSet<PathBuf>,
    unlistable: BTreeSet<PathBuf>,
    writes: Vec<PathBuf>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style file insertion.
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.files.insert(path.into(), content.into());
        }
    }

    /// Make reads of `path` fail.
    pub fn fail_read(&self, path: impl Into<PathBuf>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.unreadable.insert(path.into());
        }
    }

    /// Make writes to `path` fail.
    pub fn fail_write(&self, path: impl Into<PathBuf>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.unwritable.insert(path.into());
        }
    }

    /// Make listing `dir` fail.
    pub fn fail_list(&self, dir: impl Into<PathBuf>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.unlistable.insert(dir.into());
        }
    }

    /// Current content of a file (testing helper).
    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.inner.read().ok()?.files.get(path.as_ref()).cloned()
    }

    /// Paths written so far, in call order.
    pub fn writes(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.writes.clone())
            .unwrap_or_default()
    }

    fn read(&self) -> TokenmodResult<RwLockReadGuard<'_, Inner>> {
        self.inner.read().map_err(|_| poisoned())
    }

    fn write(&self) -> TokenmodResult<RwLockWriteGuard<'_, Inner>> {
        self.inner.write().map_err(|_| poisoned())
    }
}

fn poisoned() -> TokenmodError {
    TokenmodError::Internal {
        message: "memory filesystem lock poisoned".into(),
    }
}

impl FileSystem for MemoryFileSystem {
    fn list_dir(&self, dir: &Path) -> TokenmodResult<Vec<PathBuf>> {
        let inner = self.read()?;
        if inner.unlistable.contains(dir) {
            return Err(ApplicationError::FilesystemError {
                path: dir.to_path_buf(),
                reason: "Permission denied".into(),
            }
            .into());
        }

        let all = dir.as_os_str().is_empty() || dir == Path::new(".");
        let files: Vec<PathBuf> = inner
            .files
            .keys()
            .filter(|p| all || p.starts_with(dir))
            .cloned()
            .collect();

        if files.is_empty() && !all {
            return Err(ApplicationError::NotFound {
                path: dir.to_path_buf(),
            }
            .into());
        }
        Ok(files)
    }

    fn read_file(&self, path: &Path) -> TokenmodResult<String> {
        let inner = self.read()?;
        if inner.unreadable.contains(path) {
            return Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "Permission denied".into(),
            }
            .into());
        }
        inner.files.get(path).cloned().ok_or_else(|| {
            ApplicationError::NotFound {
                path: path.to_path_buf(),
            }
            .into()
        })
    }

    fn write_file(&self, path: &Path, content: &str) -> TokenmodResult<()> {
        let mut inner = self.write()?;
        if inner.unwritable.contains(path) {
            return Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "Read-only file".into(),
            }
            .into());
        }
        inner.files.insert(path.to_path_buf(), content.to_string());
        inner.writes.push(path.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_only_files_under_the_directory() {
        let fs = MemoryFileSystem::new()
            .with_file("src/b.tsx", "")
            .with_file("src/a.tsx", "")
            .with_file("other/c.tsx", "");
        assert_eq!(
            fs.list_dir(Path::new("src")).unwrap(),
            vec![PathBuf::from("src/a.tsx"), PathBuf::from("src/b.tsx")]
        );
        assert_eq!(fs.list_dir(Path::new(".")).unwrap().len(), 3);
        assert!(fs.list_dir(Path::new("missing")).is_err());
    }

    #[test]
    fn injected_failures() {
        let fs = MemoryFileSystem::new().with_file("a.tsx", "x");
        fs.fail_read("a.tsx");
        fs.fail_write("a.tsx");
        assert!(fs.read_file(Path::new("a.tsx")).is_err());
        assert!(fs.write_file(Path::new("a.tsx"), "y").is_err());
        assert!(fs.writes().is_empty());
        assert_eq!(fs.get("a.tsx").as_deref(), Some("x"));
    }

    #[test]
    fn clones_share_contents() {
        let fs = MemoryFileSystem::new();
        let view = fs.clone();
        fs.write_file(Path::new("a.tsx"), "y").unwrap();
        assert_eq!(view.get("a.tsx").as_deref(), Some("y"));
        assert_eq!(view.writes(), vec![PathBuf::from("a.tsx")]);
    }
}
