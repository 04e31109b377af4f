//! Local filesystem adapter using std::fs and walkdir.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use tokenmod_core::{
    application::{ApplicationError, ports::FileSystem},
    error::{TokenmodError, TokenmodResult},
};

/// Directories never descended into.
const SKIPPED_DIRS: [&str; 4] = ["node_modules", "dist", "build", "coverage"];

/// Production filesystem implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFileSystem {
    fn list_dir(&self, dir: &Path) -> TokenmodResult<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(ApplicationError::NotFound {
                path: dir.to_path_buf(),
            }
            .into());
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_skipped(e));

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                TokenmodError::from(ApplicationError::FilesystemError {
                    path,
                    reason: format!("Failed to walk directory: {e}"),
                })
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        debug!(dir = %dir.display(), files = files.len(), "Directory listed");
        Ok(files)
    }

    fn read_file(&self, path: &Path) -> TokenmodResult<String> {
        std::fs::read_to_string(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn write_file(&self, path: &Path, content: &str) -> TokenmodResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| map_io_error(parent, e, "create directory"))?;
        }
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }
}

fn is_skipped(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref())
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> TokenmodError {
    if e.kind() == io::ErrorKind::NotFound {
        return ApplicationError::NotFound {
            path: path.to_path_buf(),
        }
        .into();
    }
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_sorted_files_and_skips_vendor_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("b")).unwrap();
        std::fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        std::fs::create_dir_all(root.join(".git")).unwrap();
        std::fs::write(root.join("b/Card.tsx"), "").unwrap();
        std::fs::write(root.join("a.tsx"), "").unwrap();
        std::fs::write(root.join("node_modules/pkg/index.js"), "").unwrap();
        std::fs::write(root.join(".git/HEAD"), "").unwrap();

        let files = LocalFileSystem::new().list_dir(root).unwrap();
        assert_eq!(files, vec![root.join("a.tsx"), root.join("b/Card.tsx")]);
    }

    #[test]
    fn missing_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalFileSystem::new()
            .list_dir(&dir.path().join("nope"))
            .unwrap_err();
        assert!(matches!(
            err,
            TokenmodError::Application(ApplicationError::NotFound { .. })
        ));
    }

    #[test]
    fn write_creates_parents_and_round_trips_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deep/file.tsx");
        let fs = LocalFileSystem::new();
        fs.write_file(&path, "a\r\n  \n").unwrap();
        assert_eq!(fs.read_file(&path).unwrap(), "a\r\n  \n");
    }
}
