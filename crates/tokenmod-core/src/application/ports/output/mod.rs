//! Driven (output) ports - implemented by infrastructure.
//!
//! The `tokenmod-adapters` crate provides implementations.

use std::path::{Path, PathBuf};

use crate::domain::{RevertPlan, TransformSession};
use crate::error::TokenmodResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `tokenmod_adapters::filesystem::LocalFileSystem` (production)
/// - `tokenmod_adapters::filesystem::MemoryFileSystem` (testing)
///
/// Every operation reports failure through its result; none may panic.
#[cfg_attr(test, mockall::automock)]
pub trait FileSystem: Send + Sync {
    /// Files under `dir`, recursively, in a stable order.
    fn list_dir(&self, dir: &Path) -> TokenmodResult<Vec<PathBuf>>;

    /// Read a UTF-8 text file.
    fn read_file(&self, path: &Path) -> TokenmodResult<String>;

    /// Replace the content of a file, creating parents as needed.
    fn write_file(&self, path: &Path, content: &str) -> TokenmodResult<()>;
}

/// Port for session persistence.
///
/// Implemented by:
/// - `tokenmod_adapters::session_store::FileSessionStore` (log directory)
/// - `tokenmod_adapters::session_store::MemorySessionStore` (testing)
pub trait SessionStore: Send + Sync {
    /// Persist the JSON ledger and the Markdown summary. Returns the JSON path.
    fn save_session(&self, session: &TransformSession) -> TokenmodResult<PathBuf>;

    fn load_session(&self, session_id: &str) -> TokenmodResult<TransformSession>;

    /// Session ids, newest first.
    fn list_sessions(&self) -> TokenmodResult<Vec<String>>;

    /// Write `revert-<id>.sh`. Returns its path.
    fn save_revert_script(&self, plan: &RevertPlan) -> TokenmodResult<PathBuf>;
}
