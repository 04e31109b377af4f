//! Application layer errors.
//!
//! These errors represent failures in orchestration and I/O, not in
//! transformation logic. Configuration and invariant problems are
//! `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// Path does not exist.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Session store read/write failed.
    #[error("Session store error: {reason}")]
    StoreError { reason: String },

    /// A persisted session could not be decoded.
    #[error("Corrupt session log {path}: {reason}")]
    CorruptSession { path: PathBuf, reason: String },

    /// No session with this id was persisted.
    #[error("Session not found: {session_id}")]
    SessionNotFound { session_id: String },

    /// `log_file_transform`/`end_session` called before `start_session`.
    #[error("No session has been started")]
    SessionNotStarted,

    /// `start_session` called while a session is open.
    #[error("Session {session_id} is already active")]
    SessionAlreadyActive { session_id: String },

    /// Recorder mutex poisoned.
    #[error("Session recorder lock poisoned")]
    RecorderLockError,

    /// Token or mapping table could not be loaded.
    #[error("Invalid token table {path}: {reason}")]
    InvalidTokenTable { path: PathBuf, reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that the path exists and you have permissions".into(),
            ],
            Self::NotFound { path } => vec![
                format!("Nothing at: {}", path.display()),
                "Check the path for typos".into(),
            ],
            Self::StoreError { .. } => vec![
                "Check that the log directory is writable".into(),
                "Try: tokenmod config get pipeline.log_dir".into(),
            ],
            Self::CorruptSession { path, .. } => vec![
                format!("The session log {} could not be parsed", path.display()),
                "It may have been edited by hand or truncated".into(),
            ],
            Self::SessionNotFound { session_id } => vec![
                format!("No session log for '{}'", session_id),
                "Try: tokenmod sessions to list recorded sessions".into(),
            ],
            Self::SessionNotStarted | Self::SessionAlreadyActive { .. } => vec![
                "Session lifecycle misuse: start, log, then end exactly once".into(),
            ],
            Self::InvalidTokenTable { path, .. } => vec![
                format!("Fix the table at {}", path.display()),
                "Patterns use Rust regex syntax".into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } | Self::SessionNotFound { .. } => ErrorCategory::NotFound,
            Self::FilesystemError { .. } | Self::StoreError { .. } => ErrorCategory::Io,
            Self::CorruptSession { .. } => ErrorCategory::Validation,
            Self::InvalidTokenTable { .. } => ErrorCategory::Configuration,
            Self::SessionNotStarted
            | Self::SessionAlreadyActive { .. }
            | Self::RecorderLockError => ErrorCategory::Internal,
        }
    }
}
