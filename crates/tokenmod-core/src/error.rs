//! Crate-wide error type.
//!
//! Domain errors are raised while building transforms and phases or when a
//! session invariant is violated. Application errors come from the ports.
//! Both flatten into [`TokenmodError`], which callers match on through
//! [`ErrorCategory`].

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::{self, DomainError};

#[derive(Debug, Error, Clone)]
pub enum TokenmodError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// A failure that should not be reachable with valid inputs.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl TokenmodError {
    /// Hints for the user, most specific first.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Internal { .. } => vec![
                "Re-run with -vv and include the log when reporting the problem".into(),
                "Report it at https://github.com/cosecruz/tokenmod/issues".into(),
            ],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => e.category().into(),
            Self::Application(e) => e.category(),
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Coarse classification used by front ends to pick styling and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Persisted data could not be understood.
    Validation,
    NotFound,
    /// Bad transform, phase or token-table setup. Fatal before any file is touched.
    Configuration,
    Io,
    Internal,
}

impl From<domain::ErrorCategory> for ErrorCategory {
    fn from(category: domain::ErrorCategory) -> Self {
        match category {
            domain::ErrorCategory::Configuration => Self::Configuration,
            // A broken session invariant means the ledger was misused.
            domain::ErrorCategory::Invariant => Self::Internal,
        }
    }
}

pub type TokenmodResult<T> = Result<T, TokenmodError>;

/// Turn a foreign error into [`TokenmodError::Internal`] with a message.
pub trait Context<T> {
    fn context(self, msg: impl Into<String>) -> TokenmodResult<T>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: impl Into<String>) -> TokenmodResult<T> {
        self.map_err(|e| TokenmodError::Internal {
            message: format!("{}: {e}", msg.into()),
        })
    }
}
