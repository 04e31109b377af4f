//! Error handling for the tokenmod CLI.
//!
//! Every failure the CLI can report is a [`CliError`]. Each carries
//! actionable suggestions and maps to a process exit code.

use std::error::Error;

use owo_colors::OwoColorize;
use thiserror::Error;

use tokenmod_core::{domain::DomainError, error::TokenmodError};

pub use tokenmod_core::error::ErrorCategory as CoreCategory;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input that clap could not catch.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An error propagated from `tokenmod-core` or an adapter.
    #[error(transparent)]
    Core(#[from] TokenmodError),

    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// The operation finished but some files failed.
    #[error("{operation} finished with {count} file error(s)")]
    PartialFailure { operation: &'static str, count: usize },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl CliError {
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidInput { message, .. } => vec![
                format!("Check your input: {}", message),
                "Use --help for usage information".into(),
            ],

            Self::ConfigError { message, .. } => vec![
                format!("Configuration issue: {}", message),
                "Show the effective configuration: tokenmod config list".into(),
                "Environment overrides use TOKENMOD_<SECTION>__<KEY>".into(),
            ],

            Self::Core(TokenmodError::Domain(DomainError::UnknownPhase { .. })) => vec![
                "List the available phases: tokenmod transforms".into(),
            ],

            Self::Core(core_err) => core_err.suggestions(),

            Self::IoError { message, .. } => vec![
                format!("I/O operation failed: {}", message),
                "Check file permissions".into(),
            ],

            Self::PartialFailure { .. } => vec![
                "The files listed above were not processed".into(),
                "Fix the reported problems and run the command again".into(),
            ],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } => ErrorCategory::UserError,
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::Core(TokenmodError::Domain(
                DomainError::InvalidFilter { .. } | DomainError::UnknownPhase { .. },
            )) => ErrorCategory::UserError,
            Self::Core(core) => match core.category() {
                CoreCategory::Validation => ErrorCategory::UserError,
                CoreCategory::NotFound => ErrorCategory::NotFound,
                CoreCategory::Configuration => ErrorCategory::Configuration,
                CoreCategory::Io | CoreCategory::Internal => ErrorCategory::Internal,
            },
            Self::IoError { .. } => ErrorCategory::Internal,
            Self::PartialFailure { .. } => ErrorCategory::PartialFailure,
        }
    }

    /// Exit code to pass to the OS.
    ///
    /// | Category        | Code |
    /// |-----------------|------|
    /// | Internal        |  1   |
    /// | User error      |  2   |
    /// | Not found       |  3   |
    /// | Configuration   |  4   |
    /// | Partial failure |  5   |
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::Internal => 1,
            ErrorCategory::UserError => 2,
            ErrorCategory::NotFound => 3,
            ErrorCategory::Configuration => 4,
            ErrorCategory::PartialFailure => 5,
        }
    }

    pub fn format_colored(&self, verbose: bool) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\n{} {}\n\n",
            "✗".red().bold(),
            "Error:".red().bold()
        ));
        output.push_str(&format!("  {}\n", self.to_string().red()));

        if verbose {
            let mut source = self.source();
            while let Some(err) = source {
                output.push_str(&format!(
                    "\n  {} {}\n",
                    "→".dimmed(),
                    err.to_string().dimmed()
                ));
                source = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str(&format!("\n{}\n", "Suggestions:".yellow().bold()));
            for suggestion in suggestions {
                output.push_str(&format!("  {}\n", suggestion));
            }
        }

        if !verbose {
            output.push('\n');
            output.push_str(&format!(
                "{} {}\n",
                "\u{2139}".blue(),
                "Use -v / --verbose for more details.".dimmed(),
            ));
        }

        output
    }

    /// [`Self::format_colored`] without ANSI codes.
    pub fn format_plain(&self, verbose: bool) -> String {
        let mut out = format!("\nError: {}\n", self);

        if verbose {
            let mut src = self.source();
            while let Some(err) = src {
                out.push_str(&format!("  Caused by: {err}\n"));
                src = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\nSuggestions:\n");
            for s in &suggestions {
                out.push_str(&format!("  {s}\n"));
            }
        }

        if !verbose {
            out.push_str("\nUse -v / --verbose for more details.\n");
        }

        out
    }

    pub fn log(&self) {
        match self.category() {
            ErrorCategory::UserError => tracing::warn!("User error: {}", self),
            ErrorCategory::NotFound => tracing::warn!("Not found: {}", self),
            ErrorCategory::PartialFailure => tracing::warn!("{}", self),
            ErrorCategory::Configuration => tracing::error!("Configuration error: {}", self),
            ErrorCategory::Internal => tracing::error!("Internal error: {}", self),
        }

        if let Some(source) = self.source() {
            tracing::debug!("Caused by: {}", source);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    UserError,
    NotFound,
    Configuration,
    Internal,
    /// Completed, but with per-file errors.
    PartialFailure,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use tokenmod_core::application::ApplicationError;

    #[test]
    fn unknown_phase_points_at_transforms() {
        let err = CliError::from(TokenmodError::from(DomainError::UnknownPhase {
            id: "nope".into(),
        }));
        assert_eq!(err.exit_code(), 2);
        assert!(
            err.suggestions()
                .iter()
                .any(|s| s.contains("tokenmod transforms"))
        );
    }

    #[test]
    fn exit_codes_follow_category() {
        let not_found = CliError::from(TokenmodError::from(ApplicationError::SessionNotFound {
            session_id: "x".into(),
        }));
        assert_eq!(not_found.exit_code(), 3);

        let config = CliError::ConfigError {
            message: "x".into(),
            source: None,
        };
        assert_eq!(config.exit_code(), 4);

        let io = CliError::IoError {
            message: "x".into(),
            source: io::Error::other("e"),
        };
        assert_eq!(io.exit_code(), 1);

        let partial = CliError::PartialFailure {
            operation: "run",
            count: 2,
        };
        assert_eq!(partial.exit_code(), 5);
        assert_eq!(partial.to_string(), "run finished with 2 file error(s)");
    }

    #[test]
    fn invalid_token_table_is_a_configuration_error() {
        let err = CliError::from(TokenmodError::from(ApplicationError::InvalidTokenTable {
            path: "tokens.toml".into(),
            reason: "bad".into(),
        }));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn format_plain_contains_header_and_suggestions() {
        let err = CliError::InvalidInput {
            message: "x".into(),
            source: None,
        };
        let s = err.format_plain(false);
        assert!(s.contains("Error: Invalid input: x"));
        assert!(s.contains("Suggestions:"));
        assert!(s.contains("--verbose"));
    }

    #[test]
    fn format_plain_verbose_shows_cause_and_omits_hint() {
        let err = CliError::IoError {
            message: "writing".into(),
            source: io::Error::other("disk full"),
        };
        let s = err.format_plain(true);
        assert!(s.contains("Caused by: disk full"));
        assert!(!s.contains("--verbose"));
    }
}
