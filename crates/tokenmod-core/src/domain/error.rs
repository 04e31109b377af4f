// ============================================================================
// domain/error.rs - CONFIGURATION AND INVARIANT ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// Domain errors are raised while *building* transforms and sessions, never
/// while executing a transform over source text. Expected no-op conditions
/// (no component, already transformed) are warnings, not errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Configuration Errors (fatal at construction)
    // ========================================================================
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("invalid file filter '{pattern}': {reason}")]
    InvalidFilter { pattern: String, reason: String },

    #[error("transform metadata is missing '{field}'")]
    MissingTransformMetadata { field: &'static str },

    #[error("transform '{transform}' has no mappings")]
    EmptyMappingSet { transform: String },

    #[error("duplicate phase id: {id}")]
    DuplicatePhase { id: String },

    #[error("phase '{id}' contains no transforms")]
    EmptyPhase { id: String },

    #[error("unknown phase: {id}")]
    UnknownPhase { id: String },

    #[error("unknown transform kind: {0}")]
    UnknownTransformKind(String),

    #[error("unknown component kind: {0}")]
    UnknownComponentKind(String),

    #[error("invalid token entry '{key}' for {kind}: {reason}")]
    InvalidTokenEntry {
        kind: String,
        key: String,
        reason: String,
    },

    // ========================================================================
    // Session Lifecycle Violations
    // ========================================================================
    #[error("session {session_id} is sealed and cannot be modified")]
    SessionSealed { session_id: String },

    #[error("session {session_id} has not been sealed")]
    SessionNotSealed { session_id: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidPattern { pattern, reason } => vec![
                format!("Pattern `{}` does not compile: {}", pattern, reason),
                "Patterns use Rust regex syntax (no look-around)".into(),
            ],
            Self::InvalidFilter { pattern, .. } => vec![
                format!("The --filter value `{}` is not a valid regex", pattern),
                "Example: --filter 'components/(Button|Card)'".into(),
            ],
            Self::MissingTransformMetadata { field } => vec![
                format!("Every transform needs a non-empty `{}`", field),
                "Check your token table for incomplete entries".into(),
            ],
            Self::UnknownPhase { id } => vec![
                format!("No phase named '{}'", id),
                "Try: tokenmod transforms to see available phases".into(),
            ],
            Self::UnknownComponentKind(kind) => vec![
                format!("'{}' is not a supported component kind", kind),
                "Supported kinds: Button, Card, Badge, Alert, Input, Modal, Avatar, Tag".into(),
            ],
            Self::SessionNotSealed { .. } => vec![
                "Only completed sessions can be reverted".into(),
                "Re-run the pipeline to completion, then revert".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SessionSealed { .. } | Self::SessionNotSealed { .. } => ErrorCategory::Invariant,
            _ => ErrorCategory::Configuration,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Invariant,
}
