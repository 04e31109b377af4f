//! The transform contract.
//!
//! Every transform is a pure function from source text to a
//! [`TransformResult`]. It never touches the filesystem, keeps no state
//! between calls, and reports expected no-op conditions as warnings.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    entities::change::TransformResult, error::DomainError, value_objects::TransformKind,
};

/// Immutable description of a transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformMeta {
    pub name: String,
    pub description: String,
    pub category: String,
    pub kind: TransformKind,
}

impl TransformMeta {
    /// Build metadata, rejecting empty fields.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        kind: TransformKind,
    ) -> Result<Self, DomainError> {
        let meta = Self {
            name: name.into(),
            description: description.into(),
            category: category.into(),
            kind,
        };
        meta.validate()?;
        Ok(meta)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::MissingTransformMetadata { field: "name" });
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::MissingTransformMetadata {
                field: "description",
            });
        }
        if self.category.trim().is_empty() {
            return Err(DomainError::MissingTransformMetadata { field: "category" });
        }
        Ok(())
    }
}

impl fmt::Display for TransformMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.kind)
    }
}

/// Unexpected failure while executing a transform.
///
/// Expected conditions never use this channel. The pipeline isolates these
/// failures: the next transform runs on the content from before the failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// The grammar could not be loaded into the parser.
    #[error("parser setup failed: {reason}")]
    Grammar { reason: String },

    /// Known, harmless parser diagnostics. Suppressed from user output.
    ///
    /// None of the built-in transforms raise this: syntax errors in the input
    /// are reported as warnings on an unchanged result instead. It exists for
    /// transforms that wrap a parser whose diagnostics are not worth showing.
    #[error("parser notice: {message}")]
    ParserNoise { message: String },

    /// Anything else.
    #[error("transform failed: {reason}")]
    Failed { reason: String },
}

impl TransformError {
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::ParserNoise { .. })
    }
}

/// A pure source-to-source transform.
pub trait Transform: Send + Sync {
    fn meta(&self) -> &TransformMeta;

    /// Run over `content`. Must be deterministic for a given input.
    fn execute(&self, content: &str) -> Result<TransformResult, TransformError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_rejects_blank_fields() {
        assert_eq!(
            TransformMeta::new("", "d", "c", TransformKind::Regex),
            Err(DomainError::MissingTransformMetadata { field: "name" })
        );
        assert_eq!(
            TransformMeta::new("n", "  ", "c", TransformKind::Regex),
            Err(DomainError::MissingTransformMetadata {
                field: "description"
            })
        );
        assert!(TransformMeta::new("n", "d", "colors", TransformKind::Ast).is_ok());
    }

    #[test]
    fn only_parser_noise_is_benign() {
        assert!(TransformError::ParserNoise { message: "x".into() }.is_benign());
        assert!(!TransformError::Failed { reason: "x".into() }.is_benign());
        assert!(!TransformError::Grammar { reason: "x".into() }.is_benign());
    }
}
