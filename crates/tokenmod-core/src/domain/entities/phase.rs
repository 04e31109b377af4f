//! Pipeline ordering metadata and run options.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::domain::{error::DomainError, transform::Transform, value_objects::TransformKind};

/// Declarative ordering metadata for a group of transforms.
///
/// `parallel` is a hint only. Transforms inside a phase still run one after
/// another because content is threaded as a single value per file, and
/// nothing guarantees that a phase's transforms commute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelinePhase {
    pub id: String,
    pub kind: TransformKind,
    #[serde(default)]
    pub parallel: bool,
    #[serde(default)]
    pub optional: bool,
    /// Runs only when selected by id.
    #[serde(default)]
    pub explicit: bool,
}

impl PipelinePhase {
    pub fn new(id: impl Into<String>, kind: TransformKind) -> Self {
        Self {
            id: id.into(),
            kind,
            parallel: false,
            optional: false,
            explicit: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn parallel(mut self) -> Self {
        self.parallel = true;
        self
    }

    pub fn explicit(mut self) -> Self {
        self.explicit = true;
        self
    }

    /// Whether this phase takes part in a run selecting `selected` ids
    /// (empty selection means the default set).
    pub fn is_selected(&self, selected: &[String], skip_optional: bool) -> bool {
        let chosen = if selected.is_empty() {
            !self.explicit
        } else {
            selected.contains(&self.id)
        };
        chosen && !(skip_optional && self.optional)
    }
}

/// A phase together with its ordered transforms.
#[derive(Clone)]
pub struct PhasePlan {
    pub phase: PipelinePhase,
    pub transforms: Vec<Arc<dyn Transform>>,
}

impl PhasePlan {
    pub fn new(
        phase: PipelinePhase,
        transforms: Vec<Arc<dyn Transform>>,
    ) -> Result<Self, DomainError> {
        if transforms.is_empty() {
            return Err(DomainError::EmptyPhase { id: phase.id });
        }
        Ok(Self { phase, transforms })
    }

    pub fn single(phase: PipelinePhase, transform: impl Transform + 'static) -> Self {
        Self {
            phase,
            transforms: vec![Arc::new(transform)],
        }
    }
}

impl fmt::Debug for PhasePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhasePlan")
            .field("phase", &self.phase)
            .field(
                "transforms",
                &self
                    .transforms
                    .iter()
                    .map(|t| t.meta().name.as_str())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Options for one pipeline run. Recorded verbatim in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PipelineOptions {
    pub verbose: bool,
    pub dry_run: bool,
    /// Regex matched against each file path; non-matching files are skipped.
    pub filter: Option<String>,
    /// Eligible file extensions, without the dot.
    pub extensions: Vec<String>,
    pub skip_optional: bool,
    /// Restrict the run to these phase ids. Empty means all phases.
    pub phases: Vec<String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            dry_run: false,
            filter: None,
            extensions: default_extensions(),
            skip_optional: false,
            phases: Vec::new(),
        }
    }
}

pub fn default_extensions() -> Vec<String> {
    ["tsx", "ts", "jsx", "js"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_phase_is_rejected() {
        let err = PhasePlan::new(PipelinePhase::new("colors", TransformKind::Regex), vec![])
            .unwrap_err();
        assert_eq!(err, DomainError::EmptyPhase { id: "colors".into() });
    }

    #[test]
    fn explicit_phases_run_only_when_named() {
        let phase = PipelinePhase::new("template-format", TransformKind::Regex)
            .optional()
            .explicit();
        assert!(!phase.is_selected(&[], false));
        assert!(phase.is_selected(&["template-format".into()], false));
        assert!(!phase.is_selected(&["template-format".into()], true));

        let default = PipelinePhase::new("color-classes", TransformKind::Regex);
        assert!(default.is_selected(&[], true));
        assert!(!default.is_selected(&["other".into()], false));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let opts: PipelineOptions = serde_json::from_str(r#"{"dryRun": true}"#).unwrap();
        assert!(opts.dry_run);
        assert_eq!(opts.extensions, default_extensions());
        assert!(opts.phases.is_empty());
    }
}
