//! The standard transform catalog.
//!
//! Phases run in this order:
//!
//! | id                | kind   | flags              |
//! |-------------------|--------|--------------------|
//! | `template-format` | regex  | optional, explicit |
//! | `color-classes`   | regex  |                    |
//! | `token-injection` | ast    |                    |
//! | `manual-review`   | manual | optional, parallel |
//!
//! Color classes are rewritten before injection so the injector sees the
//! final class names; review runs last and never edits.

use serde::Serialize;

use tokenmod_core::{
    domain::{
        DomainError, ManualReviewTransform, PhasePlan, PipelinePhase, RegexTransform, SpanGuard,
        TokenInjector, TransformKind, TransformMeta,
    },
    error::TokenmodResult,
};

use crate::builtin_tokens::{TEMPLATE_LINE_LIMIT, TokenTables, template_mappings};

pub const TEMPLATE_FORMAT: &str = "template-format";
pub const COLOR_CLASSES: &str = "color-classes";
pub const TOKEN_INJECTION: &str = "token-injection";
pub const MANUAL_REVIEW: &str = "manual-review";

/// Display row for `tokenmod transforms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformInfo {
    pub phase: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub kind: TransformKind,
    pub optional: bool,
    pub explicit: bool,
}

pub struct TransformCatalog {
    tables: TokenTables,
}

impl TransformCatalog {
    pub fn new(tables: TokenTables) -> Self {
        Self { tables }
    }

    pub fn builtin() -> TokenmodResult<Self> {
        Ok(Self::new(TokenTables::builtin()?))
    }

    pub fn tables(&self) -> &TokenTables {
        &self.tables
    }

    /// Build the ordered phases. Any configuration problem fails here.
    pub fn standard_phases(&self) -> TokenmodResult<Vec<PhasePlan>> {
        Ok(vec![
            self.template_format()?,
            self.color_classes()?,
            self.token_injection()?,
            PhasePlan::single(
                PipelinePhase::new(MANUAL_REVIEW, TransformKind::Manual)
                    .optional()
                    .parallel(),
                ManualReviewTransform::new()?,
            ),
        ])
    }

    pub fn describe(&self) -> TokenmodResult<Vec<TransformInfo>> {
        Ok(self
            .standard_phases()?
            .iter()
            .flat_map(|plan| {
                plan.transforms.iter().map(move |t| {
                    let meta = t.meta();
                    TransformInfo {
                        phase: plan.phase.id.clone(),
                        name: meta.name.clone(),
                        description: meta.description.clone(),
                        category: meta.category.clone(),
                        kind: meta.kind,
                        optional: plan.phase.optional,
                        explicit: plan.phase.explicit,
                    }
                })
            })
            .collect())
    }

    fn template_format(&self) -> Result<PhasePlan, DomainError> {
        let meta = TransformMeta::new(
            "format-templates",
            "Insert line breaks into collapsed one-line templates",
            "formatting",
            TransformKind::Regex,
        )?;
        let transform =
            RegexTransform::new(meta, template_mappings()?)?.skip_when_lines_exceed(TEMPLATE_LINE_LIMIT);
        Ok(PhasePlan::single(
            PipelinePhase::new(TEMPLATE_FORMAT, TransformKind::Regex)
                .optional()
                .explicit(),
            transform,
        ))
    }

    fn color_classes(&self) -> Result<PhasePlan, DomainError> {
        let meta = TransformMeta::new(
            "color-classes",
            "Rewrite raw color utility classes to semantic tokens",
            "colors",
            TransformKind::Regex,
        )?;
        let transform = RegexTransform::new(meta, self.tables.color_mappings.clone())?
            .protected(SpanGuard::new(self.tables.guarded.iter().cloned()));
        Ok(PhasePlan::single(
            PipelinePhase::new(COLOR_CLASSES, TransformKind::Regex),
            transform,
        ))
    }

    fn token_injection(&self) -> Result<PhasePlan, DomainError> {
        let meta = TransformMeta::new(
            "inject-tokens",
            "Append derived design tokens to component color objects",
            "tokens",
            TransformKind::Ast,
        )?;
        let transform = TokenInjector::new(meta, self.tables.injection.clone())?
            .with_targets(self.tables.targets.iter().cloned());
        Ok(PhasePlan::single(
            PipelinePhase::new(TOKEN_INJECTION, TransformKind::Ast),
            transform,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_are_in_documented_order() {
        let phases = TransformCatalog::builtin().unwrap().standard_phases().unwrap();
        let ids: Vec<_> = phases.iter().map(|p| p.phase.id.as_str()).collect();
        assert_eq!(ids, vec![TEMPLATE_FORMAT, COLOR_CLASSES, TOKEN_INJECTION, MANUAL_REVIEW]);
        assert!(phases[0].phase.explicit);
        assert!(phases[3].phase.optional);
    }

    #[test]
    fn describe_lists_every_transform() {
        let infos = TransformCatalog::builtin().unwrap().describe().unwrap();
        assert_eq!(infos.len(), 4);
        assert_eq!(infos[2].kind, TransformKind::Ast);
        assert_eq!(infos[2].name, "inject-tokens");
    }
}
