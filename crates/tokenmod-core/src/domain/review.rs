//! Manual-review reporting.
//!
//! Some constructs cannot be rewritten safely by pattern or tree edits. This
//! transform points them out as warnings and never changes content.

use regex::Regex;

use crate::domain::{
    entities::change::{TransformResult, line_column},
    error::DomainError,
    transform::{Transform, TransformError, TransformMeta},
    value_objects::TransformKind,
};

const INLINE_STYLE: &str = r"style=\{\{[^}]*\}\}";
const HEX_COLOR: &str = r"#(?:[0-9a-fA-F]{8}|[0-9a-fA-F]{6}|[0-9a-fA-F]{3,4})\b";

#[derive(Debug, Clone)]
pub struct ManualReviewTransform {
    meta: TransformMeta,
    inline_style: Regex,
    hex_color: Regex,
}

impl ManualReviewTransform {
    pub fn new() -> Result<Self, DomainError> {
        Ok(Self {
            meta: TransformMeta::new(
                "manual-review",
                "Flag inline hex colors that need a manual token choice",
                "review",
                TransformKind::Manual,
            )?,
            inline_style: compile(INLINE_STYLE)?,
            hex_color: compile(HEX_COLOR)?,
        })
    }
}

fn compile(pattern: &str) -> Result<Regex, DomainError> {
    Regex::new(pattern).map_err(|e| DomainError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

impl Transform for ManualReviewTransform {
    fn meta(&self) -> &TransformMeta {
        &self.meta
    }

    fn execute(&self, content: &str) -> Result<TransformResult, TransformError> {
        let mut result = TransformResult::unchanged(content);
        for style in self.inline_style.find_iter(content) {
            for hex in self.hex_color.find_iter(style.as_str()) {
                let (line, column) = line_column(content, style.start() + hex.start());
                result = result.with_warning(format!(
                    "line {line}:{column}: inline color {} needs a design token",
                    hex.as_str()
                ));
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_inline_hex_colors_without_editing() {
        let src = "<div\n  style={{ color: '#fff', background: \"#1e293b\" }}\n/>";
        let out = ManualReviewTransform::new().unwrap().execute(src).unwrap();
        assert!(!out.has_changes);
        assert_eq!(out.content, src);
        assert_eq!(out.warnings.len(), 2);
        assert!(out.warnings[0].starts_with("line 2:"));
        assert!(out.warnings[1].contains("#1e293b"));
    }

    #[test]
    fn hex_outside_inline_styles_is_ignored() {
        let src = "const colors = { red: '#ef4444' };";
        let out = ManualReviewTransform::new().unwrap().execute(src).unwrap();
        assert!(out.warnings.is_empty());
    }
}
