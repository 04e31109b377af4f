//! Change descriptions and transform results.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::ChangeKind;

/// One localized edit, described for humans and logs.
///
/// A `Change` is not an executable patch: replaying `from → to` is not
/// guaranteed to reproduce the transform output. Undo goes through the
/// session ledger instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    pub from: String,
    pub to: String,
    /// 1-based line of the edit in the text the transform received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// 1-based column (in characters).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    pub kind: ChangeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Change {
    pub fn new(from: impl Into<String>, to: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            line: None,
            column: None,
            kind,
            context: None,
        }
    }

    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Position from a byte offset into `source`.
    pub fn at_offset(self, source: &str, offset: usize) -> Self {
        let (line, column) = line_column(source, offset);
        self.at(line, column)
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Outcome of running one transform over one text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResult {
    pub content: String,
    pub has_changes: bool,
    pub changes: Vec<Change>,
    pub warnings: Vec<String>,
}

impl TransformResult {
    /// The input handed back untouched.
    pub fn unchanged(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            has_changes: false,
            changes: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn changed(content: impl Into<String>, changes: Vec<Change>) -> Self {
        Self {
            content: content.into(),
            has_changes: true,
            changes,
            warnings: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

/// 1-based (line, column) for a byte offset. Columns count characters.
pub fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source[..floor_char_boundary(source, offset)];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransformKind;

    #[test]
    fn line_column_is_one_based() {
        let src = "ab\ncd\nef";
        assert_eq!(line_column(src, 0), (1, 1));
        assert_eq!(line_column(src, 4), (2, 2));
        assert_eq!(line_column(src, src.len()), (3, 3));
    }

    #[test]
    fn line_column_counts_characters_not_bytes() {
        let src = "é = 1";
        assert_eq!(line_column(src, "é ".len()), (1, 3));
    }

    #[test]
    fn unchanged_has_no_changes() {
        let result = TransformResult::unchanged("x").with_warning("no supported component found");
        assert!(!result.has_changes);
        assert_eq!(result.content, "x");
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn change_serializes_without_empty_optionals() {
        let change = Change::new("bg-white", "bg-surface", TransformKind::Regex);
        let json = serde_json::to_string(&change).unwrap();
        assert!(!json.contains("line"));
        assert!(json.contains("\"kind\":\"regex\""));
    }
}
