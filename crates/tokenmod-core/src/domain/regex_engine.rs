//! Protected, ordered regex substitution.
//!
//! Mappings run one after another over the whole text. A later mapping sees
//! the output of every earlier one, so the order of a mapping list is part of
//! its meaning: reordering it can change the result.
//!
//! With protection enabled, guarded spans (see [`SpanGuard`]) are rescanned
//! before every mapping and any match overlapping one is left as-is.

use std::fmt;

use regex::Regex;
use tracing::trace;

use crate::domain::{
    entities::change::{Change, TransformResult},
    error::DomainError,
    guard::SpanGuard,
    transform::{Transform, TransformError, TransformMeta},
    value_objects::TransformKind,
};

// ── RegexMapping ─────────────────────────────────────────────────────────────

/// One `pattern → replacement` rule.
#[derive(Clone)]
pub struct RegexMapping {
    pattern: Regex,
    replacement: String,
    description: String,
}

impl RegexMapping {
    /// Compile a mapping. An invalid pattern is a configuration error.
    ///
    /// The replacement accepts `$1`, `${1}`, `$name` and `$&` (whole match).
    /// `$1px` means group 1 followed by `px`.
    pub fn new(
        pattern: &str,
        replacement: &str,
        description: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let compiled = Regex::new(pattern).map_err(|e| DomainError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            pattern: compiled,
            replacement: normalize_replacement(replacement),
            description: description.into(),
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for RegexMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegexMapping")
            .field("pattern", &self.pattern.as_str())
            .field("replacement", &self.replacement)
            .field("description", &self.description)
            .finish()
    }
}

/// Rewrite numbered references so digits never run into following text.
fn normalize_replacement(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len() + 4);
    let mut chars = replacement.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('$') => {
                chars.next();
                out.push_str("$$");
            }
            Some('&') => {
                chars.next();
                out.push_str("${0}");
            }
            Some(d) if d.is_ascii_digit() => {
                let mut digits = String::new();
                while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                    digits.push(d);
                    chars.next();
                }
                out.push_str("${");
                out.push_str(&digits);
                out.push('}');
            }
            _ => out.push('$'),
        }
    }

    out
}

// ── ProtectedRegexEngine ─────────────────────────────────────────────────────

/// Applies an ordered mapping list, optionally skipping guarded spans.
#[derive(Debug, Clone)]
pub struct ProtectedRegexEngine {
    mappings: Vec<RegexMapping>,
    guard: Option<SpanGuard>,
}

impl ProtectedRegexEngine {
    pub fn new(mappings: Vec<RegexMapping>) -> Self {
        Self {
            mappings,
            guard: None,
        }
    }

    pub fn with_protection(mut self, guard: SpanGuard) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn mappings(&self) -> &[RegexMapping] {
        &self.mappings
    }

    pub fn is_protected(&self) -> bool {
        self.guard.is_some()
    }

    /// Run every mapping in order. Returns the new text and one change per
    /// accepted substitution.
    pub fn apply(&self, content: &str) -> (String, Vec<Change>) {
        let mut text = content.to_string();
        let mut changes = Vec::new();

        for mapping in &self.mappings {
            let guarded = self
                .guard
                .as_ref()
                .map(|g| g.scan(&text))
                .unwrap_or_default();

            let mut out = String::with_capacity(text.len());
            let mut last = 0;
            let mut skipped = 0usize;

            for caps in mapping.pattern.captures_iter(&text) {
                let Some(m) = caps.get(0) else { continue };
                if SpanGuard::overlaps(&guarded, &m.range()) {
                    skipped += 1;
                    continue;
                }

                out.push_str(&text[last..m.start()]);
                let before = out.len();
                caps.expand(&mapping.replacement, &mut out);
                let replaced = &out[before..];
                if replaced != m.as_str() {
                    changes.push(
                        Change::new(m.as_str(), replaced, TransformKind::Regex)
                            .at_offset(&text, m.start())
                            .with_context(mapping.description.clone()),
                    );
                }
                last = m.end();
            }

            if skipped > 0 {
                trace!(
                    pattern = mapping.pattern.as_str(),
                    skipped, "matches inside guarded spans left untouched"
                );
            }

            out.push_str(&text[last..]);
            text = out;
        }

        (text, changes)
    }
}

// ── RegexTransform ───────────────────────────────────────────────────────────

/// A [`Transform`] backed by a [`ProtectedRegexEngine`].
#[derive(Debug, Clone)]
pub struct RegexTransform {
    meta: TransformMeta,
    engine: ProtectedRegexEngine,
    max_lines: Option<usize>,
}

impl RegexTransform {
    pub fn new(meta: TransformMeta, mappings: Vec<RegexMapping>) -> Result<Self, DomainError> {
        meta.validate()?;
        if mappings.is_empty() {
            return Err(DomainError::EmptyMappingSet {
                transform: meta.name,
            });
        }
        Ok(Self {
            meta,
            engine: ProtectedRegexEngine::new(mappings),
            max_lines: None,
        })
    }

    /// Leave guarded spans untouched.
    pub fn protected(mut self, guard: SpanGuard) -> Self {
        self.engine = self.engine.with_protection(guard);
        self
    }

    /// Skip sources with more than `lines` lines (already formatted).
    pub fn skip_when_lines_exceed(mut self, lines: usize) -> Self {
        self.max_lines = Some(lines);
        self
    }

    pub fn engine(&self) -> &ProtectedRegexEngine {
        &self.engine
    }
}

impl Transform for RegexTransform {
    fn meta(&self) -> &TransformMeta {
        &self.meta
    }

    fn execute(&self, content: &str) -> Result<TransformResult, TransformError> {
        if let Some(max) = self.max_lines {
            let lines = content.split('\n').count();
            if lines > max {
                return Ok(TransformResult::unchanged(content)
                    .with_warning(format!("skipped: already formatted ({lines} lines)")));
            }
        }

        let (output, changes) = self.engine.apply(content);
        if output == content {
            return Ok(TransformResult::unchanged(content));
        }
        Ok(TransformResult::changed(output, changes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(p: &str, r: &str) -> RegexMapping {
        RegexMapping::new(p, r, format!("{p} -> {r}")).unwrap()
    }

    fn transform(mappings: Vec<RegexMapping>) -> RegexTransform {
        let meta = TransformMeta::new("t", "test", "colors", TransformKind::Regex).unwrap();
        RegexTransform::new(meta, mappings).unwrap()
    }

    #[test]
    fn invalid_pattern_fails_at_construction() {
        let err = RegexMapping::new("bg-(", "x", "broken").unwrap_err();
        assert!(matches!(err, DomainError::InvalidPattern { .. }));
    }

    #[test]
    fn empty_mapping_list_is_rejected() {
        let meta = TransformMeta::new("t", "test", "colors", TransformKind::Regex).unwrap();
        assert!(matches!(
            RegexTransform::new(meta, vec![]),
            Err(DomainError::EmptyMappingSet { .. })
        ));
    }

    #[test]
    fn normalizes_numbered_references() {
        assert_eq!(normalize_replacement("$1px"), "${1}px");
        assert_eq!(normalize_replacement("$&!"), "${0}!");
        assert_eq!(normalize_replacement("$$1"), "$$1");
        assert_eq!(normalize_replacement("${name}"), "${name}");
    }

    #[test]
    fn backreferences_expand() {
        let t = transform(vec![mapping(r"text-(\w+)-500", "text-$1-600")]);
        let out = t.execute("<p className=\"text-red-500\" />").unwrap();
        assert_eq!(out.content, "<p className=\"text-red-600\" />");
        assert_eq!(out.changes.len(), 1);
        assert_eq!(out.changes[0].line, Some(1));
    }

    #[test]
    fn mappings_apply_sequentially_not_confluently() {
        let forward = transform(vec![mapping("a", "b"), mapping("b", "c")]);
        let reversed = transform(vec![mapping("b", "c"), mapping("a", "b")]);
        assert_eq!(forward.execute("a").unwrap().content, "c");
        assert_eq!(reversed.execute("a").unwrap().content, "b");
    }

    #[test]
    fn guarded_span_is_left_byte_identical() {
        let src = "const colors = {\n  white: 'bg-white',\n};\n\nexport const Card = () => <div className=\"bg-white\" />;\n";
        let t = transform(vec![mapping(r"\bbg-white\b", "bg-surface")])
            .protected(SpanGuard::new(["colors"]));
        let out = t.execute(src).unwrap();

        assert!(out.has_changes);
        assert!(out.content.starts_with("const colors = {\n  white: 'bg-white',\n};"));
        assert!(out.content.contains("className=\"bg-surface\""));
        assert_eq!(out.changes.len(), 1);
        assert_eq!(out.changes[0].line, Some(5));
    }

    #[test]
    fn jsx_text_and_regex_literals_do_not_defeat_protection() {
        let t = transform(vec![mapping(r"\bbg-white\b", "bg-surface")])
            .protected(SpanGuard::new(["colors"]));
        let sources = [
            "export const A = () => <p>Don't</p>; const colors = { white: 'bg-white' };\nexport const B = () => <b className=\"bg-white\" />;\n",
            "const re = /`/;\nconst colors = { white: 'bg-white' };\nexport const B = () => <b className=\"bg-white\" />;\n",
        ];

        for src in sources {
            let out = t.execute(src).unwrap();
            assert!(out.content.contains("const colors = { white: 'bg-white' }"), "{src}");
            assert!(out.content.contains("className=\"bg-surface\""), "{src}");
            assert_eq!(out.changes.len(), 1);
        }
    }

    #[test]
    fn changes_are_counted_per_mapping() {
        let t = transform(vec![
            mapping(r"\bbg-white\b", "bg-surface"),
            mapping(r"\btext-black\b", "text-fg"),
        ]);
        let out = t
            .execute("bg-white text-black bg-white")
            .unwrap();
        let per = |needle: &str| {
            out.changes
                .iter()
                .filter(|c| c.context.as_deref().is_some_and(|d| d.contains(needle)))
                .count()
        };
        assert_eq!(per("bg-white"), 2);
        assert_eq!(per("text-black"), 1);
    }

    #[test]
    fn identity_substitution_is_not_a_change() {
        let t = transform(vec![mapping("x", "x")]);
        let out = t.execute("xx").unwrap();
        assert!(!out.has_changes);
        assert!(out.changes.is_empty());
    }

    #[test]
    fn line_limit_skips_formatted_sources() {
        let t = transform(vec![mapping(";", ";\n")]).skip_when_lines_exceed(2);
        let out = t.execute("a;\nb;\nc;").unwrap();
        assert!(!out.has_changes);
        assert!(out.warnings[0].contains("already formatted"));
        assert!(t.execute("a;b;").unwrap().has_changes);
    }
}
