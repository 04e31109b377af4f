//! Guarded span detection.
//!
//! A guarded span is a canonical data definition such as
//!
//! ```text
//! export const colors: Record<string, string> = { white: 'bg-white' }
//! ```
//!
//! where the bound identifier is reserved. Regex rewrites that would
//! otherwise match the lookup table's own entries must leave it alone.
//!
//! Spans come from the TSX syntax tree: every `variable_declarator` bound to
//! a reserved identifier whose value is an object literal, possibly wrapped
//! in `as const`, `satisfies T` or parentheses. When the source does not
//! parse cleanly, a bracket-matching byte scanner adds whatever it finds in
//! the broken regions.

use std::ops::Range;

use tracing::debug;
use tree_sitter::Node;

use crate::domain::injector::parse_tsx;

/// Finds guarded spans for a fixed set of reserved identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanGuard {
    reserved: Vec<String>,
}

impl SpanGuard {
    pub fn new<I, S>(reserved: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reserved: reserved.into_iter().map(Into::into).collect(),
        }
    }

    pub fn reserved(&self) -> &[String] {
        &self.reserved
    }

    /// Byte ranges of guarded declarations, in source order.
    ///
    /// Each range starts at the declaration keyword and ends after the
    /// closing brace of the object literal. Unterminated objects are not
    /// guarded.
    pub fn scan(&self, source: &str) -> Vec<Range<usize>> {
        if self.reserved.is_empty() {
            return Vec::new();
        }

        let mut spans = match parse_tsx(source) {
            Ok(tree) if !tree.root_node().has_error() => {
                return self.syntactic_spans(tree.root_node(), source);
            }
            Ok(tree) => self.syntactic_spans(tree.root_node(), source),
            Err(e) => {
                debug!(error = %e, "guard falling back to the byte scanner");
                Vec::new()
            }
        };
        spans.extend(self.lexical_spans(source));
        spans.sort_by_key(|s| (s.start, s.end));
        spans.dedup();
        spans
    }

    /// Whether `range` overlaps any of `spans`.
    pub fn overlaps(spans: &[Range<usize>], range: &Range<usize>) -> bool {
        spans
            .iter()
            .any(|s| range.start < s.end && s.start < range.end)
    }

    fn is_reserved(&self, name: &str) -> bool {
        self.reserved.iter().any(|r| r == name)
    }

    fn syntactic_spans(&self, root: Node<'_>, source: &str) -> Vec<Range<usize>> {
        let mut spans = Vec::new();
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            if matches!(node.kind(), "lexical_declaration" | "variable_declaration") {
                for declarator in named_children(node).filter(|c| c.kind() == "variable_declarator") {
                    if let Some(object) = self.guarded_object(declarator, source) {
                        spans.push(node.start_byte()..object.end_byte());
                    }
                }
            }
            stack.extend(named_children(node));
        }

        spans.sort_by_key(|s| (s.start, s.end));
        spans
    }

    /// The object literal bound by `declarator`, if its name is reserved.
    fn guarded_object<'t>(&self, declarator: Node<'t>, source: &str) -> Option<Node<'t>> {
        let name = declarator.child_by_field_name("name")?;
        if name.kind() != "identifier" || !self.is_reserved(&source[name.byte_range()]) {
            return None;
        }

        let mut value = declarator.child_by_field_name("value")?;
        while matches!(
            value.kind(),
            "as_expression" | "satisfies_expression" | "parenthesized_expression"
        ) {
            value = value.named_child(0)?;
        }
        (value.kind() == "object").then_some(value)
    }

    fn lexical_spans(&self, source: &str) -> Vec<Range<usize>> {
        let bytes = source.as_bytes();
        let mut spans = Vec::new();
        let mut i = 0;

        while i < bytes.len() {
            if let Some(end) = skip_trivia(bytes, i) {
                i = end;
                continue;
            }

            let b = bytes[i];
            if is_ident_start(b) && (i == 0 || !is_ident_char(bytes[i - 1])) {
                let word_end = ident_end(bytes, i);
                let word = &source[i..word_end];
                if matches!(word, "const" | "let" | "var") {
                    if let Some(span) = self.declaration_span(source, i, word_end) {
                        i = span.end;
                        spans.push(span);
                        continue;
                    }
                }
                i = word_end;
                continue;
            }

            i += 1;
        }

        spans
    }

    fn declaration_span(&self, source: &str, keyword_start: usize, after_keyword: usize) -> Option<Range<usize>> {
        let bytes = source.as_bytes();
        let name_start = skip_whitespace_and_comments(bytes, after_keyword);
        if name_start >= bytes.len() || !is_ident_start(bytes[name_start]) {
            return None;
        }
        let name_end = ident_end(bytes, name_start);
        if !self.is_reserved(&source[name_start..name_end]) {
            return None;
        }

        let eq = find_initializer(bytes, name_end)?;
        let open = skip_whitespace_and_comments(bytes, eq + 1);
        if bytes.get(open) != Some(&b'{') {
            return None;
        }
        let close = matching_brace(bytes, open)?;
        Some(keyword_start..close + 1)
    }
}

fn named_children<'t>(node: Node<'t>) -> impl Iterator<Item = Node<'t>> {
    (0..node.named_child_count()).filter_map(move |i| node.named_child(i))
}

/// Skip an optional `: Type` annotation and return the index of `=`.
fn find_initializer(bytes: &[u8], mut i: usize) -> Option<usize> {
    let mut angle = 0usize;
    let mut other = 0usize;
    while i < bytes.len() {
        if let Some(end) = skip_trivia(bytes, i) {
            i = end;
            continue;
        }
        match bytes[i] {
            b'<' => angle += 1,
            b'>' if angle > 0 && bytes.get(i.wrapping_sub(1)) != Some(&b'=') => angle -= 1,
            b'(' | b'[' | b'{' => other += 1,
            b')' | b']' | b'}' => {
                if other == 0 {
                    return None;
                }
                other -= 1;
            }
            b'=' if angle == 0 && other == 0 && bytes.get(i + 1) != Some(&b'>') => {
                return Some(i);
            }
            b';' | b',' if angle == 0 && other == 0 => return None,
            _ => {}
        }
        i += 1;
    }
    None
}

/// Index of the `}` matching the `{` at `open`.
fn matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        if let Some(end) = skip_trivia(bytes, i) {
            i = end;
            continue;
        }
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// If a string, template literal or comment starts at `i`, return the index
/// just past it.
fn skip_trivia(bytes: &[u8], i: usize) -> Option<usize> {
    match bytes[i] {
        quote @ (b'\'' | b'"' | b'`') => Some(skip_string(bytes, i, quote)),
        b'/' if bytes.get(i + 1) == Some(&b'/') => {
            let end = bytes[i..]
                .iter()
                .position(|&b| b == b'\n')
                .map_or(bytes.len(), |p| i + p);
            Some(end)
        }
        b'/' if bytes.get(i + 1) == Some(&b'*') => {
            let end = bytes[i + 2..]
                .windows(2)
                .position(|w| w == b"*/")
                .map_or(bytes.len(), |p| i + 2 + p + 2);
            Some(end)
        }
        _ => None,
    }
}

fn skip_string(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            b'\n' if quote != b'`' => return i,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn skip_whitespace_and_comments(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() {
        if bytes[i].is_ascii_whitespace() {
            i += 1;
            continue;
        }
        match skip_trivia(bytes, i) {
            Some(end) if bytes[i] == b'/' => i = end,
            _ => break,
        }
    }
    i
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

fn ident_end(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&b| !is_ident_char(b))
        .map_or(bytes.len(), |p| start + p)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> SpanGuard {
        SpanGuard::new(["colors", "colorMap"])
    }

    #[test]
    fn finds_a_reserved_object_declaration() {
        let src = "const colors = { white: 'bg-white' };\nconst x = 1;";
        let spans = guard().scan(src);
        assert_eq!(spans.len(), 1);
        assert_eq!(&src[spans[0].clone()], "const colors = { white: 'bg-white' }");
    }

    #[test]
    fn skips_type_annotations_and_export() {
        let src = "export const colorMap: Record<string, string> = {\n  a: 'b',\n};";
        let spans = guard().scan(src);
        assert_eq!(spans.len(), 1);
        assert!(src[spans[0].clone()].starts_with("const colorMap"));
        assert!(src[spans[0].clone()].ends_with('}'));
    }

    #[test]
    fn braces_in_strings_and_comments_do_not_close_the_span() {
        let src = "const colors = {\n  a: '}',\n  // }\n  b: `${'x'}`,\n  /* } */ c: \"}\",\n};\nrest";
        let spans = guard().scan(src);
        assert_eq!(spans.len(), 1);
        assert!(src[spans[0].clone()].ends_with("c: \"}\",\n}"));
    }

    #[test]
    fn ignores_unreserved_and_non_object_bindings() {
        let src = "const palette = { a: 1 };\nconst colors = makeColors();\nlet colorsExtra = {};";
        assert!(guard().scan(src).is_empty());
    }

    #[test]
    fn declaration_inside_a_string_is_not_guarded() {
        let src = "const doc = \"const colors = { a: 1 }\";";
        assert!(guard().scan(src).is_empty());
    }

    #[test]
    fn apostrophe_in_jsx_text_does_not_hide_the_declaration() {
        let src = "export const A = () => <p>Don't</p>;\nconst colors = { white: 'bg-white' };\n";
        let spans = guard().scan(src);
        assert_eq!(spans.len(), 1);
        assert_eq!(&src[spans[0].clone()], "const colors = { white: 'bg-white' }");
    }

    #[test]
    fn backtick_in_regex_literal_does_not_hide_the_declaration() {
        let src = "const re = /`/;\nconst colors = { white: 'bg-white' };\n";
        let spans = guard().scan(src);
        assert_eq!(spans.len(), 1);
        assert_eq!(&src[spans[0].clone()], "const colors = { white: 'bg-white' }");
    }

    #[test]
    fn wrapped_objects_and_nested_scopes_are_guarded() {
        let src = "const colors = { a: 'x' } as const;\n\
                   function f() {\n  let colorMap = ({ b: 'y' }) satisfies Record<string, string>;\n}\n";
        let spans = guard().scan(src);
        assert_eq!(spans.len(), 2);
        assert_eq!(&src[spans[0].clone()], "const colors = { a: 'x' }");
        assert!(src[spans[1].clone()].starts_with("let colorMap = ({ b: 'y' }"));
    }

    #[test]
    fn broken_source_falls_back_to_the_byte_scanner() {
        let src = "const colors = { a: 'x' };\nconst broken = ;\n";
        let spans = guard().scan(src);
        assert!(spans.iter().any(|s| &src[s.clone()] == "const colors = { a: 'x' }"));
    }

    #[test]
    fn overlap_is_half_open() {
        let spans = vec![10..20];
        assert!(SpanGuard::overlaps(&spans, &(15..16)));
        assert!(SpanGuard::overlaps(&spans, &(5..11)));
        assert!(!SpanGuard::overlaps(&spans, &(20..25)));
        assert!(!SpanGuard::overlaps(&spans, &(0..10)));
    }
}
