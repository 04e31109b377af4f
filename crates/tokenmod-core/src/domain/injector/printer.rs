//! Minimal-diff printing of appended object entries.
//!
//! Only insertions are made. Bytes outside the insertion points are never
//! touched, so comments, quote style and blank lines survive as written.

use super::{facts::ObjectLiteral, table::TokenEntry};

/// One text insertion at a byte offset of the original source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Insertion {
    pub at: usize,
    pub text: String,
}

/// An entry as printed, with the offset it was anchored at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Printed {
    pub at: usize,
    pub property: String,
}

/// Plan the insertions that append `entries` to `object`.
pub(crate) fn plan(
    source: &str,
    object: &ObjectLiteral,
    entries: &[TokenEntry],
) -> (Vec<Insertion>, Vec<Printed>) {
    let quote = object.quote.unwrap_or('\'');
    let properties: Vec<String> = entries.iter().map(|e| property(e, quote)).collect();

    let (insertions, anchor) = if object.is_multiline() {
        multiline(source, object, &properties)
    } else {
        single_line(source, object, &properties)
    };

    let printed = properties
        .into_iter()
        .map(|property| Printed {
            at: anchor,
            property,
        })
        .collect();
    (insertions, printed)
}

/// Apply insertions. Offsets refer to the original text.
pub(crate) fn apply(source: &str, insertions: &[Insertion]) -> String {
    let mut sorted: Vec<&Insertion> = insertions.iter().collect();
    sorted.sort_by_key(|i| i.at);

    let extra: usize = sorted.iter().map(|i| i.text.len()).sum();
    let mut out = String::with_capacity(source.len() + extra);
    let mut last = 0;
    for ins in sorted {
        out.push_str(&source[last..ins.at]);
        out.push_str(&ins.text);
        last = ins.at;
    }
    out.push_str(&source[last..]);
    out
}

fn multiline(
    source: &str,
    object: &ObjectLiteral,
    properties: &[String],
) -> (Vec<Insertion>, usize) {
    let nl = newline_of(source);
    let close = object.range.end - 1;

    let Some(last) = object.entries.last() else {
        // `{\n}`: open a fresh body right after the brace.
        let indent = format!("{}  ", indent_at(source, close));
        let mut text = String::new();
        for (i, prop) in properties.iter().enumerate() {
            text.push_str(nl);
            text.push_str(&indent);
            text.push_str(prop);
            if i + 1 < properties.len() {
                text.push(',');
            }
        }
        let at = object.range.start + 1;
        return (vec![Insertion { at, text }], at);
    };

    let indent = indent_at(source, last.range.start);
    let keep_trailing = object.trailing_comma.is_some();
    let mut insertions = Vec::new();

    let after_last = object.trailing_comma.map_or(last.range.end, |c| c + 1);
    if !keep_trailing {
        insertions.push(Insertion {
            at: last.range.end,
            text: ",".into(),
        });
    }

    let at = line_end(source, after_last).min(close);
    let mut text = String::new();
    for (i, prop) in properties.iter().enumerate() {
        text.push_str(nl);
        text.push_str(indent);
        text.push_str(prop);
        if keep_trailing || i + 1 < properties.len() {
            text.push(',');
        }
    }
    if at == close {
        // closing brace shares the last entry's line
        text.push(' ');
    }
    insertions.push(Insertion { at, text });
    (insertions, at)
}

fn single_line(
    source: &str,
    object: &ObjectLiteral,
    properties: &[String],
) -> (Vec<Insertion>, usize) {
    let joined = properties.join(", ");

    match (object.entries.last(), object.trailing_comma) {
        (Some(_), Some(comma)) => {
            let at = comma + 1;
            let text = properties.iter().map(|p| format!(" {p},")).collect();
            (vec![Insertion { at, text }], at)
        }
        (Some(last), None) => {
            let at = last.range.end;
            (
                vec![Insertion {
                    at,
                    text: format!(", {joined}"),
                }],
                at,
            )
        }
        (None, _) => {
            let at = object.range.start + 1;
            let pad = if source[at..].starts_with(char::is_whitespace) {
                ""
            } else {
                " "
            };
            (
                vec![Insertion {
                    at,
                    text: format!(" {joined}{pad}"),
                }],
                at,
            )
        }
    }
}

/// `key: 'value'`, with the key quoted when it is not an identifier.
fn property(entry: &TokenEntry, quote: char) -> String {
    let key = if is_identifier(&entry.key) {
        entry.key.clone()
    } else {
        format!("{quote}{}{quote}", escape(&entry.key, quote))
    };
    format!("{key}: {quote}{}{quote}", escape(&entry.value, quote))
}

fn escape(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\\' || c == quote {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn newline_of(source: &str) -> &'static str {
    if source.contains("\r\n") { "\r\n" } else { "\n" }
}

/// Leading whitespace of the line containing `offset`.
fn indent_at(source: &str, offset: usize) -> &str {
    let start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line = &source[start..];
    let width = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..width]
}

/// Offset of the line break after `offset` (before any `\r`).
fn line_end(source: &str, offset: usize) -> usize {
    match source[offset..].find('\n') {
        Some(i) => {
            let nl = offset + i;
            if nl > 0 && source.as_bytes()[nl - 1] == b'\r' {
                nl - 1
            } else {
                nl
            }
        }
        None => source.len(),
    }
}
