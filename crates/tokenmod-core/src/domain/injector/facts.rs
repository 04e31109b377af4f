//! Read-only facts gathered from a parsed TSX tree.
//!
//! Everything here is a pure fold over the syntax tree. Nothing is mutated
//! and no node handle escapes: the printer works from byte offsets only.

use std::ops::Range;

use tree_sitter::{Language, Node, Parser, Tree};

use crate::domain::{transform::TransformError, value_objects::ComponentKind};

pub(crate) fn parse_tsx(source: &str) -> Result<Tree, TransformError> {
    let mut parser = Parser::new();
    let language: Language = tree_sitter_typescript::LANGUAGE_TSX.into();
    parser
        .set_language(&language)
        .map_err(|e| TransformError::Grammar {
            reason: e.to_string(),
        })?;
    parser
        .parse(source, None)
        .ok_or_else(|| TransformError::Failed {
            reason: "parser returned no tree".into(),
        })
}

// ── Records ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExportedItem {
    pub name: String,
    /// Byte range of the declaration, when it could be resolved.
    pub declaration: Option<Range<usize>>,
}

/// How an object literal is bound to its name. Declaration order is the
/// preference order when several candidates qualify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum ObjectShape {
    /// `const colors = { ... }`
    DirectBinding,
    /// `{ colors: { ... } }`
    NestedProperty,
    /// `const colors = cva({ ... })`, `{ ... } as const`, ...
    WithinBinding,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ObjectEntry {
    pub key: Option<String>,
    pub range: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ObjectLiteral {
    pub name: String,
    pub shape: ObjectShape,
    /// From `{` to just past `}`.
    pub range: Range<usize>,
    pub start_row: usize,
    pub end_row: usize,
    pub entries: Vec<ObjectEntry>,
    /// Byte offset of a comma following the last entry.
    pub trailing_comma: Option<usize>,
    /// Quote character of the first string-valued entry.
    pub quote: Option<char>,
}

impl ObjectLiteral {
    pub fn is_multiline(&self) -> bool {
        self.start_row != self.end_row
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key.as_deref() == Some(key))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SourceFacts {
    pub exports: Vec<ExportedItem>,
    pub objects: Vec<ObjectLiteral>,
}

impl SourceFacts {
    /// Walk the tree once. `targets` names the objects worth recording.
    pub fn gather(tree: &Tree, source: &str, targets: &[String]) -> Self {
        let root = tree.root_node();
        let declarations = top_level_declarations(root, source);
        let exports = exports(root, source)
            .into_iter()
            .map(|mut item| {
                if item.declaration.is_none() {
                    item.declaration = declarations
                        .iter()
                        .find(|(name, _)| *name == item.name)
                        .map(|(_, range)| range.clone());
                }
                item
            })
            .collect();

        let mut objects = Vec::new();
        collect_objects(root, source, targets, &Slot::Other, None, &mut objects);

        Self { exports, objects }
    }

    /// First export whose name maps to a supported component kind.
    pub fn component(&self) -> Option<(&ExportedItem, ComponentKind)> {
        self.exports
            .iter()
            .find_map(|item| ComponentKind::detect(&item.name).map(|kind| (item, kind)))
    }

    /// Pick the target object: inside the component first, then by shape,
    /// then by position.
    pub fn target_object(&self, component: &ExportedItem) -> Option<&ObjectLiteral> {
        let inside = |o: &ObjectLiteral| {
            component
                .declaration
                .as_ref()
                .is_some_and(|d| d.start <= o.range.start && o.range.end <= d.end)
        };
        self.objects
            .iter()
            .min_by_key(|o| (!inside(o), o.shape, o.range.start))
    }
}

// ── Fold ─────────────────────────────────────────────────────────────────────

fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    &source[node.byte_range()]
}

fn children<'t>(node: Node<'t>) -> impl Iterator<Item = Node<'t>> {
    (0..node.child_count()).filter_map(move |i| node.child(i))
}

fn named_children<'t>(node: Node<'t>) -> impl Iterator<Item = Node<'t>> {
    (0..node.named_child_count()).filter_map(move |i| node.named_child(i))
}

/// The property name, with quotes stripped from string keys.
fn key_text(node: Node<'_>, source: &str) -> String {
    let raw = text(node, source);
    match node.kind() {
        "string" => raw.trim_matches(|c| c == '"' || c == '\'').to_string(),
        _ => raw.to_string(),
    }
}

fn top_level_declarations(root: Node<'_>, source: &str) -> Vec<(String, Range<usize>)> {
    let mut out = Vec::new();
    for node in named_children(root) {
        let decl = if node.kind() == "export_statement" {
            match node.child_by_field_name("declaration") {
                Some(d) => d,
                None => continue,
            }
        } else {
            node
        };
        out.extend(declared_names(decl, source));
    }
    out
}

/// Names introduced by a declaration node, with their ranges.
fn declared_names(node: Node<'_>, source: &str) -> Vec<(String, Range<usize>)> {
    match node.kind() {
        "function_declaration"
        | "generator_function_declaration"
        | "class_declaration"
        | "abstract_class_declaration"
        | "function_expression"
        | "class" => node
            .child_by_field_name("name")
            .map(|n| vec![(text(n, source).to_string(), node.byte_range())])
            .unwrap_or_default(),
        "lexical_declaration" | "variable_declaration" => named_children(node)
            .filter(|c| c.kind() == "variable_declarator")
            .filter_map(|d| {
                let name = d.child_by_field_name("name")?;
                (name.kind() == "identifier")
                    .then(|| (text(name, source).to_string(), d.byte_range()))
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn exports(root: Node<'_>, source: &str) -> Vec<ExportedItem> {
    let mut out = Vec::new();

    for stmt in named_children(root).filter(|n| n.kind() == "export_statement") {
        if let Some(decl) = stmt.child_by_field_name("declaration") {
            out.extend(declared_names(decl, source).into_iter().map(|(name, range)| {
                ExportedItem {
                    name,
                    declaration: Some(range),
                }
            }));
            continue;
        }

        for child in named_children(stmt) {
            match child.kind() {
                // `export default Button`
                "identifier" => out.push(ExportedItem {
                    name: text(child, source).to_string(),
                    declaration: None,
                }),
                "export_clause" => {
                    for spec in named_children(child).filter(|s| s.kind() == "export_specifier") {
                        let Some(name) = spec.child_by_field_name("name") else {
                            continue;
                        };
                        let exported = spec.child_by_field_name("alias").unwrap_or(name);
                        out.push(ExportedItem {
                            name: text(exported, source).to_string(),
                            declaration: None,
                        });
                    }
                }
                _ => out.extend(declared_names(child, source).into_iter().map(
                    |(name, range)| ExportedItem {
                        name,
                        declaration: Some(range),
                    },
                )),
            }
        }
    }

    out
}

/// What the current node is the value of.
enum Slot {
    Declarator(String),
    Pair(String),
    Other,
}

fn collect_objects(
    node: Node<'_>,
    source: &str,
    targets: &[String],
    slot: &Slot,
    binding: Option<&str>,
    out: &mut Vec<ObjectLiteral>,
) {
    if node.kind() == "object" {
        let named = match slot {
            Slot::Declarator(name) => Some((name.as_str(), ObjectShape::DirectBinding)),
            Slot::Pair(key) => Some((key.as_str(), ObjectShape::NestedProperty)),
            Slot::Other => binding.map(|b| (b, ObjectShape::WithinBinding)),
        };
        if let Some((name, shape)) = named {
            if targets.iter().any(|t| t == name) {
                out.push(object_literal(node, source, name, shape));
            }
        }
    }

    let declarator_name = (node.kind() == "variable_declarator")
        .then(|| node.child_by_field_name("name"))
        .flatten()
        .filter(|n| n.kind() == "identifier")
        .map(|n| text(n, source).to_string());
    let binding = declarator_name.as_deref().or(binding);

    let value_id = node.child_by_field_name("value").map(|v| v.id());
    let pair_key = (node.kind() == "pair")
        .then(|| node.child_by_field_name("key"))
        .flatten()
        .map(|k| key_text(k, source));

    for child in children(node) {
        let is_value = Some(child.id()) == value_id;
        let child_slot = match (&declarator_name, &pair_key) {
            (Some(name), _) if is_value => Slot::Declarator(name.clone()),
            (_, Some(key)) if is_value => Slot::Pair(key.clone()),
            _ => Slot::Other,
        };
        collect_objects(child, source, targets, &child_slot, binding, out);
    }
}

fn object_literal(node: Node<'_>, source: &str, name: &str, shape: ObjectShape) -> ObjectLiteral {
    let mut entries = Vec::new();
    let mut quote = None;

    for child in named_children(node) {
        let key = match child.kind() {
            "pair" => child.child_by_field_name("key").map(|k| key_text(k, source)),
            "shorthand_property_identifier" => Some(text(child, source).to_string()),
            "method_definition" => child
                .child_by_field_name("name")
                .map(|k| key_text(k, source)),
            "spread_element" => None,
            _ => continue,
        };
        if quote.is_none() && child.kind() == "pair" {
            quote = child
                .child_by_field_name("value")
                .filter(|v| v.kind() == "string")
                .and_then(|v| text(v, source).chars().next());
        }
        entries.push(ObjectEntry {
            key,
            range: child.byte_range(),
        });
    }

    let trailing_comma = entries.last().and_then(|last| {
        children(node)
            .find(|c| c.kind() == "," && c.start_byte() >= last.range.end)
            .map(|c| c.start_byte())
    });

    ObjectLiteral {
        name: name.to_string(),
        shape,
        range: node.byte_range(),
        start_row: node.start_position().row,
        end_row: node.end_position().row,
        entries,
        trailing_comma,
        quote,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(src: &str) -> SourceFacts {
        let tree = parse_tsx(src).unwrap();
        SourceFacts::gather(&tree, src, &["colors".to_string(), "variants".to_string()])
    }

    #[test]
    fn collects_exports_of_every_form() {
        let src = "export function Button() { return null; }\n\
                   export const CardHeader = () => null;\n\
                   const Badge = () => null;\n\
                   export default Badge;\n\
                   const A = 1;\n\
                   export { A as Alert };\n";
        let f = facts(src);
        let names: Vec<_> = f.exports.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Button", "CardHeader", "Badge", "Alert"]);
        let badge = &f.exports[2];
        assert!(badge.declaration.is_some());
    }

    #[test]
    fn classifies_object_shapes() {
        let src = "const colors = { a: 'x' };\n\
                   const theme = { variants: { b: 'y' } };\n\
                   const colors2 = 1;\n\
                   const variants = build({ c: \"z\" });\n";
        let f = facts(src);
        let shapes: Vec<_> = f.objects.iter().map(|o| (o.name.as_str(), o.shape)).collect();
        assert_eq!(
            shapes,
            vec![
                ("colors", ObjectShape::DirectBinding),
                ("variants", ObjectShape::NestedProperty),
                ("variants", ObjectShape::WithinBinding),
            ]
        );
        assert_eq!(f.objects[0].quote, Some('\''));
        assert_eq!(f.objects[2].quote, Some('"'));
    }

    #[test]
    fn records_trailing_comma_and_keys() {
        let src = "const colors = {\n  'white': 'bg-white',\n  black,\n};\n";
        let f = facts(src);
        let obj = &f.objects[0];
        assert!(obj.is_multiline());
        assert!(obj.has_key("white"));
        assert!(obj.has_key("black"));
        assert!(obj.trailing_comma.is_some());
    }

    #[test]
    fn prefers_objects_inside_the_component() {
        let src = "const colors = { a: 'x' };\n\
                   export function Button() {\n  const colors = { b: 'y' };\n  return null;\n}\n";
        let f = facts(src);
        let (component, kind) = f.component().unwrap();
        assert_eq!(kind, ComponentKind::Button);
        let target = f.target_object(component).unwrap();
        assert!(target.has_key("b"));
    }
}
