//! Syntax-aware token injection.
//!
//! [`TokenInjector`] finds the exported component of a TSX module, locates
//! its color lookup object and appends derived design-token entries to it.
//! The work is split in three steps:
//!
//! 1. parse the source and fold the tree into immutable [`facts`];
//! 2. decide what to add from the facts and the [`InjectionTable`];
//! 3. print minimal insertions and re-parse the result to verify it.
//!
//! Expected no-op conditions return the input unchanged with a warning.

mod facts;
mod printer;
mod table;

use tracing::debug;

pub use table::{InjectionTable, TokenEntry};

use crate::domain::{
    entities::change::{Change, TransformResult},
    error::DomainError,
    transform::{Transform, TransformError, TransformMeta},
    value_objects::TransformKind,
};

pub(crate) use facts::parse_tsx;
use facts::SourceFacts;

/// Object names searched by default.
pub const DEFAULT_TARGET_OBJECTS: [&str; 5] = ["colors", "colorMap", "variants", "palette", "tones"];

#[derive(Debug, Clone)]
pub struct TokenInjector {
    meta: TransformMeta,
    table: InjectionTable,
    targets: Vec<String>,
}

impl TokenInjector {
    pub fn new(meta: TransformMeta, table: InjectionTable) -> Result<Self, DomainError> {
        meta.validate()?;
        Ok(Self {
            meta,
            table,
            targets: DEFAULT_TARGET_OBJECTS.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Replace the names of objects that may receive entries.
    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn table(&self) -> &InjectionTable {
        &self.table
    }
}

impl Transform for TokenInjector {
    fn meta(&self) -> &TransformMeta {
        &self.meta
    }

    fn execute(&self, content: &str) -> Result<TransformResult, TransformError> {
        let tree = parse_tsx(content)?;
        if tree.root_node().has_error() {
            return Ok(TransformResult::unchanged(content)
                .with_warning("failed to parse source: syntax errors present"));
        }

        let facts = SourceFacts::gather(&tree, content, &self.targets);

        let Some((component, kind)) = facts.component() else {
            return Ok(TransformResult::unchanged(content).with_warning("no supported component found"));
        };

        let entries = self.table.entries_for(kind);
        if entries.is_empty() {
            return Ok(TransformResult::unchanged(content)
                .with_warning(format!("no tokens registered for {kind}")));
        }

        let Some(object) = facts.target_object(component) else {
            return Ok(TransformResult::unchanged(content).with_warning(format!(
                "no target object found in {}",
                component.name
            )));
        };

        if let Some(existing) = self
            .table
            .reserved_keys(kind)
            .find(|key| object.has_key(key))
        {
            return Ok(TransformResult::unchanged(content).with_warning(format!(
                "derived tokens already present in `{}` (found `{existing}`)",
                object.name
            )));
        }

        let (insertions, printed) = printer::plan(content, object, entries);
        let output = printer::apply(content, &insertions);

        let reparsed = parse_tsx(&output)?;
        if reparsed.root_node().has_error() {
            debug!(component = %component.name, "injected output failed to re-parse");
            return Ok(TransformResult::unchanged(content)
                .with_warning("injection skipped: printed output did not parse"));
        }

        let changes = printed
            .into_iter()
            .map(|p| {
                Change::new("", p.property, TransformKind::Ast)
                    .at_offset(content, p.at)
                    .with_context(format!("{kind} `{}`", object.name))
            })
            .collect();

        debug!(component = %component.name, %kind, object = %object.name, "tokens injected");
        Ok(TransformResult::changed(output, changes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ComponentKind;

    fn injector() -> TokenInjector {
        let meta =
            TransformMeta::new("inject", "inject tokens", "tokens", TransformKind::Ast).unwrap();
        let table = InjectionTable::new()
            .with(ComponentKind::Button, "primary", "var(--color-blue-600)")
            .unwrap()
            .with(ComponentKind::Button, "primaryHover", "var(--color-blue-700)")
            .unwrap();
        TokenInjector::new(meta, table).unwrap()
    }

    const BUTTON: &str = "const colors = {\n  white: 'bg-white',\n};\n\nexport function Button() {\n  return <button className={colors.white} />;\n}\n";

    #[test]
    fn appends_entries_to_the_component_object() {
        let out = injector().execute(BUTTON).unwrap();
        assert!(out.has_changes);
        assert!(out.content.contains(
            "  white: 'bg-white',\n  primary: 'var(--color-blue-600)',\n  primaryHover: 'var(--color-blue-700)',\n};"
        ));
        assert_eq!(out.changes.len(), 2);
        assert!(out.changes.iter().all(|c| c.kind == TransformKind::Ast));
        assert_eq!(out.changes[0].line, Some(2));
    }

    #[test]
    fn second_run_is_a_no_op() {
        let first = injector().execute(BUTTON).unwrap();
        let second = injector().execute(&first.content).unwrap();
        assert!(!second.has_changes);
        assert_eq!(second.content, first.content);
        assert!(second.warnings[0].contains("already present"));
    }

    #[test]
    fn no_component_is_a_warning() {
        let src = "export const helper = () => 1;\n";
        let out = injector().execute(src).unwrap();
        assert!(!out.has_changes);
        assert_eq!(out.content, src);
        assert_eq!(out.warnings, vec!["no supported component found".to_string()]);
    }

    #[test]
    fn kind_without_tokens_is_a_warning() {
        let src = "const colors = { a: 'b' };\nexport const Card = () => null;\n";
        let out = injector().execute(src).unwrap();
        assert!(!out.has_changes);
        assert!(out.warnings[0].contains("Card"));
    }

    #[test]
    fn syntax_errors_leave_source_untouched() {
        let src = "export function Button( {\n";
        let out = injector().execute(src).unwrap();
        assert!(!out.has_changes);
        assert_eq!(out.content, src);
        assert!(out.warnings[0].contains("failed to parse"));
    }

    #[test]
    fn missing_target_object_is_a_warning() {
        let src = "export function PrimaryButton() { return null; }\n";
        let out = injector().execute(src).unwrap();
        assert!(!out.has_changes);
        assert!(out.warnings[0].contains("no target object"));
    }
}
