//! Built-in token tables.
//!
//! These are pure data: the color-class rewrites, the derived entries
//! appended per component kind, and the template line-break rules. Users can
//! replace the first three with a TOML file (see [`crate::token_loader`]).

use tokenmod_core::domain::{
    ComponentKind, DEFAULT_TARGET_OBJECTS, DomainError, InjectionTable, RegexMapping,
};

/// Ordered color-class rewrites. Later rules see earlier output.
const COLOR_MAPPINGS: &[(&str, &str, &str)] = &[
    (r"\bbg-white\b", "bg-surface", "white background to surface"),
    (r"\bbg-gray-50\b", "bg-surface-muted", "muted surface"),
    (r"\bbg-gray-900\b", "bg-surface-inverse", "inverse surface"),
    (r"\btext-gray-900\b", "text-fg", "primary text"),
    (r"\btext-gray-500\b", "text-fg-muted", "muted text"),
    (r"\bborder-gray-200\b", "border-default", "default border"),
    (r"\b(bg|text|border)-blue-600\b", "$1-primary", "brand blue to primary"),
    (r"\b(bg|text|border)-blue-700\b", "$1-primary-hover", "brand blue hover"),
    (r"\b(bg|text|border)-red-600\b", "$1-danger", "red to danger"),
    (r"\b(bg|text|border)-green-600\b", "$1-success", "green to success"),
    (r"\b(bg|text|border)-amber-500\b", "$1-warning", "amber to warning"),
];

/// Derived entries appended to a component's color object.
const INJECTIONS: &[(ComponentKind, &str, &str)] = &[
    (ComponentKind::Button, "primary", "var(--color-blue-600)"),
    (ComponentKind::Button, "primaryHover", "var(--color-blue-700)"),
    (ComponentKind::Button, "danger", "var(--color-red-600)"),
    (ComponentKind::Card, "surface", "var(--color-surface)"),
    (ComponentKind::Card, "border", "var(--color-border)"),
    (ComponentKind::Badge, "primary", "var(--color-blue-600)"),
    (ComponentKind::Badge, "success", "var(--color-green-600)"),
    (ComponentKind::Badge, "danger", "var(--color-red-600)"),
    (ComponentKind::Alert, "info", "var(--color-blue-600)"),
    (ComponentKind::Alert, "success", "var(--color-green-600)"),
    (ComponentKind::Alert, "warning", "var(--color-amber-500)"),
    (ComponentKind::Alert, "danger", "var(--color-red-600)"),
    (ComponentKind::Input, "border", "var(--color-border)"),
    (ComponentKind::Input, "focus", "var(--color-blue-600)"),
    (ComponentKind::Input, "invalid", "var(--color-red-600)"),
    (ComponentKind::Modal, "overlay", "var(--color-overlay)"),
    (ComponentKind::Modal, "surface", "var(--color-surface)"),
    (ComponentKind::Avatar, "fallback", "var(--color-gray-400)"),
    (ComponentKind::Tag, "primary", "var(--color-blue-600)"),
    (ComponentKind::Tag, "neutral", "var(--color-gray-500)"),
];

/// Line-break rules for collapsed one-line templates, applied in order.
const TEMPLATE_MAPPINGS: &[(&str, &str, &str)] = &[
    (r#"(import[^;]+from\s+['"][^'"]+['"])"#, "$1\n", "break after imports"),
    (r"\s+(import\s)", "\n$1", "import on its own line"),
    (r"\s+(export\s)", "\n$1", "export on its own line"),
    (r"\s+(describe\()", "\n\n$1", "blank line before describe"),
    (r"\s+(it\()", "\n\n  $1", "blank line before it"),
    (r"\s+(beforeEach\()", "\n\n  $1", "blank line before beforeEach"),
    (r"\}\)\s+", "})\n", "break after block close"),
    (r";\s*([a-zA-Z])", ";\n$1", "break after statements"),
    (r"\}\s+([a-zA-Z])", "}\n$1", "break after braces"),
    (r"\n\n\n+", "\n\n", "collapse blank lines"),
];

/// Templates longer than this are considered formatted already.
pub const TEMPLATE_LINE_LIMIT: usize = 10;

/// Everything the standard catalog needs besides code.
#[derive(Debug, Clone)]
pub struct TokenTables {
    pub injection: InjectionTable,
    pub color_mappings: Vec<RegexMapping>,
    /// Identifiers whose object literals are never regex-rewritten.
    pub guarded: Vec<String>,
    /// Object names that receive injected entries.
    pub targets: Vec<String>,
}

impl TokenTables {
    pub fn builtin() -> Result<Self, DomainError> {
        let mut injection = InjectionTable::new();
        for (kind, key, value) in INJECTIONS {
            injection.insert(*kind, *key, *value)?;
        }
        let defaults: Vec<String> = DEFAULT_TARGET_OBJECTS.iter().map(|s| s.to_string()).collect();
        Ok(Self {
            injection,
            color_mappings: compile(COLOR_MAPPINGS)?,
            guarded: defaults.clone(),
            targets: defaults,
        })
    }
}

pub fn template_mappings() -> Result<Vec<RegexMapping>, DomainError> {
    compile(TEMPLATE_MAPPINGS)
}

fn compile(rules: &[(&str, &str, &str)]) -> Result<Vec<RegexMapping>, DomainError> {
    rules
        .iter()
        .map(|(pattern, replacement, description)| {
            RegexMapping::new(pattern, replacement, *description)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_compile() {
        let tables = TokenTables::builtin().unwrap();
        assert_eq!(tables.color_mappings.len(), COLOR_MAPPINGS.len());
        assert!(!tables.injection.entries_for(ComponentKind::Button).is_empty());
        for kind in ComponentKind::ALL {
            assert!(
                !tables.injection.entries_for(kind).is_empty(),
                "{kind} has no entries"
            );
        }
        assert_eq!(template_mappings().unwrap().len(), TEMPLATE_MAPPINGS.len());
    }

    #[test]
    fn button_primary_matches_documented_value() {
        let tables = TokenTables::builtin().unwrap();
        let primary = tables
            .injection
            .entries_for(ComponentKind::Button)
            .iter()
            .find(|e| e.key == "primary")
            .unwrap();
        assert_eq!(primary.value, "var(--color-blue-600)");
    }
}
