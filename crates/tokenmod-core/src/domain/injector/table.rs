//! Injection values keyed by component kind.
//!
//! The table is data supplied from outside (built-in defaults or a TOML
//! file loaded by the adapters). The injector only reads it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{error::DomainError, value_objects::ComponentKind};

/// One derived property to append, e.g. `primary: 'var(--color-blue-600)'`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEntry {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectionTable {
    entries: BTreeMap<ComponentKind, Vec<TokenEntry>>,
}

impl InjectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a derived entry. Keys must be unique per kind.
    pub fn insert(
        &mut self,
        kind: ComponentKind,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), DomainError> {
        let key = key.into();
        let value = value.into();
        let invalid = |reason: &str| DomainError::InvalidTokenEntry {
            kind: kind.to_string(),
            key: key.clone(),
            reason: reason.into(),
        };

        if key.trim().is_empty() {
            return Err(invalid("key is empty"));
        }
        if value.contains('\n') || value.contains('\r') {
            return Err(invalid("value spans multiple lines"));
        }

        let slot = self.entries.entry(kind).or_default();
        if slot.iter().any(|e| e.key == key) {
            return Err(invalid("duplicate key"));
        }
        slot.push(TokenEntry { key, value });
        Ok(())
    }

    /// Builder-style [`Self::insert`].
    pub fn with(
        mut self,
        kind: ComponentKind,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, DomainError> {
        self.insert(kind, key, value)?;
        Ok(self)
    }

    pub fn entries_for(&self, kind: ComponentKind) -> &[TokenEntry] {
        self.entries.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    /// Keys whose presence marks an object as already transformed.
    pub fn reserved_keys(&self, kind: ComponentKind) -> impl Iterator<Item = &str> {
        self.entries_for(kind).iter().map(|e| e.key.as_str())
    }

    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.entries.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_and_blank_keys() {
        let mut table = InjectionTable::new();
        table
            .insert(ComponentKind::Button, "primary", "var(--color-blue-600)")
            .unwrap();
        assert!(table.insert(ComponentKind::Button, "primary", "x").is_err());
        assert!(table.insert(ComponentKind::Button, " ", "x").is_err());
        assert!(table.insert(ComponentKind::Card, "a", "x\ny").is_err());
    }

    #[test]
    fn unknown_kind_has_no_entries() {
        let table = InjectionTable::new()
            .with(ComponentKind::Button, "primary", "x")
            .unwrap();
        assert_eq!(table.entries_for(ComponentKind::Card), &[]);
        assert_eq!(
            table.reserved_keys(ComponentKind::Button).collect::<Vec<_>>(),
            vec!["primary"]
        );
    }
}
