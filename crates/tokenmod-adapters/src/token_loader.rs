//! TOML token table loader.
//!
//! # Format
//!
//! ```toml
//! targets = ["colors", "variants"]   # objects receiving injected entries
//! guarded = ["colors"]               # objects never regex-rewritten
//!
//! [[mappings]]                       # applied in file order
//! pattern     = '\bbg-white\b'
//! replacement = "bg-surface"
//! description = "white background to surface"
//!
//! [[tokens]]
//! component = "Button"
//! key       = "primary"
//! value     = "var(--color-blue-600)"
//! ```
//!
//! Every section is optional. A section that is present replaces the
//! built-in equivalent; missing sections keep the built-in data. Patterns
//! are compiled at load time so a bad table fails before any file is read.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, instrument};

use tokenmod_core::{
    application::ApplicationError,
    domain::{ComponentKind, DomainError, InjectionTable, RegexMapping},
    error::{TokenmodError, TokenmodResult},
};

use crate::builtin_tokens::TokenTables;

// ── Manifest types ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct TokenManifest {
    pub targets: Option<Vec<String>>,
    pub guarded: Option<Vec<String>>,
    pub mappings: Option<Vec<MappingEntry>>,
    pub tokens: Option<Vec<TokenEntryDef>>,
}

/// One `[[mappings]]` entry.
#[derive(Debug, Deserialize, Clone)]
pub struct MappingEntry {
    pub pattern: String,
    pub replacement: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One `[[tokens]]` entry.
#[derive(Debug, Deserialize, Clone)]
pub struct TokenEntryDef {
    pub component: String,
    pub key: String,
    pub value: String,
}

// ── Loader ────────────────────────────────────────────────────────────────────

pub struct TokenTableLoader {
    path: PathBuf,
}

impl TokenTableLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the file and merge it over the built-in tables.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> TokenmodResult<TokenTables> {
        let raw = fs::read_to_string(&self.path).map_err(|e| self.invalid(e.to_string()))?;
        let manifest: TokenManifest =
            toml::from_str(&raw).map_err(|e| self.invalid(e.to_string()))?;

        let tables = merge(TokenTables::builtin()?, manifest)
            .map_err(|e| self.invalid(e.to_string()))?;
        debug!(
            mappings = tables.color_mappings.len(),
            targets = tables.targets.len(),
            "Token table loaded"
        );
        Ok(tables)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn invalid(&self, reason: String) -> TokenmodError {
        ApplicationError::InvalidTokenTable {
            path: self.path.clone(),
            reason,
        }
        .into()
    }
}

/// Overlay a manifest on `base`.
pub fn merge(mut base: TokenTables, manifest: TokenManifest) -> Result<TokenTables, DomainError> {
    if let Some(targets) = manifest.targets {
        base.targets = targets;
    }
    if let Some(guarded) = manifest.guarded {
        base.guarded = guarded;
    }
    if let Some(mappings) = manifest.mappings {
        base.color_mappings = mappings
            .iter()
            .map(|m| {
                let description = m
                    .description
                    .clone()
                    .unwrap_or_else(|| format!("{} -> {}", m.pattern, m.replacement));
                RegexMapping::new(&m.pattern, &m.replacement, description)
            })
            .collect::<Result<_, _>>()?;
    }
    if let Some(tokens) = manifest.tokens {
        let mut table = InjectionTable::new();
        for entry in tokens {
            let kind: ComponentKind = entry.component.parse()?;
            table.insert(kind, entry.key, entry.value)?;
        }
        base.injection = table;
    }
    Ok(base)
}
