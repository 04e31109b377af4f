//! Domain value objects: TransformKind, ComponentKind.
//!
//! # Design
//!
//! Pure value types: `Copy`, compared by value.
//! This file's only job is to define the types, their string
//! representations, and their `FromStr` parsers.

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── TransformKind ────────────────────────────────────────────────────────────

/// How a transform edits source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformKind {
    /// Structural edit through the syntax tree.
    Ast,
    /// Ordered pattern substitution.
    Regex,
    /// Reports findings for a human; never edits.
    Manual,
}

/// A change carries the kind of the transform that produced it.
pub type ChangeKind = TransformKind;

impl TransformKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ast => "ast",
            Self::Regex => "regex",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ast" => Ok(Self::Ast),
            "regex" => Ok(Self::Regex),
            "manual" => Ok(Self::Manual),
            other => Err(DomainError::UnknownTransformKind(other.to_string())),
        }
    }
}

// ── ComponentKind ────────────────────────────────────────────────────────────

/// The allow-list of component kinds the token injector understands.
///
/// A component is recognized when its exported name is PascalCase and ends
/// with one of these kinds (`PrimaryButton` → `Button`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentKind {
    Button,
    Card,
    Badge,
    Alert,
    Input,
    Modal,
    Avatar,
    Tag,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 8] = [
        Self::Button,
        Self::Card,
        Self::Badge,
        Self::Alert,
        Self::Input,
        Self::Modal,
        Self::Avatar,
        Self::Tag,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Button => "Button",
            Self::Card => "Card",
            Self::Badge => "Badge",
            Self::Alert => "Alert",
            Self::Input => "Input",
            Self::Modal => "Modal",
            Self::Avatar => "Avatar",
            Self::Tag => "Tag",
        }
    }

    /// Detect the component kind from an exported identifier.
    ///
    /// Returns `None` unless the name is PascalCase and ends with a supported
    /// kind. The longest matching suffix wins.
    pub fn detect(name: &str) -> Option<Self> {
        if !is_pascal_case(name) {
            return None;
        }
        Self::ALL
            .iter()
            .copied()
            .filter(|kind| name.ends_with(kind.as_str()))
            .max_by_key(|kind| kind.as_str().len())
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::UnknownComponentKind(s.to_string()))
    }
}

fn is_pascal_case(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric())
}
