//! Shared types for manifest parsing.
//!
//! This module defines the literal values a `__manifest__.py` file may
//! contain and the normalized [`Manifest`] record extracted from them.

use serde::Serialize;
use std::fmt;

/// A literal value from a manifest file.
///
/// Only plain data literals are representable: there is no variant for
/// names, calls or any other executable construct.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestValue {
    /// A text string (`'sale'`, `"Sales"`, `r'raw'`).
    Str(String),
    /// A byte string (`b'...'`), decoded lossily.
    Bytes(String),
    /// An integer literal.
    Int(i64),
    /// An integer literal outside the `i64` range, kept as its signed
    /// source text without underscores.
    BigInt(String),
    /// A floating point literal.
    Float(f64),
    /// `True` or `False`.
    Bool(bool),
    /// `None`.
    None,
    /// A list literal: `[...]`.
    List(Vec<ManifestValue>),
    /// A tuple literal: `(...)`.
    Tuple(Vec<ManifestValue>),
    /// A set literal: `{a, b}`.
    Set(Vec<ManifestValue>),
    /// A dictionary literal, in declaration order.
    Dict(Vec<(ManifestValue, ManifestValue)>),
}

impl ManifestValue {
    /// Returns the Python-style type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ManifestValue::Str(_) => "str",
            ManifestValue::Bytes(_) => "bytes",
            ManifestValue::Int(_) | ManifestValue::BigInt(_) => "int",
            ManifestValue::Float(_) => "float",
            ManifestValue::Bool(_) => "bool",
            ManifestValue::None => "NoneType",
            ManifestValue::List(_) => "list",
            ManifestValue::Tuple(_) => "tuple",
            ManifestValue::Set(_) => "set",
            ManifestValue::Dict(_) => "dict",
        }
    }

    /// Returns the string content if this is a text string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ManifestValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements of a list or tuple.
    pub fn as_sequence(&self) -> Option<&[ManifestValue]> {
        match self {
            ManifestValue::List(items) | ManifestValue::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up a string key in a dictionary.
    ///
    /// Returns `None` for non-dictionaries and missing keys. When a key is
    /// repeated the last occurrence wins, as it does when Python builds the
    /// dictionary.
    pub fn get(&self, key: &str) -> Option<&ManifestValue> {
        match self {
            ManifestValue::Dict(pairs) => pairs
                .iter()
                .rev()
                .find(|(k, _)| k.as_str() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }
}

impl fmt::Display for ManifestValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// A parsed module manifest.
///
/// `module` is the technical name taken from the manifest's directory; the
/// other fields come from the manifest content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    /// Technical module name (the containing directory's name).
    pub module: String,

    /// Human-readable name from the `name` key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Version string from the `version` key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Declared dependencies from the `depends` key, in declaration order.
    pub depends: Vec<String>,
}

impl Manifest {
    /// Creates a manifest with only a module name and dependencies.
    pub fn new<S: Into<String>>(
        module: impl Into<String>,
        depends: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            module: module.into(),
            title: None,
            version: None,
            depends: depends.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if the manifest declares any dependencies.
    pub fn has_dependencies(&self) -> bool {
        !self.depends.is_empty()
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}@{}", self.module, version),
            None => write!(f, "{}", self.module),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dict() -> ManifestValue {
        ManifestValue::Dict(vec![
            (
                ManifestValue::Str("name".into()),
                ManifestValue::Str("Sales".into()),
            ),
            (
                ManifestValue::Str("depends".into()),
                ManifestValue::List(vec![ManifestValue::Str("base".into())]),
            ),
            (ManifestValue::Int(1), ManifestValue::Bool(true)),
        ])
    }

    #[test]
    fn test_get_string_key() {
        let dict = sample_dict();
        assert_eq!(dict.get("name").and_then(|v| v.as_str()), Some("Sales"));
        assert!(dict.get("missing").is_none());
    }

    #[test]
    fn test_get_last_duplicate_wins() {
        let dict = ManifestValue::Dict(vec![
            (ManifestValue::Str("k".into()), ManifestValue::Int(1)),
            (ManifestValue::Str("k".into()), ManifestValue::Int(2)),
        ]);
        assert_eq!(dict.get("k"), Some(&ManifestValue::Int(2)));
    }

    #[test]
    fn test_get_on_non_dict() {
        assert!(ManifestValue::List(vec![]).get("depends").is_none());
    }

    #[test]
    fn test_as_sequence() {
        let tuple = ManifestValue::Tuple(vec![ManifestValue::None]);
        assert_eq!(tuple.as_sequence().map(|s| s.len()), Some(1));
        assert!(ManifestValue::Str("x".into()).as_sequence().is_none());
    }

    #[test]
    fn test_type_names() {
        assert_eq!(ManifestValue::None.type_name(), "NoneType");
        assert_eq!(ManifestValue::Set(vec![]).type_name(), "set");
        assert_eq!(format!("{}", ManifestValue::Float(1.5)), "float");
    }

    #[test]
    fn test_manifest_display() {
        let mut manifest = Manifest::new("sale", ["base"]);
        assert_eq!(manifest.to_string(), "sale");
        manifest.version = Some("17.0.1.0".into());
        assert_eq!(manifest.to_string(), "sale@17.0.1.0");
        assert!(manifest.has_dependencies());
    }
}
