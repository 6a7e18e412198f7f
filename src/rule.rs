//! In-memory description of a generated build rule.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::kinds::KindInfo;
use crate::platform::PlatformStrings;

/// Value of a rule attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// A single string, e.g. `importpath`.
    String(String),
    /// A plain list, e.g. `srcs` or `visibility`.
    List(Vec<String>),
    /// A list that may vary by platform.
    Platform(PlatformStrings),
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(v: Vec<String>) -> Self {
        Self::List(v)
    }
}

impl From<PlatformStrings> for AttrValue {
    fn from(ps: PlatformStrings) -> Self {
        Self::Platform(ps)
    }
}

/// A generated rule: kind, name, and attributes.
///
/// Import metadata for the resolver is carried as a private attribute; it
/// is not serialised with the rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    kind: String,
    name: String,
    attrs: BTreeMap<String, AttrValue>,
    #[serde(skip)]
    imports: Option<PlatformStrings>,
}

impl Rule {
    /// Creates a rule with no attributes.
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self { kind: kind.into(), name: name.into(), attrs: BTreeMap::new(), imports: None }
    }

    /// Kind of the rule, e.g. `cue_instance`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Name of the rule.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets (or replaces) an attribute.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.attrs.insert(key.into(), value.into());
    }

    /// Returns an attribute if set.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    /// Returns a string attribute, or `None` if unset or not a string.
    #[must_use]
    pub fn attr_string(&self, key: &str) -> Option<&str> {
        match self.attrs.get(key) {
            Some(AttrValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns the values of a list attribute, flattening platform lists.
    #[must_use]
    pub fn attr_strings(&self, key: &str) -> Vec<&str> {
        match self.attrs.get(key) {
            Some(AttrValue::List(v)) => v.iter().map(String::as_str).collect(),
            Some(AttrValue::Platform(ps)) => ps.iter().collect(),
            Some(AttrValue::String(_)) | None => Vec::new(),
        }
    }

    /// Attribute names, sorted.
    pub fn attr_keys(&self) -> impl Iterator<Item = &str> {
        self.attrs.keys().map(String::as_str)
    }

    /// Attaches the import metadata consumed by dependency resolution.
    pub fn set_imports(&mut self, imports: PlatformStrings) {
        self.imports = Some(imports);
    }

    /// Import metadata, if attached.
    #[must_use]
    pub fn imports(&self) -> Option<&PlatformStrings> {
        self.imports.as_ref()
    }

    /// Returns `true` if none of the kind's non-empty attributes is set.
    #[must_use]
    pub fn is_empty(&self, info: &KindInfo) -> bool {
        !info.non_empty_attrs.iter().any(|a| self.attrs.contains_key(*a))
    }
}
