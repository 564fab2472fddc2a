//! Directory request and entry types
//!
//! These are the values exchanged with a [`DirectoryConnection`]:
//! - `SearchQuery`: filter, base, scope and attribute projection
//! - `RawEntry`: a DN plus multi-valued string attributes
//!
//! [`DirectoryConnection`]: super::DirectoryConnection

use std::collections::HashMap;

use keyward_core::OBJECT_CLASS_ATTRIBUTE;

// ============================================================================
// Search Query
// ============================================================================

/// How far below the base a search reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    /// Only the base object itself
    BaseObject,
    /// The base object and everything beneath it
    Subtree,
}

/// A single directory search, built fresh for every call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub base: String,
    pub scope: SearchScope,
    pub filter: String,
    pub attributes: Vec<String>,
}

impl SearchQuery {
    pub fn subtree(base: impl Into<String>, filter: String, attributes: Vec<String>) -> Self {
        Self {
            base: base.into(),
            scope: SearchScope::Subtree,
            filter,
            attributes,
        }
    }

    pub fn base_object(base: impl Into<String>, filter: String, attributes: Vec<String>) -> Self {
        Self {
            base: base.into(),
            scope: SearchScope::BaseObject,
            filter,
            attributes,
        }
    }
}

// ============================================================================
// Raw Entry
// ============================================================================

/// Entry as returned by the directory, consumed immediately by the mapper
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub dn: String,
    pub attributes: HashMap<String, Vec<String>>,
}

impl RawEntry {
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: HashMap::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attr<I, S>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes
            .insert(name.to_string(), values.into_iter().map(Into::into).collect());
        self
    }

    /// All values of an attribute; attribute names compare case-insensitively
    pub fn values(&self, name: &str) -> &[String] {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    /// First value of an attribute, if it is present and non-empty
    pub fn first_value(&self, name: &str) -> Option<&str> {
        self.values(name)
            .first()
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Whether any objectClass value equals `class`, ignoring case
    pub fn has_object_class(&self, class: &str) -> bool {
        !class.is_empty()
            && self
                .values(OBJECT_CLASS_ATTRIBUTE)
                .iter()
                .any(|v| v.eq_ignore_ascii_case(class))
    }
}

impl From<ldap3::SearchEntry> for RawEntry {
    fn from(entry: ldap3::SearchEntry) -> Self {
        Self {
            dn: entry.dn,
            attributes: entry.attrs,
        }
    }
}
