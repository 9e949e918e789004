//! Controlled vocabularies
//!
//! A [`CodeList`] holds the reference URIs of one WMO code list together
//! with their short notations. Records may carry either form, so both are
//! members. The [`CodelistRegistry`] is loaded once and shared read-only.

pub mod rdf;

use std::collections::{BTreeMap, HashSet};

/// One entry of a code list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeEntry {
    pub uri: String,
    pub notation: Option<String>,
}

/// Named immutable set of reference identifiers
#[derive(Debug, Clone, Default)]
pub struct CodeList {
    name: String,
    entries: Vec<CodeEntry>,
    members: HashSet<String>,
}

impl CodeList {
    pub fn new(name: impl Into<String>, entries: Vec<CodeEntry>) -> Self {
        let members = entries
            .iter()
            .flat_map(|e| std::iter::once(e.uri.clone()).chain(e.notation.clone()))
            .collect();

        Self {
            name: name.into(),
            entries,
            members,
        }
    }

    /// Build a list from bare URIs, deriving notations from the last path
    /// segment
    pub fn from_uris<I, S>(name: impl Into<String>, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = uris
            .into_iter()
            .map(|uri| {
                let uri = uri.into();
                let notation = uri.rsplit('/').next().map(str::to_string);
                CodeEntry { uri, notation }
            })
            .collect();
        Self::new(name, entries)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether `value` is one of the list's URIs or notations
    pub fn contains(&self, value: &str) -> bool {
        self.members.contains(value)
    }

    pub fn entries(&self) -> &[CodeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read-only map of code list name → code list
#[derive(Debug, Clone, Default)]
pub struct CodelistRegistry {
    lists: BTreeMap<String, CodeList>,
}

impl CodelistRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a list, replacing any list with the same name
    pub fn insert(&mut self, list: CodeList) {
        self.lists.insert(list.name().to_string(), list);
    }

    pub fn with(mut self, list: CodeList) -> Self {
        self.insert(list);
        self
    }

    pub fn get(&self, name: &str) -> Option<&CodeList> {
        self.lists.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.lists.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}
