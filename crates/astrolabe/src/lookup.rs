//! FQN lookup index.
//!
//! [`LookupIndex`] maps every fully-qualified name to its kind and
//! parent, and answers the ancestor queries the projector relies on: the
//! nearest root (`person`/`system`) and the nearest container.
//!
//! Projected identifiers do not always match a stored key exactly, so both
//! queries fall back to prefix decomposition: the dotted name is split and
//! its prefixes are tested from the left.

use indexmap::IndexMap;

use astrolabe_core::kind::ElementKind;

use crate::extract::Element;

/// One indexed element.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupEntry {
    pub kind: ElementKind,
    pub parent_id: Option<String>,
}

/// Insertion-ordered index of elements by FQN.
#[derive(Debug, Clone, Default)]
pub struct LookupIndex {
    entries: IndexMap<String, LookupEntry>,
}

impl LookupIndex {
    /// Indexes `elements`, preserving their order.
    pub fn new(elements: &[Element]) -> Self {
        let entries = elements
            .iter()
            .map(|element| {
                (
                    element.id().to_string(),
                    LookupEntry {
                        kind: element.kind(),
                        parent_id: element.parent_id().map(str::to_string),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, fqn: &str) -> Option<&LookupEntry> {
        self.entries.get(fqn)
    }

    pub fn contains(&self, fqn: &str) -> bool {
        self.entries.contains_key(fqn)
    }

    pub fn kind(&self, fqn: &str) -> Option<ElementKind> {
        self.get(fqn).map(|entry| entry.kind)
    }

    pub fn parent(&self, fqn: &str) -> Option<&str> {
        self.get(fqn).and_then(|entry| entry.parent_id.as_deref())
    }

    /// All known FQNs in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `fqn` is `ancestor` or lies beneath it.
    pub fn is_within(&self, fqn: &str, ancestor: &str) -> bool {
        let mut current = Some(fqn);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// The nearest `person`/`system` at or above `fqn`.
    ///
    /// When no such ancestor exists, the top-most known ancestor is returned.
    /// Unknown names are resolved through their dotted prefixes; `None` means
    /// no prefix is known either.
    pub fn root_of(&self, fqn: &str) -> Option<String> {
        if !self.contains(fqn) {
            let mut prefixes = self.known_prefixes(fqn).peekable();
            let first = prefixes.peek().map(|prefix| prefix.to_string());
            return prefixes
                .find(|prefix| self.kind(prefix).is_some_and(ElementKind::is_root_kind))
                .map(str::to_string)
                .or(first);
        }

        let mut current = fqn;
        loop {
            if self.kind(current).is_some_and(ElementKind::is_root_kind) {
                return Some(current.to_string());
            }
            match self.parent(current).filter(|parent| self.contains(parent)) {
                Some(parent) => current = parent,
                None => return Some(current.to_string()),
            }
        }
    }

    /// The nearest `container` at or above `fqn`, if any.
    pub fn container_of(&self, fqn: &str) -> Option<String> {
        if !self.contains(fqn) {
            return self
                .known_prefixes(fqn)
                .find(|prefix| self.kind(prefix) == Some(ElementKind::Container))
                .map(str::to_string);
        }

        let mut current = Some(fqn);
        while let Some(id) = current {
            if self.kind(id) == Some(ElementKind::Container) {
                return Some(id.to_string());
            }
            current = self.parent(id);
        }
        None
    }

    /// Dotted prefixes of `fqn` that are known, shortest first.
    fn known_prefixes<'a>(&'a self, fqn: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        fqn.match_indices('.')
            .map(move |(idx, _)| &fqn[..idx])
            .chain(std::iter::once(fqn))
            .filter(move |prefix| self.contains(prefix))
    }
}
