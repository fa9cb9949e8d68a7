//! View projection.
//!
//! A view shows the model at one C4 abstraction level, optionally zoomed into
//! a single element. [`ViewProjector`] decides which elements are *core* for
//! the view, resolves the endpoints of every relation statement, and projects
//! endpoints that are not core onto their nearest visible ancestor. One
//! aggregated node then stands in for an entire hidden subtree.
//!
//! # Core elements
//!
//! | Level | Focus | Core |
//! |-------|-------|------|
//! | Context | - | every `person` and `system` |
//! | Container | none | every element except components |
//! | Container | `f` | `f` and its container/datastore/queue descendants |
//! | Component | none | every element |
//! | Component | `f` | `f` and its container/component/datastore/queue descendants |
//!
//! # Endpoint resolution
//!
//! An endpoint is first looked up as an exact FQN. Otherwise every FQN ending
//! in `.<name>` is a candidate; a candidate declared directly in one of the
//! preferred scopes wins, then the first candidate in model order. A name with
//! no candidate is kept literally and later dropped if it projects to nothing.
//!
//! All outputs are in order of first discovery, so projection is reproducible.

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace, warn};
use serde::Serialize;

use astrolabe_core::kind::ElementKind;

use crate::{
    config::ViewLevel,
    extract::{Element, RelationStatement},
    lookup::LookupIndex,
};

/// A relation between two visible elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Relation {
    from: String,
    to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

impl Relation {
    pub fn new(from: impl Into<String>, to: impl Into<String>, label: Option<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label,
        }
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

/// The visible subset of a model for one view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectedView {
    /// Visible elements in order of first discovery.
    pub elements: Vec<Element>,
    /// Deduplicated relations between visible elements.
    pub relations: Vec<Relation>,
}

/// Projects a model onto a view level and optional focus.
pub struct ViewProjector<'a> {
    lookup: &'a LookupIndex,
    level: ViewLevel,
    focus: Option<&'a str>,
    /// FQNs by their last path segment, in model order.
    by_last_segment: IndexMap<&'a str, Vec<&'a str>>,
}

impl<'a> ViewProjector<'a> {
    /// Creates a projector.
    ///
    /// A focus that names no element is ignored and the view is projected
    /// unfocused.
    pub fn new(lookup: &'a LookupIndex, level: ViewLevel, focus: Option<&'a str>) -> Self {
        let focus = focus.filter(|focus| {
            let known = lookup.contains(focus);
            if !known {
                warn!(focus = *focus; "Focus element not found, projecting unfocused view");
            }
            known
        });

        let mut by_last_segment: IndexMap<&'a str, Vec<&'a str>> = IndexMap::new();
        for id in lookup.ids() {
            let last = id.rsplit('.').next().unwrap_or(id);
            by_last_segment.entry(last).or_default().push(id);
        }

        Self {
            lookup,
            level,
            focus,
            by_last_segment,
        }
    }

    /// Returns `true` if `fqn` is a core element of this view.
    pub fn is_core(&self, fqn: &str) -> bool {
        let Some(kind) = self.lookup.kind(fqn) else {
            return false;
        };

        match (self.level, self.focus) {
            (ViewLevel::Context, _) => kind.is_root_kind(),
            (ViewLevel::Container, None) => kind != ElementKind::Component,
            (ViewLevel::Container, Some(focus)) => {
                fqn == focus
                    || (self.is_strict_descendant(fqn, focus)
                        && matches!(
                            kind,
                            ElementKind::Container | ElementKind::Datastore | ElementKind::Queue
                        ))
            }
            (ViewLevel::Component, None) => true,
            (ViewLevel::Component, Some(focus)) => {
                fqn == focus
                    || (self.is_strict_descendant(fqn, focus)
                        && matches!(
                            kind,
                            ElementKind::Container
                                | ElementKind::Component
                                | ElementKind::Datastore
                                | ElementKind::Queue
                        ))
            }
        }
    }

    /// Computes the visible elements and relations.
    pub fn project(&self, elements: &[Element], statements: &[RelationStatement]) -> ProjectedView {
        let mut visible: IndexSet<String> = elements
            .iter()
            .filter(|element| self.is_core(element.id()))
            .map(|element| element.id().to_string())
            .collect();

        let mut seen: IndexSet<Relation> = IndexSet::new();

        for statement in statements {
            let from = self.resolve(statement.from(), &[statement.scope()]);
            let from_parent = self.lookup.parent(&from);
            let to = self.resolve(statement.to(), &[from_parent, statement.scope()]);

            let (Some(from), Some(to)) = (self.project_endpoint(&from), self.project_endpoint(&to))
            else {
                trace!(from = statement.from(), to = statement.to(); "Dropping unresolved relation");
                continue;
            };

            if from == to {
                continue;
            }

            let keep = self.is_core(&from)
                || self.is_core(&to)
                || (visible.contains(&from) && visible.contains(&to));
            if !keep {
                continue;
            }

            let label = statement
                .label()
                .filter(|label| !label.is_empty())
                .map(str::to_string);
            let relation = Relation::new(from.as_str(), to.as_str(), label);

            visible.insert(from);
            visible.insert(to);
            seen.insert(relation);
        }

        let by_id: IndexMap<&str, &Element> = elements
            .iter()
            .map(|element| (element.id(), element))
            .collect();

        let view = ProjectedView {
            elements: visible
                .iter()
                .filter_map(|id| by_id.get(id.as_str()).map(|element| (*element).clone()))
                .collect(),
            relations: seen.into_iter().collect(),
        };

        debug!(
            level = self.level.number(),
            focus = self.focus.unwrap_or("");
            "Projected {} elements and {} relations",
            view.elements.len(),
            view.relations.len()
        );
        view
    }

    /// Resolves a possibly short endpoint name to an FQN.
    ///
    /// `scopes` lists the preferred enclosing elements, most preferred first.
    fn resolve(&self, name: &str, scopes: &[Option<&str>]) -> String {
        if self.lookup.contains(name) {
            return name.to_string();
        }

        let suffix = format!(".{name}");
        let last = name.rsplit('.').next().unwrap_or(name);
        let candidates: Vec<&str> = self
            .by_last_segment
            .get(last)
            .into_iter()
            .flatten()
            .copied()
            .filter(|id| id.ends_with(&suffix))
            .collect();

        let scoped = scopes.iter().flatten().find_map(|scope| {
            candidates
                .iter()
                .find(|id| &id[..id.len() - suffix.len()] == *scope)
        });

        scoped
            .or_else(|| candidates.first())
            .map_or_else(|| name.to_string(), |id| id.to_string())
    }

    /// Projects a resolved endpoint onto the element that represents it.
    fn project_endpoint(&self, fqn: &str) -> Option<String> {
        if self.is_core(fqn) {
            return Some(fqn.to_string());
        }

        match self.level {
            ViewLevel::Context | ViewLevel::Container => self.lookup.root_of(fqn),
            ViewLevel::Component => self
                .lookup
                .container_of(fqn)
                .filter(|container| Some(container.as_str()) != self.focus)
                .or_else(|| self.lookup.root_of(fqn)),
        }
    }

    fn is_strict_descendant(&self, fqn: &str, ancestor: &str) -> bool {
        fqn != ancestor && self.lookup.is_within(fqn, ancestor)
    }
}
