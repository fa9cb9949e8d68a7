//! Hierarchical input model.
//!
//! These types are the boundary between the DSL front end (parser and
//! validator) and the layout-constraint engine. The front end delivers a tree
//! of elements whose bodies interleave nested elements, relation statements
//! and descriptive entries in source order. Identifiers are valid, except that
//! relation endpoints may be short names relative to the element in which the
//! relation is declared.
//!
//! Kinds stay raw strings here; normalization into
//! [`ElementKind`](crate::kind::ElementKind) happens during extraction.
//!
//! # JSON form
//!
//! ```
//! # use astrolabe_core::model::Model;
//! let json = r#"{
//!   "items": [
//!     { "element": { "id": "customer", "kind": "person", "title": "Customer" } },
//!     { "element": { "id": "shop", "kind": "system", "body": [
//!         { "technology": "Rust" },
//!         { "element": { "id": "api", "kind": "container" } }
//!     ] } },
//!     { "relation": { "from": "customer", "to": "shop.api", "label": "Buys" } }
//!   ]
//! }"#;
//! let model: Model = serde_json::from_str(json).unwrap();
//! assert_eq!(model.items().len(), 3);
//! ```

use serde::{Deserialize, Serialize};

/// A complete architecture model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    #[serde(default)]
    items: Vec<BodyItem>,
}

impl Model {
    /// Creates a model from top-level items.
    pub fn new(items: Vec<BodyItem>) -> Self {
        Self { items }
    }

    /// Top-level items in source order.
    pub fn items(&self) -> &[BodyItem] {
        &self.items
    }

    /// Returns `true` when the model declares no elements at any depth.
    pub fn is_empty(&self) -> bool {
        !self
            .items
            .iter()
            .any(|item| matches!(item, BodyItem::Element(_)))
    }
}

/// One entry of a model or element body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyItem {
    Element(ModelElement),
    Relation(ModelRelation),
    Technology(String),
    Description(String),
}

/// An element as declared in the DSL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelElement {
    id: String,
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default)]
    body: Vec<BodyItem>,
}

impl ModelElement {
    /// Creates an element with an empty body.
    ///
    /// # Arguments
    ///
    /// * `id` - Local identifier, unique among its siblings
    /// * `kind` - Raw kind string, synonyms allowed
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            title: None,
            body: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_technology(mut self, technology: impl Into<String>) -> Self {
        self.body.push(BodyItem::Technology(technology.into()));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.body.push(BodyItem::Description(description.into()));
        self
    }

    pub fn with_child(mut self, child: ModelElement) -> Self {
        self.body.push(BodyItem::Element(child));
        self
    }

    pub fn with_relation(mut self, relation: ModelRelation) -> Self {
        self.body.push(BodyItem::Relation(relation));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn body(&self) -> &[BodyItem] {
        &self.body
    }

    /// The first technology entry of the body, if any.
    pub fn technology(&self) -> Option<&str> {
        self.body.iter().find_map(|item| match item {
            BodyItem::Technology(tech) => Some(tech.as_str()),
            _ => None,
        })
    }

    /// The first description entry of the body, if any.
    pub fn description(&self) -> Option<&str> {
        self.body.iter().find_map(|item| match item {
            BodyItem::Description(desc) => Some(desc.as_str()),
            _ => None,
        })
    }
}

/// A relation statement. Endpoints may be fully qualified or short names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRelation {
    from: String,
    to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

impl ModelRelation {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
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
