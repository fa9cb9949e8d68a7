//! Model extraction and sizing.
//!
//! Flattens the hierarchical [`Model`] into a list of [`Element`]s with
//! fully-qualified names (FQNs) and measured sizes, plus the list of
//! [`RelationStatement`]s in source order together with the scope each one
//! was declared in.
//!
//! FQNs join ancestor identifiers with `.`: a container `api` declared in a
//! system `shop` becomes `shop.api`. Elements are produced in depth-first
//! pre-order, which is also the order later stages treat as "model order".

use log::{debug, warn};
use serde::Serialize;

use astrolabe_core::{
    geometry::Size,
    kind::ElementKind,
    model::{BodyItem, Model, ModelElement},
    text::{NodeText, TextMeasure, measure_node},
};

/// A flattened, sized architectural element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    id: String,
    kind: ElementKind,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    technology: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<String>,
    width: f32,
    height: f32,
}

impl Element {
    /// Creates an element with an explicit size.
    pub fn new(id: impl Into<String>, kind: ElementKind, size: Size) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            kind,
            technology: None,
            description: None,
            parent_id: None,
            width: size.width(),
            height: size.height(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_technology(mut self, technology: Option<String>) -> Self {
        self.technology = technology;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_parent(mut self, parent_id: Option<String>) -> Self {
        self.parent_id = parent_id;
        self
    }

    /// The fully-qualified name.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn technology(&self) -> Option<&str> {
        self.technology.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// FQN of the enclosing element, `None` at the top level.
    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    /// Measured size in pixels.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// A relation as declared, before endpoint resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationStatement {
    from: String,
    to: String,
    label: Option<String>,
    scope: Option<String>,
}

impl RelationStatement {
    /// Creates a statement declared inside `scope` (`None` for the top level).
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        label: Option<String>,
        scope: Option<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label,
            scope,
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

    /// FQN of the element the relation was declared in.
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }
}

/// Output of [`extract`].
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub elements: Vec<Element>,
    pub relations: Vec<RelationStatement>,
}

/// Flattens `model` into sized elements and scoped relation statements.
///
/// Every element is sized immediately from its own title, technology and
/// description, using `measure`.
pub fn extract(model: &Model, measure: &impl TextMeasure) -> Extraction {
    let mut extraction = Extraction::default();
    visit_body(model.items(), None, measure, &mut extraction);

    debug!(
        elements = extraction.elements.len(),
        relations = extraction.relations.len();
        "Model extracted"
    );
    extraction
}

fn visit_body(
    items: &[BodyItem],
    parent: Option<&str>,
    measure: &impl TextMeasure,
    extraction: &mut Extraction,
) {
    for item in items {
        match item {
            BodyItem::Element(element) => visit_element(element, parent, measure, extraction),
            BodyItem::Relation(relation) => extraction.relations.push(RelationStatement::new(
                relation.from(),
                relation.to(),
                relation.label().map(str::to_string),
                parent.map(str::to_string),
            )),
            // Descriptive entries are read by their owning element.
            BodyItem::Technology(_) | BodyItem::Description(_) => {}
        }
    }
}

fn visit_element(
    element: &ModelElement,
    parent: Option<&str>,
    measure: &impl TextMeasure,
    extraction: &mut Extraction,
) {
    let fqn = match parent {
        Some(parent) => format!("{parent}.{}", element.id()),
        None => element.id().to_string(),
    };

    let kind = ElementKind::normalize(element.kind()).unwrap_or_else(|err| {
        warn!(id = fqn, kind = element.kind(); "{err}, treating as container");
        ElementKind::Container
    });

    let title = element.title().unwrap_or(element.id());
    let technology = element.technology();
    let description = element.description();

    let size = measure_node(
        measure,
        NodeText {
            title,
            technology,
            description,
        },
        kind,
    );

    extraction.elements.push(
        Element::new(fqn.clone(), kind, size)
            .with_title(title)
            .with_technology(technology.map(str::to_string))
            .with_description(description.map(str::to_string))
            .with_parent(parent.map(str::to_string)),
    );

    visit_body(element.body(), Some(&fqn), measure, extraction);
}
