//! Astrolabe - A layout-constraint engine for C4 architecture models.
//!
//! Astrolabe turns a hierarchical C4 model (people, systems, containers,
//! components, datastores and queues with relations between them) into a
//! Graphviz DOT document for one view of that model. It never computes
//! coordinates itself; it decides what is visible and how Graphviz should be
//! steered.
//!
//! # Pipeline
//!
//! 1. [`extract`]: flatten the model into sized elements with dotted FQNs
//! 2. [`lookup`]: index elements for ancestor queries
//! 3. [`projection`]: pick the view's elements and aggregate hidden ones
//! 4. [`constraints`]: derive spacing, rank, size and edge constraints
//! 5. [`export`]: write the DOT document
//! 6. [`quality`]: optionally score the result and refine the constraints
//!
//! Every stage is a pure function of the model and the [`config::ExportConfig`];
//! the same input always yields byte-identical output.

pub mod config;
pub mod constraints;
pub mod export;
pub mod extract;
pub mod lookup;
pub mod projection;
pub mod quality;
#[cfg(feature = "graphviz")]
pub mod render;
pub mod structure;

mod error;

pub use astrolabe_core::{geometry, kind, model, text};

pub use error::AstrolabeError;

use log::{debug, info};
use serde::Serialize;

use astrolabe_core::{
    model::Model,
    text::{TextMeasure, WidthTable},
};

use config::ExportConfig;
use constraints::{ConstraintBuilder, LayoutConstraints};
use export::{Generator, dot::DotGenerator};
use extract::{Element, extract};
use lookup::LookupIndex;
use projection::{ProjectedView, Relation, ViewProjector};
use quality::{HeuristicAnalyzer, LayoutQuality, QualityAnalyzer, refine_layout};
use structure::VisibleGraph;

/// Output of one export.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportResult {
    /// The DOT document; empty when nothing is visible.
    pub dot: String,
    /// Visible elements.
    pub elements: Vec<Element>,
    /// Deduplicated relations between visible elements.
    pub relations: Vec<Relation>,
    /// Constraints the document was generated with; `None` for an empty model.
    pub constraints: Option<LayoutConstraints>,
}

impl ExportResult {
    pub fn is_empty(&self) -> bool {
        self.dot.is_empty() && self.elements.is_empty()
    }
}

/// Output of a refined export.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RefinedExport {
    pub result: ExportResult,
    pub quality: LayoutQuality,
    /// Number of refinement steps applied.
    pub iterations: usize,
}

/// Entry point for exporting C4 models to DOT.
///
/// # Examples
///
/// ```rust
/// use astrolabe::{
///     Exporter,
///     config::ExportConfig,
///     model::{BodyItem, Model, ModelElement, ModelRelation},
/// };
///
/// let model = Model::new(vec![
///     BodyItem::Element(ModelElement::new("customer", "person")),
///     BodyItem::Element(ModelElement::new("shop", "system")),
///     BodyItem::Relation(ModelRelation::new("customer", "shop").with_label("Uses")),
/// ]);
///
/// let result = Exporter::new(ExportConfig::default()).export(Some(&model));
/// assert!(result.dot.starts_with("digraph"));
/// assert_eq!(result.elements.len(), 2);
///
/// // A missing model is not an error.
/// assert!(Exporter::default().export(None).is_empty());
/// ```
pub struct Exporter<M = WidthTable> {
    config: ExportConfig,
    measure: M,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(ExportConfig::default())
    }
}

impl Exporter {
    /// Creates an exporter measuring text with the built-in width table.
    ///
    /// # Arguments
    ///
    /// * `config` - Export configuration: view level, focus, spacing and overrides
    pub fn new(config: ExportConfig) -> Self {
        Self::with_measure(config, WidthTable::new())
    }
}

impl<M: TextMeasure> Exporter<M> {
    /// Creates an exporter measuring text with `measure`.
    pub fn with_measure(config: ExportConfig, measure: M) -> Self {
        Self { config, measure }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Exports one view of `model`.
    ///
    /// A missing or empty model yields an empty result.
    pub fn export(&self, model: Option<&Model>) -> ExportResult {
        let Some(view) = self.project(model) else {
            return ExportResult::default();
        };

        let (dot, constraints) = {
            let graph = VisibleGraph::new(&view);
            let constraints = ConstraintBuilder::new(&self.config).build(&graph);
            (self.generator().generate(&graph, &constraints), constraints)
        };

        info!(
            elements = view.elements.len(),
            relations = view.relations.len(),
            bytes = dot.len();
            "Export complete"
        );
        ExportResult {
            dot,
            elements: view.elements,
            relations: view.relations,
            constraints: Some(constraints),
        }
    }

    /// Exports one view of `model`, refining the constraints with the
    /// heuristic analyzer for at most `max_iterations` steps.
    pub fn export_refined(&self, model: Option<&Model>, max_iterations: usize) -> RefinedExport {
        self.export_refined_with(model, &HeuristicAnalyzer, max_iterations)
    }

    /// Like [`export_refined`](Self::export_refined) with a custom analyzer.
    pub fn export_refined_with(
        &self,
        model: Option<&Model>,
        analyzer: &impl QualityAnalyzer,
        max_iterations: usize,
    ) -> RefinedExport {
        let Some(view) = self.project(model) else {
            return RefinedExport::default();
        };

        let constraints = ConstraintBuilder::new(&self.config).build(&VisibleGraph::new(&view));
        let outcome = refine_layout(
            analyzer,
            &self.generator(),
            &view,
            constraints,
            max_iterations,
        );

        RefinedExport {
            result: ExportResult {
                dot: outcome.dot,
                elements: view.elements,
                relations: view.relations,
                constraints: Some(outcome.constraints),
            },
            quality: outcome.quality,
            iterations: outcome.iterations,
        }
    }

    /// Runs extraction and projection; `None` for a missing or empty model.
    fn project(&self, model: Option<&Model>) -> Option<ProjectedView> {
        let model = model.filter(|model| !model.is_empty())?;
        info!(
            level = self.config.view_level().number(),
            focus = self.config.focus_node_id().unwrap_or("");
            "Exporting view"
        );

        let extraction = extract(model, &self.measure);
        let lookup = LookupIndex::new(&extraction.elements);
        debug!(entries = lookup.len(); "Lookup index built");

        let projector = ViewProjector::new(
            &lookup,
            self.config.view_level(),
            self.config.focus_node_id(),
        );
        Some(projector.project(&extraction.elements, &extraction.relations))
    }

    fn generator(&self) -> DotGenerator {
        DotGenerator::new().with_rich_labels(self.config.rich_labels())
    }
}

/// Parses a JSON model.
///
/// # Errors
///
/// Returns [`AstrolabeError::Model`] if `json` is not a valid model.
pub fn parse_model(json: &str) -> Result<Model, AstrolabeError> {
    let model = serde_json::from_str(json)?;
    Ok(model)
}
