//! Heuristic constraint derivation.
//!
//! [`ConstraintBuilder`] turns a [`VisibleGraph`] into [`LayoutConstraints`]
//! in four independent passes:
//!
//! - **Global**: spacing grows with the element count, context views get
//!   extra room, dense graphs switch to polyline routing.
//! - **Ranks**: one rank group per view level (people on top at the context
//!   level, storage aligned at the container level, components aligned at
//!   the component level).
//! - **Sizes**: measured size plus a small buffer, clamped to kind bounds.
//!   Hubs get larger minimum bounds; explicit overrides are taken as given.
//! - **Edges**: labeled relations pull harder than unlabeled ones, fan-out is
//!   damped, siblings are kept close, and sibling clusters are tied together
//!   with invisible edges.

use indexmap::IndexMap;
use log::debug;

use astrolabe_core::{
    geometry::px_to_inches,
    kind::{ElementKind, MAX_NODE_SIZE},
};

use super::{
    EdgeConstraint, EdgeLabel, GlobalConstraints, LayoutConstraints, RankConstraint, RankType,
    SizeConstraint, Splines,
};
use crate::{
    config::{ExportConfig, ViewLevel},
    extract::Element,
    structure::VisibleGraph,
};

// =============================================================================
// Heuristic constants
// =============================================================================

/// Spacing starts growing above this many elements.
const SPACING_SCALE_MIN_ELEMENTS: usize = 2;
/// Spacing growth per element, relative to the base spacing.
const SPACING_SCALE_STEP: f32 = 0.25 / 8.0;
const SPACING_SCALE_MAX: f32 = 2.2;
const CONTEXT_NODE_SEP_BOOST: f32 = 1.15;
const CONTEXT_RANK_SEP_BOOST: f32 = 1.20;
/// Above this many elements edges are routed as polylines.
const POLYLINE_MIN_ELEMENTS: usize = 8;
/// Above this many relations parallel edges are merged.
const CONCENTRATE_MIN_RELATIONS: usize = 6;
const DEFAULT_SEP: f32 = 0.4;

/// Degree above which an element counts as a hub.
const HUB_DEGREE: usize = 12;
const HUB_WIDTH_FACTOR: f32 = 1.2;
const HUB_HEIGHT_FACTOR: f32 = 1.1;
const SIZE_BUFFER: f32 = 1.05;

const LABELED_WEIGHT: u32 = 25;
const UNLABELED_WEIGHT: u32 = 4;
/// Out-degree above which an edge's weight is damped.
const FAN_OUT_DEGREE: usize = 4;
const SAME_PARENT_BONUS: u32 = 2;
/// Above this many elements edges span at least two ranks.
const LONG_EDGE_MIN_ELEMENTS: usize = 20;
const SIBLING_CLUSTER_WEIGHT: u32 = 1000;

const LABEL_DISTANCE: f32 = 1.5;
/// Labels longer than this are drawn perpendicular to the edge.
const LABEL_ROTATE_CHARS: usize = 30;
const LABEL_POSITION: f32 = 0.5;

// =============================================================================
// Builder
// =============================================================================

/// Derives layout constraints from a visible graph.
///
/// The builder is stateless apart from the configuration it borrows; the same
/// graph always produces the same constraints.
pub struct ConstraintBuilder<'a> {
    config: &'a ExportConfig,
}

impl<'a> ConstraintBuilder<'a> {
    pub fn new(config: &'a ExportConfig) -> Self {
        Self { config }
    }

    /// Builds every constraint for `graph`.
    pub fn build(&self, graph: &VisibleGraph<'_>) -> LayoutConstraints {
        let constraints = LayoutConstraints {
            global: self.global(graph),
            ranks: self.ranks(graph),
            sizes: self.sizes(graph),
            edges: self.edges(graph),
            view_level: self.config.view_level(),
        };

        debug!(
            ranks = constraints.ranks.len(),
            sizes = constraints.sizes.len(),
            edges = constraints.edges.len(),
            splines = constraints.global.splines.as_str();
            "Constraints built"
        );
        constraints
    }

    fn global(&self, graph: &VisibleGraph<'_>) -> GlobalConstraints {
        let elements = graph.elements_count();

        let scale = if elements > SPACING_SCALE_MIN_ELEMENTS {
            (1.0 + SPACING_SCALE_STEP * elements as f32).min(SPACING_SCALE_MAX)
        } else {
            1.0
        };

        let mut node_sep = px_to_inches(self.config.node_sep()) * scale;
        let mut rank_sep = px_to_inches(self.config.rank_sep()) * scale;
        if self.config.view_level() == ViewLevel::Context {
            node_sep *= CONTEXT_NODE_SEP_BOOST;
            rank_sep *= CONTEXT_RANK_SEP_BOOST;
        }

        let splines = if elements > POLYLINE_MIN_ELEMENTS {
            Splines::Polyline
        } else {
            Splines::Spline
        };

        GlobalConstraints {
            node_sep,
            rank_sep,
            splines,
            rank_dir: self.config.rank_dir(),
            overlap: false,
            concentrate: graph.relations_count() > CONCENTRATE_MIN_RELATIONS,
            sep: DEFAULT_SEP,
        }
    }

    fn ranks(&self, graph: &VisibleGraph<'_>) -> Vec<RankConstraint> {
        if !self.config.use_rank_constraints() {
            return Vec::new();
        }

        let level = self.config.view_level();
        let rank_type = match level {
            ViewLevel::Context => RankType::Min,
            ViewLevel::Container | ViewLevel::Component => RankType::Same,
        };

        let node_ids: Vec<String> = graph
            .elements()
            .filter(|element| in_rank_group(level, element.kind()))
            .map(|element| element.id().to_string())
            .collect();

        if node_ids.is_empty() {
            Vec::new()
        } else {
            vec![RankConstraint {
                rank_type,
                node_ids,
            }]
        }
    }

    fn sizes(&self, graph: &VisibleGraph<'_>) -> Vec<SizeConstraint> {
        graph
            .elements()
            .map(|element| self.size_for(element, graph.degree(element.id())))
            .collect()
    }

    /// Size bounds for one element with `degree` incident relations.
    fn size_for(&self, element: &Element, degree: usize) -> SizeConstraint {
        let kind = element.kind();

        if let Some(size) = self.config.node_size(element.id()) {
            let size = size.to_size().min(MAX_NODE_SIZE);
            return SizeConstraint::new(element.id(), size, size, MAX_NODE_SIZE);
        }

        let mut min = kind.min_size();
        if degree > HUB_DEGREE {
            min = min.scale_xy(HUB_WIDTH_FACTOR, HUB_HEIGHT_FACTOR);
        }

        let measured = if element.size().is_zero() {
            self.config.default_node_size()
        } else {
            element.size()
        };
        let preferred = measured.max(min).scale(SIZE_BUFFER);

        SizeConstraint::new(element.id(), min, preferred, kind.max_size())
    }

    fn edges(&self, graph: &VisibleGraph<'_>) -> Vec<EdgeConstraint> {
        let weighted = self.config.use_edge_weights();
        let min_len = if weighted && graph.elements_count() > LONG_EDGE_MIN_ELEMENTS {
            2
        } else {
            1
        };

        let mut edges: Vec<EdgeConstraint> = graph
            .relations()
            .map(|relation| {
                let weight = if weighted {
                    let mut weight = if relation.label().is_some() {
                        LABELED_WEIGHT
                    } else {
                        UNLABELED_WEIGHT
                    };
                    if graph.out_degree(relation.from()) > FAN_OUT_DEGREE {
                        weight = weight * 3 / 4;
                    }
                    if share_parent(graph, relation.from(), relation.to()) {
                        weight += SAME_PARENT_BONUS;
                    }
                    weight
                } else {
                    1
                };

                EdgeConstraint {
                    from: relation.from().to_string(),
                    to: relation.to().to_string(),
                    weight,
                    min_len,
                    ports: None,
                    label: relation.label().map(edge_label),
                    affects_layout: true,
                    invisible: false,
                }
            })
            .collect();

        if weighted {
            edges.extend(sibling_cluster_edges(graph));
        }
        edges
    }
}

/// People lead context views; storage and components share a rank below.
fn in_rank_group(level: ViewLevel, kind: ElementKind) -> bool {
    match level {
        ViewLevel::Context => kind == ElementKind::Person,
        ViewLevel::Container => kind.is_storage(),
        ViewLevel::Component => kind == ElementKind::Component,
    }
}

/// Returns `true` if both endpoints have the same visible parent.
fn share_parent(graph: &VisibleGraph<'_>, from: &str, to: &str) -> bool {
    let parent = |id: &str| graph.element(id).and_then(Element::parent_id);
    matches!((parent(from), parent(to)), (Some(a), Some(b)) if a == b)
}

fn edge_label(text: &str) -> EdgeLabel {
    let angle = if text.chars().count() > LABEL_ROTATE_CHARS {
        90.0
    } else {
        0.0
    };
    EdgeLabel {
        text: text.to_string(),
        distance: LABEL_DISTANCE,
        angle,
        position: LABEL_POSITION,
    }
}

/// Invisible edges tying sibling clusters together.
///
/// Clusters are grouped by their own parent. Each group of two or more gets a
/// single edge from its first to its last cluster; top-level clusters are left
/// alone.
fn sibling_cluster_edges(graph: &VisibleGraph<'_>) -> Vec<EdgeConstraint> {
    let mut siblings: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for cluster in graph.cluster_ids() {
        if let Some(parent) = graph.element(cluster).and_then(Element::parent_id) {
            siblings.entry(parent).or_default().push(cluster);
        }
    }

    siblings
        .values()
        .filter(|clusters| clusters.len() >= 2)
        .filter_map(|clusters| Some((clusters.first()?, clusters.last()?)))
        .map(|(first, last)| EdgeConstraint::synthetic(*first, *last, SIBLING_CLUSTER_WEIGHT))
        .collect()
}


#[cfg(test)]
mod proptest_tests {
    use astrolabe_core::geometry::Size;
    use proptest::prelude::*;

    use super::*;
    use crate::{
        config::NodeSize,
        projection::{ProjectedView, Relation},
    };

    // ===================
    // Strategies
    // ===================

    fn kind_strategy() -> impl Strategy<Value = ElementKind> {
        prop_oneof![
            Just(ElementKind::Person),
            Just(ElementKind::System),
            Just(ElementKind::Container),
            Just(ElementKind::Component),
            Just(ElementKind::Datastore),
            Just(ElementKind::Queue),
        ]
    }

    fn measured_strategy() -> impl Strategy<Value = Size> {
        (0.0f32..1200.0, 0.0f32..900.0).prop_map(|(w, h)| Size::new(w, h))
    }

    fn override_strategy() -> impl Strategy<Value = Option<NodeSize>> {
        prop::option::of((1.0f32..1500.0, 1.0f32..1500.0).prop_map(|(w, h)| NodeSize::new(w, h)))
    }

    /// A view of `n` systems with relations given as index pairs.
    fn view_strategy() -> impl Strategy<Value = ProjectedView> {
        (1usize..25)
            .prop_flat_map(|n| (Just(n), prop::collection::vec((0..n, 0..n, any::<bool>()), 0..60)))
            .prop_map(|(n, pairs)| ProjectedView {
                elements: (0..n)
                    .map(|idx| {
                        Element::new(format!("e{idx}"), ElementKind::System, Size::new(210.0, 150.0))
                    })
                    .collect(),
                relations: pairs
                    .into_iter()
                    .filter(|(from, to, _)| from != to)
                    .map(|(from, to, labeled)| {
                        Relation::new(
                            format!("e{from}"),
                            format!("e{to}"),
                            labeled.then(|| "Uses".to_string()),
                        )
                    })
                    .collect(),
            })
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Every size constraint keeps `min <= preferred <= max` within the global maximum.
    fn check_size_bounds(
        kind: ElementKind,
        measured: Size,
        degree: usize,
        node_size: Option<NodeSize>,
    ) -> Result<(), TestCaseError> {
        let mut config = ExportConfig::default();
        if let Some(node_size) = node_size {
            config = config.with_node_size("n", node_size);
        }
        let element = Element::new("n", kind, measured);
        let size = ConstraintBuilder::new(&config).size_for(&element, degree);

        prop_assert!(size.min_width <= size.preferred_width);
        prop_assert!(size.preferred_width <= size.max_width);
        prop_assert!(size.max_width <= 500.0);
        prop_assert!(size.min_height <= size.preferred_height);
        prop_assert!(size.preferred_height <= size.max_height);
        prop_assert!(size.max_height <= 300.0);
        Ok(())
    }

    /// Crossing the hub threshold strictly grows the minimum bounds.
    fn check_hub_monotonicity(kind: ElementKind, measured: Size) -> Result<(), TestCaseError> {
        let config = ExportConfig::default();
        let builder = ConstraintBuilder::new(&config);
        let element = Element::new("n", kind, measured);

        let regular = builder.size_for(&element, 12);
        let hub = builder.size_for(&element, 13);
        prop_assert!(hub.min_width > regular.min_width);
        prop_assert!(hub.min_height > regular.min_height);
        Ok(())
    }

    /// Building twice from the same graph yields identical constraints.
    fn check_build_is_pure(view: ProjectedView, level: i64) -> Result<(), TestCaseError> {
        let config = ExportConfig::default().with_view_level(level);
        let graph = VisibleGraph::new(&view);
        let builder = ConstraintBuilder::new(&config);

        prop_assert_eq!(builder.build(&graph), builder.build(&graph));
        Ok(())
    }

    /// Edge weights are always positive and one edge is derived per relation.
    fn check_edges_follow_relations(view: ProjectedView) -> Result<(), TestCaseError> {
        let config = ExportConfig::default();
        let graph = VisibleGraph::new(&view);
        let edges = ConstraintBuilder::new(&config).build(&graph).edges;

        prop_assert_eq!(edges.len(), view.relations.len());
        prop_assert!(edges.iter().all(|edge| edge.weight > 0 && edge.min_len >= 1));
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn size_bounds(
            kind in kind_strategy(),
            measured in measured_strategy(),
            degree in 0usize..40,
            node_size in override_strategy(),
        ) {
            check_size_bounds(kind, measured, degree, node_size)?;
        }

        #[test]
        fn hub_monotonicity(kind in kind_strategy(), measured in measured_strategy()) {
            check_hub_monotonicity(kind, measured)?;
        }

        #[test]
        fn build_is_pure(view in view_strategy(), level in -2i64..6) {
            check_build_is_pure(view, level)?;
        }

        #[test]
        fn edges_follow_relations(view in view_strategy()) {
            check_edges_follow_relations(view)?;
        }
    }
}
