//! Layout quality estimation and constraint refinement.
//!
//! A [`QualityAnalyzer`] scores a generated document. The shipped
//! [`HeuristicAnalyzer`] never runs a layout engine: it estimates crossings
//! and overlaps from graph density and element count, and reports fixed
//! placeholder values for rank alignment and cluster balance. A real geometry
//! analyzer can replace it without touching the refinement loop.
//!
//! [`refine`] derives adjusted constraints from a quality report, and
//! [`refine_layout`] repeats generate, measure and refine until the layout is
//! good enough or the iteration budget is spent. Refinement is an explicit,
//! optional step; a plain export never runs it.

use log::{debug, info};
use serde::Serialize;

use astrolabe_core::geometry::PIXELS_PER_INCH;

use crate::{
    constraints::{LayoutConstraints, Splines},
    export::Generator,
    extract::Element,
    projection::ProjectedView,
    structure::VisibleGraph,
};

/// Rank alignment reported by the heuristic analyzer.
const PLACEHOLDER_RANK_ALIGNMENT: f32 = 0.95;
/// Cluster balance reported by the heuristic analyzer.
const PLACEHOLDER_CLUSTER_BALANCE: f32 = 0.9;

/// Above this many elements some overlap is expected.
const OVERLAP_FREE_ELEMENTS: usize = 50;
/// Labels longer than this may collide when drawn along the edge.
const LABEL_OVERLAP_CHARS: usize = 20;

/// Scores below this call for refinement.
const ACCEPTABLE_SCORE: f32 = 0.7;
const ACCEPTABLE_CROSSINGS: u32 = 5;

/// Quality measurements of one generated layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutQuality {
    pub edge_crossings: u32,
    pub node_overlaps: u32,
    pub label_overlaps: u32,
    /// Mean edge length, in pixels.
    pub avg_edge_length: f32,
    pub edge_length_variance: f32,
    /// Share of rank groups that line up, `0.0..=1.0`.
    pub rank_alignment: f32,
    /// Evenness of cluster sizes, `0.0..=1.0`.
    pub cluster_balance: f32,
}

impl LayoutQuality {
    /// Overall score in `0.0..=1.0`; higher is better.
    pub fn score(&self) -> f32 {
        let score = 1.0
            - (self.edge_crossings as f32 * 0.05).min(0.5)
            - (self.node_overlaps as f32 * 0.2).min(0.6)
            - (self.label_overlaps as f32 * 0.1).min(0.3)
            - (0.9 - self.rank_alignment) * 0.2
            - (0.8 - self.cluster_balance) * 0.1;
        score.clamp(0.0, 1.0)
    }

    /// Returns `true` if the layout should be refined.
    pub fn needs_refinement(&self) -> bool {
        self.score() < ACCEPTABLE_SCORE
            || self.edge_crossings > ACCEPTABLE_CROSSINGS
            || self.node_overlaps > 0
    }
}

/// Measures the quality of a generated layout.
pub trait QualityAnalyzer {
    /// Analyzes `dot`, generated from `elements` under `constraints`.
    ///
    /// # Arguments
    ///
    /// * `dot` - The generated document.
    /// * `elements` - The visible elements the document was generated from.
    /// * `constraints` - The constraints the document was generated with.
    fn analyze(
        &self,
        dot: &str,
        elements: &[Element],
        constraints: &LayoutConstraints,
    ) -> LayoutQuality;
}

/// Estimates quality from counts alone, without laying anything out.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicAnalyzer;

impl QualityAnalyzer for HeuristicAnalyzer {
    fn analyze(
        &self,
        _dot: &str,
        elements: &[Element],
        constraints: &LayoutConstraints,
    ) -> LayoutQuality {
        let edges: Vec<_> = constraints
            .edges
            .iter()
            .filter(|edge| !edge.invisible)
            .collect();
        let edge_count = edges.len();
        let density = edge_count as f32 / elements.len().max(1) as f32;

        let crossing_share = if density <= 1.0 {
            0.0
        } else if density <= 1.5 {
            0.05
        } else if density <= 2.5 {
            0.10
        } else {
            0.20
        };
        let edge_crossings = (edge_count as f32 * crossing_share).ceil() as u32;

        let node_overlaps = elements
            .len()
            .checked_sub(OVERLAP_FREE_ELEMENTS)
            .filter(|excess| *excess > 0)
            .map_or(0, |excess| (excess as f32 * 0.05).ceil() as u32);

        let label_overlaps = if density > 1.5 {
            edges
                .iter()
                .filter_map(|edge| edge.label.as_ref())
                .filter(|label| label.angle == 0.0 && label.text.chars().count() > LABEL_OVERLAP_CHARS)
                .count() as u32
        } else {
            0
        };

        let rank_sep_px = constraints.global.rank_sep * PIXELS_PER_INCH;
        let lengths: Vec<f32> = edges
            .iter()
            .map(|edge| edge.min_len as f32 * rank_sep_px)
            .collect();
        let (avg_edge_length, edge_length_variance) = mean_and_variance(&lengths);

        LayoutQuality {
            edge_crossings,
            node_overlaps,
            label_overlaps,
            avg_edge_length,
            edge_length_variance,
            rank_alignment: PLACEHOLDER_RANK_ALIGNMENT,
            cluster_balance: PLACEHOLDER_CLUSTER_BALANCE,
        }
    }
}

fn mean_and_variance(samples: &[f32]) -> (f32, f32) {
    if samples.is_empty() {
        return (0.0, 0.0);
    }
    let count = samples.len() as f32;
    let mean = samples.iter().sum::<f32>() / count;
    let variance = samples
        .iter()
        .map(|sample| (sample - mean).powi(2))
        .sum::<f32>()
        / count;
    (mean, variance)
}

/// Derives adjusted constraints addressing the problems in `quality`.
///
/// `constraints` is left untouched.
pub fn refine(constraints: &LayoutConstraints, quality: &LayoutQuality) -> LayoutConstraints {
    let mut refined = constraints.clone();
    let crossings = quality.edge_crossings;

    if crossings > 0 {
        for edge in &mut refined.edges {
            if edge.weight < 10 {
                edge.weight = edge.weight.max(5);
            }
        }
        if refined.edges.len() > 2 * refined.sizes.len() {
            refined.global.splines = Splines::Ortho;
        }
    }

    if quality.node_overlaps > 0 {
        refined.global.node_sep *= 1.35;
        refined.global.rank_sep *= 1.40;
        refined.global.sep *= 1.30;
    }

    if crossings > 3 {
        refined.global.splines = Splines::Ortho;
    } else if crossings > 1 {
        refined.global.splines = Splines::Polyline;
    }

    if crossings > 1 {
        refined.global.concentrate = true;
    }

    refined
}

/// Result of [`refine_layout`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefinementOutcome {
    pub dot: String,
    pub constraints: LayoutConstraints,
    pub quality: LayoutQuality,
    /// Number of refinement steps applied.
    pub iterations: usize,
}

/// Generates, measures and refines until the layout is acceptable.
///
/// # Arguments
///
/// * `analyzer` - Measures each generated document.
/// * `generator` - Produces the document from the current constraints.
/// * `view` - The projected view being laid out.
/// * `constraints` - The starting constraints.
/// * `max_iterations` - Upper bound on refinement steps; `0` only measures.
pub fn refine_layout(
    analyzer: &impl QualityAnalyzer,
    generator: &impl Generator,
    view: &ProjectedView,
    constraints: LayoutConstraints,
    max_iterations: usize,
) -> RefinementOutcome {
    let graph = VisibleGraph::new(view);

    let mut constraints = constraints;
    let mut dot = generator.generate(&graph, &constraints);
    let mut quality = analyzer.analyze(&dot, &view.elements, &constraints);
    let mut iterations = 0;

    while iterations < max_iterations && quality.needs_refinement() {
        constraints = refine(&constraints, &quality);
        dot = generator.generate(&graph, &constraints);
        quality = analyzer.analyze(&dot, &view.elements, &constraints);
        iterations += 1;

        debug!(
            iteration = iterations,
            score = quality.score(),
            crossings = quality.edge_crossings;
            "Refinement step"
        );
    }

    info!(iterations = iterations, score = quality.score(); "Refinement finished");
    RefinementOutcome {
        dot,
        constraints,
        quality,
        iterations,
    }
}
