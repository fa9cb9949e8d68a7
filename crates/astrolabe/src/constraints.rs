//! Layout constraints.
//!
//! [`LayoutConstraints`] is the engine's description of how a view should be
//! laid out, independent of the text format that finally carries it. The
//! [`ConstraintBuilder`] derives it from a [`VisibleGraph`], and the quality
//! refiner produces adjusted copies of it.
//!
//! # Units
//!
//! Global spacing is expressed in inches, the unit Graphviz expects for
//! `nodesep`/`ranksep`. Node sizes stay in pixels until the generator writes
//! them out.
//!
//! [`VisibleGraph`]: crate::structure::VisibleGraph

use std::fmt;

use serde::Serialize;

use astrolabe_core::geometry::Size;

use crate::config::{RankDir, ViewLevel};

mod builder;

pub use builder::ConstraintBuilder;

/// Edge routing style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Splines {
    #[default]
    Spline,
    Polyline,
    Ortho,
}

impl Splines {
    /// The Graphviz `splines` value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spline => "spline",
            Self::Polyline => "polyline",
            Self::Ortho => "ortho",
        }
    }
}

impl fmt::Display for Splines {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Graph-wide layout settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalConstraints {
    /// Separation between nodes of one rank, in inches.
    pub node_sep: f32,
    /// Separation between ranks, in inches.
    pub rank_sep: f32,
    pub splines: Splines,
    pub rank_dir: RankDir,
    /// Whether nodes may overlap.
    pub overlap: bool,
    /// Whether parallel edges are merged.
    pub concentrate: bool,
    /// Margin kept around nodes while routing, in inches.
    pub sep: f32,
}

/// How a rank group is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RankType {
    /// On the first rank.
    Min,
    /// On the last rank.
    Max,
    /// All on one rank.
    Same,
}

impl RankType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
            Self::Same => "same",
        }
    }
}

/// A group of nodes sharing a rank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankConstraint {
    pub rank_type: RankType,
    pub node_ids: Vec<String>,
}

/// Size bounds of one node, in pixels.
///
/// Bounds always satisfy `min <= preferred <= max` in both dimensions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeConstraint {
    pub node_id: String,
    pub min_width: f32,
    pub max_width: f32,
    pub min_height: f32,
    pub max_height: f32,
    pub preferred_width: f32,
    pub preferred_height: f32,
}

impl SizeConstraint {
    /// Creates a constraint, clamping `preferred` into `[min, max]`.
    pub fn new(node_id: impl Into<String>, min: Size, preferred: Size, max: Size) -> Self {
        let max = max.max(min);
        let preferred = preferred.clamp(min, max);
        Self {
            node_id: node_id.into(),
            min_width: min.width(),
            max_width: max.width(),
            min_height: min.height(),
            max_height: max.height(),
            preferred_width: preferred.width(),
            preferred_height: preferred.height(),
        }
    }

    pub fn min_size(&self) -> Size {
        Size::new(self.min_width, self.min_height)
    }

    pub fn preferred_size(&self) -> Size {
        Size::new(self.preferred_width, self.preferred_height)
    }

    pub fn max_size(&self) -> Size {
        Size::new(self.max_width, self.max_height)
    }
}

/// Compass ports an edge attaches to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ports {
    pub tail: Option<String>,
    pub head: Option<String>,
}

/// Placement of an edge label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeLabel {
    pub text: String,
    /// Distance from the edge, in inches.
    pub distance: f32,
    /// Rotation in degrees.
    pub angle: f32,
    /// Position along the edge, `0.5` being the middle.
    pub position: f32,
}

/// Layout hints for one edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeConstraint {
    pub from: String,
    pub to: String,
    pub weight: u32,
    pub min_len: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<Ports>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<EdgeLabel>,
    /// `false` keeps the edge out of rank assignment.
    pub affects_layout: bool,
    /// Synthetic edges are laid out but never drawn.
    pub invisible: bool,
}

impl EdgeConstraint {
    /// An invisible edge that only pulls its endpoints together.
    pub fn synthetic(from: impl Into<String>, to: impl Into<String>, weight: u32) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            weight,
            min_len: 1,
            ports: None,
            label: None,
            affects_layout: true,
            invisible: true,
        }
    }
}

/// Every constraint derived for one view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutConstraints {
    pub global: GlobalConstraints,
    pub ranks: Vec<RankConstraint>,
    pub sizes: Vec<SizeConstraint>,
    pub edges: Vec<EdgeConstraint>,
    pub view_level: ViewLevel,
}

impl LayoutConstraints {
    /// The size constraint of `node_id`, if one was derived.
    pub fn size_of(&self, node_id: &str) -> Option<&SizeConstraint> {
        self.sizes.iter().find(|size| size.node_id == node_id)
    }
}
