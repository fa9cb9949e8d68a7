//! Configuration types for Astrolabe exports.
//!
//! [`ExportConfig`] carries every knob the layout-constraint engine honors.
//! It implements [`serde::Deserialize`] with defaults for every field so a
//! configuration file only needs to name what it changes.
//!
//! # Overview
//!
//! - [`ExportConfig`] - Spacing, direction, view level, focus and size overrides
//! - [`RankDir`] - Graph flow direction
//! - [`ViewLevel`] - C4 abstraction tier, derived from the raw configured level
//! - [`NodeSize`] - Explicit per-element size override
//!
//! # Example
//!
//! ```
//! # use astrolabe::config::{ExportConfig, RankDir, ViewLevel};
//! let config = ExportConfig::default()
//!     .with_view_level(2)
//!     .with_rank_dir(RankDir::LeftRight);
//! assert_eq!(config.view_level(), ViewLevel::Container);
//!
//! // Levels outside 1..=3 are not rejected; they behave as the context level.
//! assert_eq!(ExportConfig::default().with_view_level(9).view_level(), ViewLevel::Context);
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use astrolabe_core::geometry::Size;

/// Direction in which ranks flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankDir {
    #[default]
    #[serde(rename = "TB")]
    TopBottom,
    #[serde(rename = "LR")]
    LeftRight,
}

impl RankDir {
    /// The Graphviz `rankdir` value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TopBottom => "TB",
            Self::LeftRight => "LR",
        }
    }
}

impl fmt::Display for RankDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// C4 abstraction tier of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewLevel {
    /// Level 1: people and software systems.
    Context,
    /// Level 2: containers, datastores and queues inside systems.
    Container,
    /// Level 3: components inside containers.
    Component,
}

impl ViewLevel {
    /// Maps a raw configured level onto a view level.
    ///
    /// `2` and `3` select the container and component levels; every other
    /// value, `0` included, selects the context level.
    pub fn from_raw(level: i64) -> Self {
        match level {
            2 => Self::Container,
            3 => Self::Component,
            _ => Self::Context,
        }
    }

    /// The numeric level (1, 2 or 3).
    pub fn number(self) -> u8 {
        match self {
            Self::Context => 1,
            Self::Container => 2,
            Self::Component => 3,
        }
    }
}

/// Explicit size override for one element, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeSize {
    pub width: f32,
    pub height: f32,
}

impl NodeSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn to_size(self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Configuration of a single export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Flow direction of ranks.
    rank_dir: RankDir,

    /// Base separation between nodes of one rank, in pixels.
    node_sep: f32,

    /// Base separation between ranks, in pixels.
    rank_sep: f32,

    /// Fallback node width, in pixels.
    default_node_width: f32,

    /// Fallback node height, in pixels.
    default_node_height: f32,

    /// Emit rank constraints.
    use_rank_constraints: bool,

    /// Tune edge weights and lengths; when off every edge has weight 1.
    use_edge_weights: bool,

    /// Raw view level; see [`ViewLevel::from_raw`].
    view_level: i64,

    /// Fully-qualified name of the element the view zooms into.
    focus_node_id: Option<String>,

    /// Per-element size overrides keyed by fully-qualified name.
    node_sizes: IndexMap<String, NodeSize>,

    /// Render node labels as HTML tables instead of plain text.
    rich_labels: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            rank_dir: RankDir::TopBottom,
            node_sep: 80.0,
            rank_sep: 100.0,
            default_node_width: 200.0,
            default_node_height: 120.0,
            use_rank_constraints: true,
            use_edge_weights: true,
            view_level: 1,
            focus_node_id: None,
            node_sizes: IndexMap::new(),
            rich_labels: false,
        }
    }
}

impl ExportConfig {
    pub fn rank_dir(&self) -> RankDir {
        self.rank_dir
    }

    pub fn node_sep(&self) -> f32 {
        self.node_sep
    }

    pub fn rank_sep(&self) -> f32 {
        self.rank_sep
    }

    /// Fallback node size for elements with no measured size.
    pub fn default_node_size(&self) -> Size {
        Size::new(self.default_node_width, self.default_node_height)
    }

    pub fn use_rank_constraints(&self) -> bool {
        self.use_rank_constraints
    }

    pub fn use_edge_weights(&self) -> bool {
        self.use_edge_weights
    }

    /// The effective view level.
    pub fn view_level(&self) -> ViewLevel {
        ViewLevel::from_raw(self.view_level)
    }

    /// The configured level exactly as given.
    pub fn raw_view_level(&self) -> i64 {
        self.view_level
    }

    /// The focus element, ignoring an empty string.
    pub fn focus_node_id(&self) -> Option<&str> {
        self.focus_node_id.as_deref().filter(|id| !id.is_empty())
    }

    /// The size override for `id`, if one is configured.
    pub fn node_size(&self, id: &str) -> Option<NodeSize> {
        self.node_sizes.get(id).copied()
    }

    pub fn rich_labels(&self) -> bool {
        self.rich_labels
    }

    pub fn with_rank_dir(mut self, rank_dir: RankDir) -> Self {
        self.rank_dir = rank_dir;
        self
    }

    /// Sets node and rank separation in pixels.
    pub fn with_spacing(mut self, node_sep: f32, rank_sep: f32) -> Self {
        self.node_sep = node_sep;
        self.rank_sep = rank_sep;
        self
    }

    pub fn with_default_node_size(mut self, width: f32, height: f32) -> Self {
        self.default_node_width = width;
        self.default_node_height = height;
        self
    }

    pub fn with_rank_constraints(mut self, enabled: bool) -> Self {
        self.use_rank_constraints = enabled;
        self
    }

    pub fn with_edge_weights(mut self, enabled: bool) -> Self {
        self.use_edge_weights = enabled;
        self
    }

    pub fn with_view_level(mut self, level: i64) -> Self {
        self.view_level = level;
        self
    }

    pub fn with_focus(mut self, focus: Option<impl Into<String>>) -> Self {
        self.focus_node_id = focus.map(Into::into);
        self
    }

    pub fn with_node_size(mut self, id: impl Into<String>, size: NodeSize) -> Self {
        self.node_sizes.insert(id.into(), size);
        self
    }

    pub fn with_rich_labels(mut self, enabled: bool) -> Self {
        self.rich_labels = enabled;
        self
    }
}
