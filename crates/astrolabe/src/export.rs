//! Graph-text export.
//!
//! This module defines the [`Generator`] trait for turning a visible graph and
//! its constraints into a graph-description document. It is the last step of
//! a single-shot export.
//!
//! # Pipeline Position
//!
//! ```text
//! Model
//!     ↓ extract
//! Elements + relation statements
//!     ↓ project
//! Visible graph
//!     ↓ build
//! Layout constraints
//!     ↓ generate (this module)
//! DOT text
//! ```
//!
//! # Available Backends
//!
//! - [`dot`]: Graphviz DOT via [`dot::DotGenerator`]

pub mod dot;

use crate::{constraints::LayoutConstraints, structure::VisibleGraph};

/// Abstraction for graph-text backends.
///
/// Generation never fails; an empty graph produces an empty document.
pub trait Generator {
    /// Renders `graph` laid out according to `constraints`.
    ///
    /// # Arguments
    ///
    /// * `graph` - The visible elements and relations of one view.
    /// * `constraints` - Constraints derived for the same graph.
    fn generate(&self, graph: &VisibleGraph<'_>, constraints: &LayoutConstraints) -> String;
}
