//! Low-level graph data structures and primitives.
//!
//! This module provides the graph storage behind [`VisibleGraph`]. It is a
//! lightweight directed multigraph keyed by fully-qualified names, tuned for
//! the questions the constraint builder asks: degrees and stable iteration
//! order.
//!
//! # Architecture
//!
//! The module provides:
//! - [`GraphInternal`]: Core graph implementation with nodes and edges
//!
//! Capabilities:
//! - Node storage via `IndexMap` (insertion order is iteration order) and edge storage via `Vec`
//! - Tracking of both incoming and outgoing edges per node
//! - Degree queries counting self-loops and parallel edges individually
//!
//! This is an internal module; its types are not exposed publicly.
//!
//! [`VisibleGraph`]: super::VisibleGraph

use indexmap::IndexMap;

// =============================================================================
// Core internal graph structure
// =============================================================================

/// Core graph data structure.
///
/// The graph is directed and allows self-loops and multiple edges between
/// nodes. Node iteration follows insertion order so that every consumer sees
/// the same deterministic sequence.
///
/// Type parameters:
/// - `N`: Node data type
/// - `E`: Edge data type
#[derive(Debug)]
pub(super) struct GraphInternal<N, E> {
    nodes: IndexMap<String, N>,
    edges: Vec<E>,
    income_edges: IndexMap<String, Vec<usize>>,
    outgoing_edges: IndexMap<String, Vec<usize>>,
}

impl<N, E> GraphInternal<N, E>
where
    N: Copy,
    E: Copy,
{
    /// Creates a new empty graph.
    pub(super) fn new() -> Self {
        GraphInternal {
            nodes: IndexMap::new(),
            edges: Vec::new(),
            income_edges: IndexMap::new(),
            outgoing_edges: IndexMap::new(),
        }
    }

    /// Returns the node data for the given ID, if it exists.
    pub(super) fn node(&self, id: &str) -> Option<N> {
        self.nodes.get(id).copied()
    }

    /// Returns an iterator over all node data in insertion order.
    pub(super) fn nodes(&self) -> impl Iterator<Item = N> + '_ {
        self.nodes.values().copied()
    }

    /// Returns the total number of nodes in the graph.
    pub(super) fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    /// Checks if a node with the given ID exists in the graph.
    pub(super) fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Returns an iterator over all edge data in insertion order.
    pub(super) fn edges(&self) -> impl Iterator<Item = E> + '_ {
        self.edges.iter().copied()
    }

    /// Returns the total number of edges in the graph.
    pub(super) fn edges_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of edges leaving `id`.
    pub(super) fn out_degree(&self, id: &str) -> usize {
        self.outgoing_edges.get(id).map_or(0, Vec::len)
    }

    /// Number of edges entering `id`.
    pub(super) fn in_degree(&self, id: &str) -> usize {
        self.income_edges.get(id).map_or(0, Vec::len)
    }

    /// Adds a node to the graph with the given ID and data.
    ///
    /// If a node with the same ID already exists, its data is replaced and it
    /// keeps its original position.
    pub(super) fn add_node(&mut self, id: impl Into<String>, node: N) {
        self.nodes.insert(id.into(), node);
    }

    /// Adds a directed edge to the graph between two nodes.
    ///
    /// Updates both the edge storage and the incoming/outgoing edge indices.
    /// Endpoints are not required to be nodes of the graph; degree queries
    /// count such edges all the same.
    pub(super) fn add_edge(&mut self, source_id: &str, target_id: &str, edge: E) {
        self.edges.push(edge);

        let idx = self.edges.len() - 1;
        self.outgoing_edges
            .entry(source_id.to_string())
            .or_default()
            .push(idx);
        self.income_edges
            .entry(target_id.to_string())
            .or_default()
            .push(idx);
    }
}
