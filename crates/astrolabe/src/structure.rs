//! Visible graph structure.
//!
//! [`VisibleGraph`] is the graph view of a [`ProjectedView`]: visible
//! elements as nodes, projected relations as edges. On top of the plain graph
//! it tracks containment among visible elements, which decides how the
//! generator groups nodes.
//!
//! # Clusters
//!
//! Every visible element with at least one visible child is a *cluster*.
//! An element whose parent is hidden sits at the top level. Clusters nest the
//! way the elements do: a cluster holds its direct visible children, and a
//! child that is itself a cluster is emitted inside its parent's block. A
//! cluster is never drawn as a node, so edges touching it are routed to its
//! first visible leaf (see [`VisibleGraph::first_leaf`]).

use indexmap::IndexMap;

use crate::{
    extract::Element,
    projection::{ProjectedView, Relation},
};

mod graph_base;

use graph_base::GraphInternal;

/// Visible elements and relations of one view, with degree and containment
/// queries.
#[derive(Debug)]
pub struct VisibleGraph<'a> {
    graph: GraphInternal<&'a Element, &'a Relation>,
    /// Direct visible children of each cluster, in first-appearance order.
    clusters: IndexMap<&'a str, Vec<&'a Element>>,
}

impl<'a> VisibleGraph<'a> {
    /// Builds the graph for `view`.
    ///
    /// Relations whose endpoints are not visible elements are still counted in
    /// degrees, which never happens for views produced by the projector.
    pub fn new(view: &'a ProjectedView) -> Self {
        let mut graph = GraphInternal::new();
        let mut clusters: IndexMap<&'a str, Vec<&'a Element>> = IndexMap::new();

        for element in &view.elements {
            graph.add_node(element.id(), element);
        }
        for element in &view.elements {
            if let Some(parent) = element.parent_id().filter(|p| graph.contains_node(p)) {
                clusters.entry(parent).or_default().push(element);
            }
        }

        for relation in &view.relations {
            graph.add_edge(relation.from(), relation.to(), relation);
        }

        Self { graph, clusters }
    }

    pub fn element(&self, id: &str) -> Option<&'a Element> {
        self.graph.node(id)
    }

    /// Visible elements in view order.
    pub fn elements(&self) -> impl Iterator<Item = &'a Element> + '_ {
        self.graph.nodes()
    }

    pub fn elements_count(&self) -> usize {
        self.graph.nodes_count()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.graph.contains_node(id)
    }

    /// Relations in view order.
    pub fn relations(&self) -> impl Iterator<Item = &'a Relation> + '_ {
        self.graph.edges()
    }

    pub fn relations_count(&self) -> usize {
        self.graph.edges_count()
    }

    pub fn is_empty(&self) -> bool {
        self.elements_count() == 0
    }

    /// Number of relations leaving `id`.
    pub fn out_degree(&self, id: &str) -> usize {
        self.graph.out_degree(id)
    }

    /// Number of relations touching `id` in either direction.
    pub fn degree(&self, id: &str) -> usize {
        self.graph.in_degree(id) + self.graph.out_degree(id)
    }

    /// Returns `true` if `element` is drawn outside every cluster.
    pub fn is_top_level(&self, element: &Element) -> bool {
        element
            .parent_id()
            .is_none_or(|parent| !self.contains(parent))
    }

    /// Cluster ids in order of their first visible child.
    pub fn cluster_ids(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.clusters.keys().copied()
    }

    pub fn clusters_count(&self) -> usize {
        self.clusters.len()
    }

    /// Direct visible children of `cluster`.
    pub fn members(&self, cluster: &str) -> &[&'a Element] {
        self.clusters.get(cluster).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns `true` if `id` has at least one visible child.
    pub fn is_cluster(&self, id: &str) -> bool {
        self.clusters.contains_key(id)
    }

    /// The element a drawn edge attaches to in place of `id`.
    ///
    /// Plain nodes map to themselves. A cluster maps to its first direct child
    /// that is not a cluster, descending through the first child cluster when
    /// every child is one.
    pub fn first_leaf(&self, id: &str) -> Option<&'a str> {
        self.leaf_of(id, None)
    }

    /// Like [`first_leaf`](Self::first_leaf), but skips `avoid` while another
    /// leaf is available, so an edge from a cluster to one of its own members
    /// does not collapse into a loop.
    pub fn leaf_avoiding(&self, id: &str, avoid: &str) -> Option<&'a str> {
        self.leaf_of(id, Some(avoid))
    }

    fn leaf_of(&self, id: &str, avoid: Option<&str>) -> Option<&'a str> {
        let mut current = id;
        // Containment is a tree, so the depth is bounded by the cluster count.
        for _ in 0..=self.clusters.len() {
            let Some(members) = self.clusters.get(current) else {
                return self.element(current).map(Element::id);
            };

            let leaf = members
                .iter()
                .copied()
                .filter(|member| !self.is_cluster(member.id()))
                .find(|member| Some(member.id()) != avoid);
            if let Some(leaf) = leaf {
                return Some(leaf.id());
            }

            match members.iter().copied().find(|member| self.is_cluster(member.id())) {
                Some(child) => current = child.id(),
                None => return members.first().copied().map(Element::id),
            }
        }
        None
    }

    /// Returns `true` if `id` is drawn somewhere inside `cluster`.
    pub fn is_inside(&self, id: &str, cluster: &str) -> bool {
        let mut current = self.element(id).and_then(Element::parent_id);
        while let Some(parent) = current {
            if parent == cluster {
                return true;
            }
            current = self.element(parent).and_then(Element::parent_id);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use astrolabe_core::{geometry::Size, kind::ElementKind};

    use super::*;

    fn element(id: &str, kind: ElementKind, parent: Option<&str>) -> Element {
        Element::new(id, kind, Size::new(200.0, 120.0)).with_parent(parent.map(str::to_string))
    }

    fn view() -> ProjectedView {
        ProjectedView {
            elements: vec![
                element("user", ElementKind::Person, None),
                element("shop", ElementKind::System, None),
                element("shop.api", ElementKind::Container, Some("shop")),
                element("shop.api.orders", ElementKind::Component, Some("shop.api")),
                element("shop.db", ElementKind::Datastore, Some("shop")),
            ],
            relations: vec![
                Relation::new("user", "shop.api.orders", None),
                Relation::new("shop.api.orders", "shop.db", Some("Reads".into())),
                Relation::new("shop.api.orders", "user", None),
            ],
        }
    }

    #[test]
    fn test_degrees() {
        let view = view();
        let graph = VisibleGraph::new(&view);

        assert_eq!(graph.out_degree("shop.api.orders"), 2);
        assert_eq!(graph.degree("shop.api.orders"), 3);
        assert_eq!(graph.degree("user"), 2);
        assert_eq!(graph.degree("shop"), 0);
        assert_eq!(graph.relations_count(), 3);
    }

    #[test]
    fn test_clusters_in_first_appearance_order() {
        let view = view();
        let graph = VisibleGraph::new(&view);

        let clusters: Vec<&str> = graph.cluster_ids().collect();
        assert_eq!(clusters, ["shop", "shop.api"]);

        let members: Vec<&str> = graph.members("shop").iter().map(|e| e.id()).collect();
        assert_eq!(members, ["shop.api", "shop.db"]);
        assert!(graph.members("user").is_empty());
        assert!(!graph.is_cluster("shop.db"));
    }

    #[test]
    fn test_first_leaf() {
        let view = view();
        let graph = VisibleGraph::new(&view);

        assert_eq!(graph.first_leaf("user"), Some("user"));
        assert_eq!(graph.first_leaf("shop.api"), Some("shop.api.orders"));
        // shop.api is a cluster, so shop.db is the first leaf of shop.
        assert_eq!(graph.first_leaf("shop"), Some("shop.db"));
        assert_eq!(graph.first_leaf("ghost"), None);
    }

    #[test]
    fn test_first_leaf_descends_through_nested_clusters() {
        let view = ProjectedView {
            elements: vec![
                element("a", ElementKind::System, None),
                element("a.b", ElementKind::Container, Some("a")),
                element("a.b.c", ElementKind::Component, Some("a.b")),
            ],
            relations: vec![],
        };
        let graph = VisibleGraph::new(&view);
        assert_eq!(graph.first_leaf("a"), Some("a.b.c"));
    }

    #[test]
    fn test_leaf_avoiding() {
        let view = view();
        let graph = VisibleGraph::new(&view);

        assert_eq!(graph.leaf_avoiding("shop", "shop.db"), Some("shop.api.orders"));
        assert_eq!(graph.leaf_avoiding("shop", "user"), Some("shop.db"));
        // The only leaf is returned when nothing else is left.
        assert_eq!(
            graph.leaf_avoiding("shop.api", "shop.api.orders"),
            Some("shop.api.orders")
        );
    }

    #[test]
    fn test_is_inside() {
        let view = view();
        let graph = VisibleGraph::new(&view);

        assert!(graph.is_inside("shop.api.orders", "shop"));
        assert!(graph.is_inside("shop.db", "shop"));
        assert!(!graph.is_inside("user", "shop"));
        assert!(!graph.is_inside("shop", "shop"));
    }

    #[test]
    fn test_hidden_parent_is_not_a_cluster() {
        let view = ProjectedView {
            elements: vec![
                element("shop.api", ElementKind::Container, Some("shop")),
                element("shop.api.orders", ElementKind::Component, Some("shop.api")),
            ],
            relations: vec![],
        };
        let graph = VisibleGraph::new(&view);

        let clusters: Vec<&str> = graph.cluster_ids().collect();
        assert_eq!(clusters, ["shop.api"]);
        assert!(graph.is_top_level(&view.elements[0]));
        assert!(!graph.is_top_level(&view.elements[1]));
    }

    #[test]
    fn test_empty_view() {
        let view = ProjectedView::default();
        let graph = VisibleGraph::new(&view);
        assert!(graph.is_empty());
        assert_eq!(graph.cluster_ids().count(), 0);
    }
}
