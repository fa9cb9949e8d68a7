//! Graphviz DOT backend.
//!
//! [`DotGenerator`] writes one `digraph` per view. Statements appear in a fixed
//! order so identical input always produces identical text:
//!
//! 1. Graph header: direction, spacing, routing flags and styling
//! 2. Default node and edge attributes
//! 3. Top-level nodes
//! 4. One `cluster_<id>` subgraph per top-level cluster, holding its leaf
//!    members and, nested inside, the subgraphs of its child clusters
//! 5. Rank groups, tied in order by invisible edges when there are several
//! 6. Edges
//!
//! Clusters are never drawn as nodes. An edge touching one attaches to a leaf
//! inside it and clips at the cluster border through `lhead`/`ltail`, which is
//! why the header always sets `compound=true`. An edge whose endpoints attach
//! to the same leaf is left out of the document.

use std::fmt::{self, Write};

use indexmap::IndexSet;

use astrolabe_core::geometry::{Size, px_to_inches};

use super::Generator;
use crate::{
    constraints::{EdgeConstraint, LayoutConstraints, RankConstraint},
    extract::Element,
    structure::VisibleGraph,
};

const FONT_NAME: &str = "Helvetica";
const NODE_MARGIN: &str = "0.15,0.08";
const RANK_ORDER_WEIGHT: u32 = 1000;

/// Escapes `text` for use inside a double-quoted DOT string.
///
/// Backslashes and double quotes are escaped and newlines become the DOT
/// `\n` line break.
pub fn escape_label(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Escapes `text` for use inside an HTML-like DOT label.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Generates Graphviz DOT text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotGenerator {
    rich_labels: bool,
}

impl DotGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches node labels to the HTML table form.
    pub fn with_rich_labels(mut self, rich_labels: bool) -> Self {
        self.rich_labels = rich_labels;
        self
    }
}

impl Generator for DotGenerator {
    fn generate(&self, graph: &VisibleGraph<'_>, constraints: &LayoutConstraints) -> String {
        if graph.is_empty() {
            return String::new();
        }

        DotDocument {
            generator: self,
            graph,
            constraints,
        }
        .to_string()
    }
}

/// One DOT document, written through [`fmt::Display`].
struct DotDocument<'g, 'a> {
    generator: &'g DotGenerator,
    graph: &'g VisibleGraph<'a>,
    constraints: &'g LayoutConstraints,
}

impl fmt::Display for DotDocument<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "digraph C4 {{")?;
        self.write_header(f)?;
        self.write_defaults(f)?;

        for element in self.graph.elements() {
            if self.graph.is_top_level(element) && !self.graph.is_cluster(element.id()) {
                self.write_node(f, element, "  ")?;
            }
        }

        for cluster in self.graph.cluster_ids() {
            if self
                .graph
                .element(cluster)
                .is_some_and(|element| self.graph.is_top_level(element))
            {
                self.write_cluster(f, cluster, 1)?;
            }
        }

        self.write_ranks(f, &self.constraints.ranks)?;

        for edge in &self.constraints.edges {
            self.write_edge(f, edge)?;
        }

        writeln!(f, "}}")
    }
}

impl DotDocument<'_, '_> {
    fn write_header(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let global = &self.constraints.global;
        writeln!(f, "  rankdir={};", global.rank_dir)?;
        writeln!(f, "  nodesep={:.2};", global.node_sep)?;
        writeln!(f, "  ranksep={:.2};", global.rank_sep)?;
        writeln!(f, "  overlap={};", global.overlap)?;
        writeln!(f, "  splines={};", global.splines)?;
        writeln!(f, "  sep={:.2};", global.sep)?;
        writeln!(f, "  concentrate={};", global.concentrate)?;
        writeln!(f, "  compound=true;")?;
        writeln!(f, "  newrank=true;")?;
        writeln!(f, "  fontname=\"{FONT_NAME}\";")?;
        writeln!(f, "  fontsize=14;")?;
        writeln!(f, "  labeljust=l;")?;
        writeln!(f, "  bgcolor=\"white\";")
    }

    fn write_defaults(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  node [shape=box, style=\"rounded,filled\", fillcolor=\"#f5f7fa\", \
             color=\"#4a5568\", fontname=\"{FONT_NAME}\", fontsize=12];"
        )?;
        writeln!(
            f,
            "  edge [color=\"#4a5568\", fontname=\"{FONT_NAME}\", fontsize=10, arrowsize=0.8];"
        )
    }

    fn write_node(&self, f: &mut fmt::Formatter<'_>, element: &Element, indent: &str) -> fmt::Result {
        let size = self
            .constraints
            .size_of(element.id())
            .map_or_else(|| element.size(), |size| size.preferred_size());

        write!(
            f,
            "{indent}\"{}\" [label={}, ",
            escape_label(element.id()),
            self.node_label(element)
        )?;
        write_dimensions(f, size)?;
        write!(f, ", margin=\"{NODE_MARGIN}\"")?;
        if let Some(parent) = element.parent_id() {
            write!(f, ", group=\"{}\"", escape_label(parent))?;
        }
        writeln!(f, "];")
    }

    fn node_label(&self, element: &Element) -> String {
        if self.generator.rich_labels {
            let mut label = String::from(
                "<<TABLE BORDER=\"0\" CELLBORDER=\"0\" CELLSPACING=\"2\">",
            );
            let _ = write!(
                label,
                "<TR><TD><B>{}</B></TD></TR>\
                 <TR><TD><FONT POINT-SIZE=\"10\">&laquo;{}&raquo;</FONT></TD></TR>",
                escape_html(element.title()),
                element.kind()
            );
            if let Some(technology) = element.technology() {
                let _ = write!(
                    label,
                    "<TR><TD><FONT POINT-SIZE=\"10\">[{}]</FONT></TD></TR>",
                    escape_html(technology)
                );
            }
            label.push_str("</TABLE>>");
            label
        } else {
            let text = match element.technology() {
                Some(technology) => format!("{}\n[{technology}]", element.title()),
                None => element.title().to_string(),
            };
            format!("\"{}\"", escape_label(&text))
        }
    }

    fn write_cluster(&self, f: &mut fmt::Formatter<'_>, cluster: &str, depth: usize) -> fmt::Result {
        let label = self
            .graph
            .element(cluster)
            .map_or(cluster, Element::title);
        let indent = "  ".repeat(depth);
        let inner = "  ".repeat(depth + 1);

        writeln!(f, "{indent}subgraph \"cluster_{}\" {{", escape_label(cluster))?;
        writeln!(f, "{inner}label=\"{}\";", escape_label(label))?;
        writeln!(f, "{inner}style=\"rounded,dashed\";")?;
        writeln!(f, "{inner}color=\"#718096\";")?;

        let members = self.graph.members(cluster);
        for member in members {
            if !self.graph.is_cluster(member.id()) {
                self.write_node(f, member, &inner)?;
            }
        }
        // Containment is a tree, so nesting never runs deeper than the
        // cluster count.
        if depth <= self.graph.clusters_count() {
            for member in members {
                if self.graph.is_cluster(member.id()) {
                    self.write_cluster(f, member.id(), depth + 1)?;
                }
            }
        }
        writeln!(f, "{indent}}}")
    }

    fn write_ranks(&self, f: &mut fmt::Formatter<'_>, ranks: &[RankConstraint]) -> fmt::Result {
        let mut groups: Vec<Vec<&str>> = Vec::with_capacity(ranks.len());

        for rank in ranks {
            let nodes: IndexSet<&str> = rank
                .node_ids
                .iter()
                .filter_map(|id| self.graph.first_leaf(id))
                .collect();
            if nodes.is_empty() {
                continue;
            }

            write!(f, "  {{ rank={};", rank.rank_type.as_str())?;
            for node in &nodes {
                write!(f, " \"{}\";", escape_label(node))?;
            }
            writeln!(f, " }}")?;
            groups.push(nodes.into_iter().collect());
        }

        // Consecutive groups keep their order through invisible edges between
        // their first and last nodes.
        for pair in groups.windows(2) {
            let (upper, lower) = (&pair[0], &pair[1]);
            let mut links: IndexSet<(&str, &str)> = IndexSet::new();
            if let (Some(a), Some(b)) = (upper.first(), lower.first()) {
                links.insert((*a, *b));
            }
            if let (Some(a), Some(b)) = (upper.last(), lower.last()) {
                links.insert((*a, *b));
            }
            for (from, to) in links {
                writeln!(
                    f,
                    "  \"{}\" -> \"{}\" [style=invis, weight={RANK_ORDER_WEIGHT}];",
                    escape_label(from),
                    escape_label(to)
                )?;
            }
        }
        Ok(())
    }

    fn write_edge(&self, f: &mut fmt::Formatter<'_>, edge: &EdgeConstraint) -> fmt::Result {
        let graph = self.graph;
        let tail = graph.leaf_avoiding(&edge.from, &edge.to).unwrap_or(&edge.from);
        let head = graph.leaf_avoiding(&edge.to, tail).unwrap_or(&edge.to);
        // A cluster and its only leaf meet in the same node.
        if tail == head {
            return Ok(());
        }

        let mut attrs: Vec<String> = Vec::new();
        if let Some(ports) = &edge.ports {
            if let Some(port) = &ports.tail {
                attrs.push(format!("tailport={port}"));
            }
            if let Some(port) = &ports.head {
                attrs.push(format!("headport={port}"));
            }
        }
        if let Some(label) = &edge.label {
            attrs.push(format!("label=\"{}\"", escape_label(&label.text)));
            attrs.push(format!("labeldistance={:.1}", label.distance));
            attrs.push(format!("labelangle={}", label.angle));
            attrs.push("labelfloat=false".to_string());
        }
        attrs.push(format!("weight={}", edge.weight));
        attrs.push(format!("minlen={}", edge.min_len));
        if !edge.affects_layout {
            attrs.push("constraint=false".to_string());
        }
        if edge.invisible {
            attrs.push("style=invis".to_string());
        }
        if graph.is_cluster(&edge.from)
            && graph.is_inside(tail, &edge.from)
            && !graph.is_inside(head, &edge.from)
        {
            attrs.push(format!("ltail=\"cluster_{}\"", escape_label(&edge.from)));
        }
        if graph.is_cluster(&edge.to)
            && graph.is_inside(head, &edge.to)
            && !graph.is_inside(tail, &edge.to)
        {
            attrs.push(format!("lhead=\"cluster_{}\"", escape_label(&edge.to)));
        }

        writeln!(
            f,
            "  \"{}\" -> \"{}\" [{}];",
            escape_label(tail),
            escape_label(head),
            attrs.join(", ")
        )
    }
}

fn write_dimensions(f: &mut fmt::Formatter<'_>, size: Size) -> fmt::Result {
    write!(
        f,
        "width={:.2}, height={:.2}",
        px_to_inches(size.width()),
        px_to_inches(size.height())
    )
}
