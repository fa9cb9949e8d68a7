//! Integration tests for the Exporter facade
//!
//! These tests drive whole exports through the public API and check the DOT
//! text and intermediates that come out.

use astrolabe::{
    AstrolabeError, Exporter,
    config::{ExportConfig, NodeSize},
    export::dot::escape_label,
    kind::ElementKind,
    model::{BodyItem, Model, ModelElement, ModelRelation},
    parse_model,
};

fn exporter(level: i64, focus: Option<&str>) -> Exporter {
    let config = ExportConfig::default()
        .with_view_level(level)
        .with_focus(focus);
    Exporter::new(config)
}

fn person_uses_system() -> Model {
    Model::new(vec![
        BodyItem::Element(ModelElement::new("customer", "person").with_title("Customer")),
        BodyItem::Element(ModelElement::new("shop", "system").with_title("Shop")),
        BodyItem::Relation(ModelRelation::new("customer", "shop").with_label("Uses")),
    ])
}

/// System > Container > Component, with a person talking to the component.
fn nested_model() -> Model {
    Model::new(vec![
        BodyItem::Element(ModelElement::new("user", "person")),
        BodyItem::Element(
            ModelElement::new("shop", "system").with_child(
                ModelElement::new("api", "container")
                    .with_technology("Rust")
                    .with_child(ModelElement::new("orders", "component")),
            ),
        ),
        BodyItem::Relation(ModelRelation::new("user", "shop.api.orders").with_label("Orders")),
    ])
}

/// Two systems with internals and relations crossing between them.
fn landscape() -> Model {
    Model::new(vec![
        BodyItem::Element(ModelElement::new("customer", "person")),
        BodyItem::Element(ModelElement::new("clerk", "actor")),
        BodyItem::Element(
            ModelElement::new("shop", "system")
                .with_child(ModelElement::new("web", "container"))
                .with_child(
                    ModelElement::new("api", "container")
                        .with_child(ModelElement::new("orders", "component"))
                        .with_child(ModelElement::new("billing", "component"))
                        .with_relation(ModelRelation::new("orders", "billing")),
                )
                .with_child(ModelElement::new("db", "database"))
                .with_relation(ModelRelation::new("web", "api").with_label("Calls"))
                .with_relation(ModelRelation::new("api", "db")),
        ),
        BodyItem::Element(
            ModelElement::new("bank", "system")
                .with_child(ModelElement::new("gateway", "container"))
                .with_child(ModelElement::new("ledger", "db")),
        ),
        BodyItem::Relation(ModelRelation::new("customer", "shop.web").with_label("Browses")),
        BodyItem::Relation(ModelRelation::new("clerk", "shop").with_label("Manages")),
        BodyItem::Relation(
            ModelRelation::new("shop.api.billing", "bank.gateway").with_label("Charges"),
        ),
        BodyItem::Relation(ModelRelation::new("bank.gateway", "bank.ledger")),
    ])
}

fn edge_weight(line: &str) -> Option<u32> {
    let start = line.find("weight=")? + "weight=".len();
    let digits: String = line[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

#[test]
fn test_context_view_person_uses_system() {
    let result = exporter(1, None).export(Some(&person_uses_system()));

    assert!(result.dot.starts_with("digraph C4 {\n"));
    assert!(result.dot.ends_with("}\n"));
    assert_eq!(result.dot.matches("\n}\n").count(), 1);

    assert!(result.dot.contains("  \"customer\" [label=\"Customer\""));
    assert!(result.dot.contains("  \"shop\" [label=\"Shop\""));

    let edge = result
        .dot
        .lines()
        .find(|line| line.trim_start().starts_with("\"customer\" -> \"shop\""))
        .expect("edge customer -> shop");
    assert!(edge.contains("label=\"Uses\""), "{edge}");
    assert!(edge_weight(edge).is_some_and(|weight| weight > 0), "{edge}");

    assert_eq!(result.elements.len(), 2);
    assert_eq!(result.relations.len(), 1);
    assert!(result.constraints.is_some());
}

#[test]
fn test_container_view_clusters_containers() {
    let result = exporter(2, None).export(Some(&nested_model()));

    assert!(result.dot.contains("subgraph \"cluster_shop\" {"));
    assert!(result.dot.contains("    \"shop.api\" [label="));
    assert!(!result.dot.contains("shop.api.orders"));
    // The hidden component aggregates into its system, which is drawn as a
    // cluster, so the edge clips at the cluster border.
    assert_eq!(result.relations[0].to(), "shop");
    let edge = result
        .dot
        .lines()
        .find(|line| line.trim_start().starts_with("\"user\" -> \"shop.api\""))
        .expect("edge into the shop cluster");
    assert!(edge.contains("lhead=\"cluster_shop\""), "{edge}");
}

#[test]
fn test_component_view_focused_on_container() {
    let result = exporter(3, Some("shop.api")).export(Some(&nested_model()));

    let ids: Vec<&str> = result.elements.iter().map(|e| e.id()).collect();
    assert_eq!(ids, ["shop.api", "shop.api.orders", "user"]);

    assert!(result.dot.contains("subgraph \"cluster_shop.api\" {"));
    assert!(result.dot.contains("    \"shop.api.orders\" [label="));
    // The external person is an unclustered top-level node.
    assert!(result.dot.contains("\n  \"user\" [label="));
    assert!(result.dot.contains("\"user\" -> \"shop.api.orders\""));
}

/// The text of the `cluster_<id>` block, up to its closing brace.
fn cluster_block<'a>(dot: &'a str, id: &str) -> Option<&'a str> {
    let opener = format!("subgraph \"cluster_{id}\" {{\n");
    let start = dot.find(&opener)?;
    let indent = dot[..start].rsplit('\n').next()?.len();
    let closer = format!("\n{}}}\n", " ".repeat(indent));
    let end = start + dot[start..].find(&closer)?;
    Some(&dot[start..end])
}

#[test]
fn test_component_view_nests_clusters() {
    let model = Model::new(vec![
        BodyItem::Element(ModelElement::new("user", "person")),
        BodyItem::Element(
            ModelElement::new("shop", "system").with_child(
                ModelElement::new("api", "container")
                    .with_child(ModelElement::new("orders", "component")),
            ),
        ),
        BodyItem::Relation(ModelRelation::new("user", "shop").with_label("Visits")),
    ]);
    let result = exporter(3, None).export(Some(&model));

    let shop = cluster_block(&result.dot, "shop").expect("shop cluster");
    assert!(shop.contains("subgraph \"cluster_shop.api\" {"), "{shop}");
    assert!(shop.contains("\"shop.api.orders\" [label="), "{shop}");
    assert!(!result.dot.contains("\"shop\" [label="));
    assert!(!result.dot.contains("\"shop.api\" [label="));

    // Every clipped edge lands on a node drawn inside the clipping cluster.
    let clipped: Vec<&str> = result
        .dot
        .lines()
        .filter(|line| line.contains(" -> ") && line.contains("lhead="))
        .collect();
    assert!(!clipped.is_empty());
    for line in clipped {
        let head = line
            .split_once(" -> \"")
            .and_then(|(_, rest)| rest.split('"').next())
            .expect("edge head");
        let cluster = line
            .split("lhead=\"cluster_")
            .nth(1)
            .and_then(|rest| rest.split('"').next())
            .expect("lhead cluster");
        let block = cluster_block(&result.dot, cluster).expect("lhead names a drawn cluster");
        assert!(block.contains(&format!("\"{head}\" [label=")), "{line}");
    }
}

#[test]
fn test_relation_into_enclosing_cluster_is_not_a_self_loop() {
    let model = Model::new(vec![BodyItem::Element(
        ModelElement::new("shop", "system").with_child(
            ModelElement::new("api", "container")
                .with_child(ModelElement::new("orders", "component"))
                .with_relation(ModelRelation::new("orders", "api").with_label("Reports")),
        ),
    )]);
    let result = exporter(3, Some("shop.api")).export(Some(&model));

    assert!(
        result
            .relations
            .iter()
            .any(|r| r.from() == "shop.api.orders" && r.to() == "shop.api")
    );
    assert!(result.dot.contains("subgraph \"cluster_shop.api\" {"));
    assert!(!result.dot.contains("\"shop.api.orders\" -> \"shop.api.orders\""));
    assert!(!result.dot.contains("Reports"));
}

#[test]
fn test_missing_or_empty_model_yields_empty_result() {
    let exporter = exporter(1, None);

    for result in [
        exporter.export(None),
        exporter.export(Some(&Model::default())),
        exporter.export(Some(&Model::new(vec![BodyItem::Relation(
            ModelRelation::new("a", "b"),
        )]))),
    ] {
        assert!(result.dot.is_empty());
        assert!(result.elements.is_empty());
        assert!(result.relations.is_empty());
        assert!(result.constraints.is_none());
    }
}

#[test]
fn test_context_view_shows_exactly_people_and_systems() {
    let result = exporter(1, None).export(Some(&landscape()));

    let mut ids: Vec<&str> = result.elements.iter().map(|e| e.id()).collect();
    ids.sort_unstable();
    assert_eq!(ids, ["bank", "clerk", "customer", "shop"]);
    assert!(
        result
            .elements
            .iter()
            .all(|e| matches!(e.kind(), ElementKind::Person | ElementKind::System))
    );
}

#[test]
fn test_focused_container_view_aggregates_outside_focus() {
    let result = exporter(2, Some("shop")).export(Some(&landscape()));

    for element in &result.elements {
        let inside = element.id() == "shop" || element.id().starts_with("shop.");
        assert!(
            inside || element.kind().is_root_kind(),
            "{} leaked into the view",
            element.id()
        );
    }
    assert!(result.elements.iter().any(|e| e.id() == "bank"));
    assert!(
        result
            .relations
            .iter()
            .any(|r| r.from() == "shop" && r.to() == "bank")
    );
}

#[test]
fn test_context_view_ranks_people_first() {
    let result = exporter(1, None).export(Some(&landscape()));
    let constraints = result.constraints.expect("constraints");

    let min_groups: Vec<&Vec<String>> = constraints
        .ranks
        .iter()
        .filter(|rank| rank.rank_type.as_str() == "min")
        .map(|rank| &rank.node_ids)
        .collect();

    for person in ["customer", "clerk"] {
        let count = min_groups
            .iter()
            .filter(|ids| ids.iter().any(|id| id == person))
            .count();
        assert_eq!(count, 1, "{person} should be in exactly one min group");
    }
    for group in &min_groups {
        assert!(!group.iter().any(|id| id == "shop" || id == "bank"));
    }
    assert!(result.dot.contains("{ rank=min; \"customer\"; \"clerk\"; }"));
}

#[test]
fn test_labels_are_escaped() {
    assert_eq!(escape_label(r#"He said "hi""#), r#"He said \"hi\""#);

    let model = Model::new(vec![
        BodyItem::Element(ModelElement::new("a", "person").with_title(r#"The "A" team"#)),
        BodyItem::Element(ModelElement::new("b", "system")),
        BodyItem::Relation(ModelRelation::new("a", "b").with_label(r#"says "hi""#)),
    ]);
    let result = exporter(1, None).export(Some(&model));

    assert!(result.dot.contains(r#"label="The \"A\" team""#));
    assert!(result.dot.contains(r#"label="says \"hi\"""#));
}

#[test]
fn test_export_is_pure() {
    let model = landscape();
    for level in 1..=3 {
        let exporter = exporter(level, None);
        let first = exporter.export(Some(&model));
        let second = exporter.export(Some(&model));
        assert_eq!(first, second, "level {level}");
    }
}

#[test]
fn test_out_of_range_level_behaves_as_context() {
    let model = landscape();
    let context = exporter(1, None).export(Some(&model));
    for level in [0, 4, 300, -1] {
        assert_eq!(exporter(level, None).export(Some(&model)).dot, context.dot);
    }
}

#[test]
fn test_size_override_is_applied() {
    let config = ExportConfig::default().with_node_size("shop", NodeSize::new(360.0, 144.0));
    let result = Exporter::new(config).export(Some(&person_uses_system()));

    assert!(
        result
            .dot
            .contains("\"shop\" [label=\"Shop\", width=5.00, height=2.00")
    );
}

#[test]
fn test_left_right_direction_and_rich_labels() {
    let config = ExportConfig::default()
        .with_rank_dir(astrolabe::config::RankDir::LeftRight)
        .with_rich_labels(true);
    let result = Exporter::new(config).export(Some(&person_uses_system()));

    assert!(result.dot.contains("  rankdir=LR;"));
    assert!(result.dot.contains("<B>Customer</B>"));
    assert!(result.dot.contains("&laquo;person&raquo;"));
}

#[test]
fn test_export_refined_stays_within_budget() {
    let model = landscape();
    let exporter = exporter(3, None);

    let refined = exporter.export_refined(Some(&model), 3);
    assert!(refined.iterations <= 3);
    assert!(refined.result.dot.starts_with("digraph C4 {"));
    assert_eq!(
        refined.result.elements,
        exporter.export(Some(&model)).elements
    );
    assert!((0.0..=1.0).contains(&refined.quality.score()));

    let unrefined = exporter.export_refined(Some(&model), 0);
    assert_eq!(unrefined.iterations, 0);
    assert_eq!(unrefined.result.dot, exporter.export(Some(&model)).dot);

    assert_eq!(exporter.export_refined(None, 3).iterations, 0);
}

#[test]
fn test_parse_model() {
    let json = r#"{
        "items": [
            { "element": { "id": "customer", "kind": "person" } },
            { "element": { "id": "shop", "kind": "system" } },
            { "relation": { "from": "customer", "to": "shop", "label": "Uses" } }
        ]
    }"#;
    let model = parse_model(json).expect("valid model");
    assert_eq!(model, person_uses_system_untitled());

    let err = parse_model("{ \"items\": [ { \"element\": {} } ] }").unwrap_err();
    assert!(matches!(err, AstrolabeError::Model(_)));
}

fn person_uses_system_untitled() -> Model {
    Model::new(vec![
        BodyItem::Element(ModelElement::new("customer", "person")),
        BodyItem::Element(ModelElement::new("shop", "system")),
        BodyItem::Relation(ModelRelation::new("customer", "shop").with_label("Uses")),
    ])
}
