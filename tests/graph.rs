//! Tests for graph parsing, validation and structural classification.
mod common;
use chrono::{Datelike, TimeZone, Utc};
use common::*;
use kumitate::graph::parse_date;
use kumitate::prelude::*;

#[test]
fn test_parse_graph_reads_nodes_and_edges() {
    let graph = parse_graph(&basic_nodes(), &basic_edges()).expect("Failed to parse");

    assert_eq!(graph.nodes.len(), 4);
    assert_eq!(graph.edges.len(), 2);
    assert_eq!(graph.node("D").unwrap().parent_id.as_deref(), Some("B"));
    assert!(graph.node("A").unwrap().parent_id.is_none());
    assert!(graph.contains("D"));
    assert!(!graph.contains("Z"));
}

#[test]
fn test_parse_graph_treats_blank_and_null_edges_as_empty() {
    for edges in ["", "   ", "null", "[]"] {
        let graph = parse_graph(&basic_nodes(), edges).expect("Failed to parse");
        assert!(graph.edges.is_empty(), "edges {:?} should be empty", edges);
    }
}

#[test]
fn test_parse_graph_rejects_empty_node_list() {
    assert_eq!(parse_graph("[]", "[]"), Err(GraphError::EmptyGraph));
    // Emptiness is reported before the edges are even looked at.
    assert_eq!(parse_graph("[]", "not json"), Err(GraphError::EmptyGraph));
}

#[test]
fn test_parse_graph_reports_malformed_payloads() {
    match parse_graph("{\"nodes\": 1}", "[]") {
        Err(GraphError::MalformedGraph { field, .. }) => assert_eq!(field, "nodes"),
        other => panic!("Expected MalformedGraph on nodes, got {:?}", other),
    }
    match parse_graph(&basic_nodes(), "[{\"id\": 3}]") {
        Err(GraphError::MalformedGraph { field, .. }) => assert_eq!(field, "edges"),
        other => panic!("Expected MalformedGraph on edges, got {:?}", other),
    }
    // A node without a label is malformed too.
    assert!(matches!(
        parse_graph("[{\"id\": \"A\"}]", ""),
        Err(GraphError::MalformedGraph { .. })
    ));
}

#[test]
fn test_duplicate_node_ids_keep_first_occurrence() {
    let nodes = nodes_json(&[
        ("A", "Root", None),
        ("B", "First", Some("A")),
        ("B", "Second", Some("A")),
    ]);
    let graph = parse_graph(&nodes, "").unwrap();

    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.node("B").unwrap().label, "First");
}

#[test]
fn test_blank_optional_fields_are_dropped() {
    let nodes = r#"[
        {"id": "A", "label": "Root", "description": "  ", "color": "", "parentId": ""}
    ]"#;
    let graph = parse_graph(nodes, "").unwrap();
    let root = graph.node("A").unwrap();

    assert!(root.description.is_none());
    assert!(root.color.is_none());
    assert!(root.parent_id.is_none());
}

#[test]
fn test_metadata_is_narrowed_to_known_fields() {
    let nodes = r#"[
        {"id": "A", "label": "Root", "metadata": {"parentProjectId": "proj-9"}},
        {"id": "B", "label": "Task", "parentId": "A", "metadata": {
            "priority": "HIGH",
            "dueDate": "2025-03-01",
            "startDate": "2025-02-01T09:30:00Z",
            "unknownKey": true
        }},
        {"id": "C", "label": "Other", "parentId": "A", "metadata": {
            "priority": "whenever",
            "dueDate": "next tuesday",
            "startDate": 1700000000000
        }}
    ]"#;
    let graph = parse_graph(nodes, "").unwrap();

    let root = &graph.node("A").unwrap().metadata;
    assert_eq!(root.parent_project_id.as_deref(), Some("proj-9"));

    let b = &graph.node("B").unwrap().metadata;
    assert_eq!(b.priority, Some(Priority::High));
    assert_eq!(
        b.due_date,
        Some(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap())
    );
    assert_eq!(
        b.start_date,
        Some(Utc.with_ymd_and_hms(2025, 2, 1, 9, 30, 0).unwrap())
    );

    let c = &graph.node("C").unwrap().metadata;
    assert_eq!(c.priority, None);
    assert_eq!(c.due_date, None);
    assert_eq!(c.start_date.map(|d| d.year()), Some(2023));
}

#[test]
fn test_priority_aliases() {
    assert_eq!(Priority::parse("normal"), Some(Priority::Medium));
    assert_eq!(Priority::parse(" Critical "), Some(Priority::Urgent));
    assert_eq!(Priority::parse("low"), Some(Priority::Low));
    assert_eq!(Priority::parse(""), None);
    assert_eq!(Priority::Urgent.to_string(), "urgent");
}

#[test]
fn test_parse_date_formats() {
    assert!(parse_date("2024-12-31").is_some());
    assert!(parse_date("2024-12-31T23:59:59+02:00").is_some());
    assert!(parse_date("31/12/2024").is_none());
}

#[test]
fn test_wire_graph_converts_through_into_graph() {
    let wire: WireGraph = serde_json::from_str(&format!(
        "{{\"nodes\": {}, \"edges\": {}}}",
        basic_nodes(),
        basic_edges()
    ))
    .unwrap();
    let graph = wire.into_graph().expect("Failed to convert");

    assert_eq!(graph.nodes.len(), 4);
    assert_eq!(graph.edges[0].source, "C");
}

/// An outline of `(label, parent label)` lines, converted the way a custom
/// authoring format would be.
struct Outline {
    lines: Vec<(&'static str, Option<&'static str>)>,
}

impl IntoGraph for Outline {
    fn into_graph(
        self,
    ) -> std::result::Result<GraphDefinition, kumitate::error::GraphConversionError> {
        let nodes = self
            .lines
            .into_iter()
            .map(|(label, parent)| MindMapNode {
                id: label.to_string(),
                label: label.to_string(),
                description: None,
                color: None,
                parent_id: parent.map(str::to_string),
                metadata: MetadataFields::default(),
            })
            .collect();
        Ok(GraphDefinition {
            nodes,
            edges: vec![],
        })
    }
}

#[test]
fn test_custom_model_converts_through_into_graph() {
    let outline = Outline {
        lines: vec![("Trip", None), ("Flights", Some("Trip")), ("Hotel", Some("Trip"))],
    };
    let graph = outline.into_graph().expect("Failed to convert");
    let classification = classify(&graph);

    assert_eq!(classification.root_id(), "Trip");
    assert_eq!(classification.leaves(), vec!["Flights", "Hotel"]);
}

#[test]
fn test_classify_basic_roles() {
    let graph = parse_graph(&basic_nodes(), "").unwrap();
    let classification = classify(&graph);

    assert_eq!(classification.root_id(), "A");
    assert!(matches!(classification.role("A"), Some(NodeRole::Root(_))));
    assert!(matches!(classification.role("B"), Some(NodeRole::Branch)));
    assert!(matches!(classification.role("C"), Some(NodeRole::Leaf(_))));
    assert!(matches!(classification.role("D"), Some(NodeRole::Leaf(_))));
    assert_eq!(classification.leaves(), vec!["C", "D"]);
    assert_eq!(classification.len(), 4);
}

#[test]
fn test_node_with_children_is_never_a_leaf() {
    let nodes = r#"[
        {"id": "A", "label": "Root"},
        {"id": "B", "label": "Has child", "parentId": "A", "metadata": {"priority": "high"}},
        {"id": "C", "label": "Child", "parentId": "B"}
    ]"#;
    let graph = parse_graph(nodes, "").unwrap();
    let classification = classify(&graph);

    assert!(matches!(classification.role("B"), Some(NodeRole::Branch)));
}

#[test]
fn test_leaf_metadata_is_carried_on_the_role() {
    let nodes = r#"[
        {"id": "A", "label": "Root", "metadata": {"priority": "urgent"}},
        {"id": "B", "label": "Leaf", "parentId": "A", "metadata": {"priority": "low", "parentProjectId": "x"}}
    ]"#;
    let graph = parse_graph(nodes, "").unwrap();
    let classification = classify(&graph);

    match classification.role("A") {
        Some(NodeRole::Root(meta)) => assert!(meta.parent_project_id.is_none()),
        other => panic!("Expected root, got {:?}", other),
    }
    match classification.role("B") {
        Some(NodeRole::Leaf(meta)) => assert_eq!(meta.priority, Some(Priority::Low)),
        other => panic!("Expected leaf, got {:?}", other),
    }
}

#[test]
fn test_root_falls_back_to_first_node_when_all_have_parents() {
    let nodes = nodes_json(&[("X", "X", Some("Y")), ("Y", "Y", Some("X"))]);
    let graph = parse_graph(&nodes, "").unwrap();
    let classification = classify(&graph);

    assert_eq!(classification.root_id(), "X");
    assert!(matches!(classification.role("Y"), Some(NodeRole::Branch)));
}

#[test]
fn test_first_parentless_node_is_root() {
    let nodes = nodes_json(&[
        ("B", "Child", Some("A")),
        ("A", "Root", None),
        ("Z", "Stray", None),
    ]);
    let graph = parse_graph(&nodes, "").unwrap();
    let classification = classify(&graph);

    assert_eq!(classification.root_id(), "A");
    // Further parentless nodes hang off the root.
    let stray = graph.node("Z").unwrap();
    assert_eq!(classification.effective_parent(stray), Some("A"));
    assert_eq!(classification.effective_parent(graph.node("A").unwrap()), None);
}

#[test]
fn test_branch_ordering_depth_first_visits_parents_first() {
    let graph = parse_graph(&chain_nodes(5, true), "").unwrap();
    let classification = classify(&graph);

    // N4 is the only leaf; N1..N3 are branches listed deepest first.
    assert_eq!(
        classification.branches(BranchOrdering::ListOrder),
        vec!["N3", "N2", "N1"]
    );
    assert_eq!(
        classification.branches(BranchOrdering::DepthOrdered),
        vec!["N1", "N2", "N3"]
    );
}

#[test]
fn test_unreachable_branches_are_appended() {
    let nodes = nodes_json(&[
        ("A", "Root", None),
        ("G", "Orphan branch", Some("ghost")),
        ("H", "Orphan leaf", Some("G")),
        ("B", "Branch", Some("A")),
        ("C", "Leaf", Some("B")),
    ]);
    let graph = parse_graph(&nodes, "").unwrap();
    let classification = classify(&graph);

    assert_eq!(
        classification.branches(BranchOrdering::DepthOrdered),
        vec!["B", "G"]
    );
}
