//! Common test utilities for building mind maps and workspaces.
use kumitate::prelude::*;
use serde_json::json;

pub const MIND_MAP_ID: &str = "map-1";
pub const USER_ID: &str = "user-1";

pub fn owner() -> Owner {
    Owner::User(USER_ID.to_string())
}

/// Serializes a node list as the authoring tool would.
#[allow(dead_code)]
pub fn nodes_json(nodes: &[(&str, &str, Option<&str>)]) -> String {
    let nodes: Vec<_> = nodes
        .iter()
        .map(|(id, label, parent)| match parent {
            Some(parent) => json!({ "id": id, "label": label, "parentId": parent }),
            None => json!({ "id": id, "label": label }),
        })
        .collect();
    serde_json::Value::Array(nodes).to_string()
}

/// Serializes an edge list of `(id, source, target)`.
#[allow(dead_code)]
pub fn edges_json(edges: &[(&str, &str, &str)]) -> String {
    let edges: Vec<_> = edges
        .iter()
        .map(|(id, source, target)| json!({ "id": id, "source": source, "target": target }))
        .collect();
    serde_json::Value::Array(edges).to_string()
}

/// A -> {B, C}, B -> D. A is the root, B a branch, C and D leaves.
#[allow(dead_code)]
pub fn basic_nodes() -> String {
    nodes_json(&[
        ("A", "Launch", None),
        ("B", "Venue", Some("A")),
        ("C", "Write invitations", Some("A")),
        ("D", "Book venue", Some("B")),
    ])
}

/// C depends on D, plus an edge from C to the branch B that must be ignored.
#[allow(dead_code)]
pub fn basic_edges() -> String {
    edges_json(&[("e1", "C", "D"), ("e2", "C", "B")])
}

/// A workspace holding one unconverted mind map owned by [`owner`].
#[allow(dead_code)]
pub fn workspace_with(nodes: &str, edges: &str) -> MemoryWorkspace {
    let mut workspace = MemoryWorkspace::new();
    workspace.mind_maps.insert(MindMap::new(
        MIND_MAP_ID,
        owner(),
        "Launch plan",
        nodes,
        edges,
    ));
    workspace
}

#[allow(dead_code)]
pub fn basic_workspace() -> MemoryWorkspace {
    workspace_with(&basic_nodes(), &basic_edges())
}

/// A reconciler without any plan ceilings.
#[allow(dead_code)]
pub fn unlimited_reconciler() -> Reconciler {
    Reconciler::builder(PlanQuota::unlimited(), AllowAll).build()
}

#[allow(dead_code)]
pub fn reconciler_with(quota: PlanQuota) -> Reconciler {
    Reconciler::builder(quota, AllowAll).build()
}

#[allow(dead_code)]
pub fn request() -> ConversionRequest {
    ConversionRequest::new(MIND_MAP_ID, USER_ID, PlanTier::Pro)
}

/// Converts the stored graph of the test mind map.
#[allow(dead_code)]
pub fn convert(
    reconciler: &Reconciler,
    workspace: &mut MemoryWorkspace,
) -> std::result::Result<ConversionSummary, ConversionError> {
    reconciler.convert(&mut workspace.store, &mut workspace.mind_maps, request())
}

/// Converts a newly submitted graph, replacing the stored one.
#[allow(dead_code)]
pub fn reconvert(
    reconciler: &Reconciler,
    workspace: &mut MemoryWorkspace,
    nodes: &str,
    edges: &str,
) -> std::result::Result<ConversionSummary, ConversionError> {
    reconciler.convert(
        &mut workspace.store,
        &mut workspace.mind_maps,
        request().with_graph(nodes, edges),
    )
}

/// The mapping persisted on the test mind map.
#[allow(dead_code)]
pub fn stored_mapping(workspace: &MemoryWorkspace) -> ResourceMapping {
    workspace
        .mind_maps
        .get(MIND_MAP_ID)
        .map(|m| m.mapping.clone())
        .unwrap_or_default()
}

/// Resource id mapped to `node_id`, panicking if absent.
#[allow(dead_code)]
pub fn resource(workspace: &MemoryWorkspace, node_id: &str) -> MappedResource {
    stored_mapping(workspace)
        .get(node_id)
        .cloned()
        .unwrap_or_else(|| panic!("node '{}' is not mapped", node_id))
}

/// A linear chain `N0 <- N1 <- ... <- N{len-1}` listed in the given order.
#[allow(dead_code)]
pub fn chain_nodes(len: usize, reversed: bool) -> String {
    let ids: Vec<String> = (0..len).map(|i| format!("N{}", i)).collect();
    let mut nodes: Vec<_> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            if i == 0 {
                json!({ "id": id, "label": id })
            } else {
                json!({ "id": id, "label": id, "parentId": ids[i - 1] })
            }
        })
        .collect();
    if reversed {
        // Keep the root first so it is still the first parentless node.
        nodes[1..].reverse();
    }
    serde_json::Value::Array(nodes).to_string()
}
