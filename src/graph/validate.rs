use super::conversion::IntoGraph;
use super::definition::GraphDefinition;
use super::wire::{WireEdge, WireGraph, WireNode};
use crate::error::GraphError;
use itertools::Itertools;
use tracing::warn;

/// Deserializes the node list blob.
pub fn parse_nodes(nodes_json: &str) -> Result<Vec<WireNode>, GraphError> {
    serde_json::from_str(nodes_json).map_err(|e| GraphError::MalformedGraph {
        field: "nodes",
        message: e.to_string(),
    })
}

/// Deserializes the edge list blob. A blank blob or `null` is an empty edge list.
pub fn parse_edges(edges_json: &str) -> Result<Vec<WireEdge>, GraphError> {
    if edges_json.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str::<Option<Vec<WireEdge>>>(edges_json)
        .map(Option::unwrap_or_default)
        .map_err(|e| GraphError::MalformedGraph {
            field: "edges",
            message: e.to_string(),
        })
}

/// Parses both serialized lists into a canonical graph.
///
/// Only shape is checked here: the payload must deserialize and must contain at
/// least one node. Dangling parents, dangling edge endpoints and parent cycles are
/// left for the engine to tolerate. If a node id appears more than once, the first
/// occurrence wins.
pub fn parse_graph(nodes_json: &str, edges_json: &str) -> Result<GraphDefinition, GraphError> {
    let nodes = parse_nodes(nodes_json)?;
    if nodes.is_empty() {
        return Err(GraphError::EmptyGraph);
    }
    let edges = parse_edges(edges_json)?;
    validate_wire(WireGraph { nodes, edges })
}

/// Converts an already-deserialized wire graph, applying the same checks as
/// [`parse_graph`].
pub fn validate_wire(wire: WireGraph) -> Result<GraphDefinition, GraphError> {
    if wire.nodes.is_empty() {
        return Err(GraphError::EmptyGraph);
    }
    let mut graph = wire
        .into_graph()
        .map_err(|e| GraphError::MalformedGraph {
            field: "nodes",
            message: e.to_string(),
        })?;

    let submitted = graph.nodes.len();
    graph.nodes = graph
        .nodes
        .into_iter()
        .unique_by(|n| n.id.clone())
        .collect();
    if graph.nodes.len() != submitted {
        warn!(
            dropped = submitted - graph.nodes.len(),
            "ignoring nodes with duplicate ids"
        );
    }
    Ok(graph)
}
