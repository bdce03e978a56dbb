use super::definition::{GraphDefinition, MetadataFields, MindMapEdge, MindMapNode, Priority};
use super::wire::{WireGraph, WireMetadata};
use crate::error::GraphConversionError;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use tracing::debug;

/// A trait for custom data models that can be converted into a `GraphDefinition`.
///
/// The reconciliation engine itself only ever sees `GraphDefinition`. Implement this
/// on your own structs if your authoring tool stores mind maps in a different shape
/// than [`WireGraph`].
///
/// # Example
///
/// ```rust,no_run
/// use kumitate::prelude::*;
/// use kumitate::error::GraphConversionError;
///
/// struct Outline { lines: Vec<(String, Option<String>)> }
///
/// impl IntoGraph for Outline {
///     fn into_graph(self) -> std::result::Result<GraphDefinition, GraphConversionError> {
///         let nodes = self
///             .lines
///             .into_iter()
///             .map(|(label, parent)| MindMapNode {
///                 id: label.clone(),
///                 label,
///                 description: None,
///                 color: None,
///                 parent_id: parent,
///                 metadata: MetadataFields::default(),
///             })
///             .collect();
///         Ok(GraphDefinition { nodes, edges: vec![] })
///     }
/// }
/// ```
pub trait IntoGraph {
    /// Consumes the object and converts it into a canonical graph.
    fn into_graph(self) -> Result<GraphDefinition, GraphConversionError>;
}

impl IntoGraph for WireGraph {
    fn into_graph(self) -> Result<GraphDefinition, GraphConversionError> {
        let nodes = self
            .nodes
            .into_iter()
            .map(|node| {
                let metadata = node
                    .metadata
                    .map(|m| convert_metadata(&node.id, m))
                    .unwrap_or_default();
                MindMapNode {
                    id: node.id,
                    label: node.label,
                    description: node.description.filter(|d| !d.trim().is_empty()),
                    color: node.color.filter(|c| !c.trim().is_empty()),
                    parent_id: node.parent_id.filter(|p| !p.is_empty()),
                    metadata,
                }
            })
            .collect();

        let edges = self
            .edges
            .into_iter()
            .map(|edge| MindMapEdge {
                id: edge.id,
                source: edge.source,
                target: edge.target,
                label: edge.label,
            })
            .collect();

        Ok(GraphDefinition { nodes, edges })
    }
}

fn convert_metadata(node_id: &str, raw: WireMetadata) -> MetadataFields {
    let priority = raw.priority.and_then(|v| match v.as_str().and_then(Priority::parse) {
        Some(p) => Some(p),
        None => {
            debug!(node_id, value = %v, "ignoring unrecognized priority");
            None
        }
    });
    MetadataFields {
        priority,
        due_date: raw.due_date.and_then(|v| date_value(node_id, "dueDate", v)),
        start_date: raw.start_date.and_then(|v| date_value(node_id, "startDate", v)),
        parent_project_id: raw.parent_project_id.and_then(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }),
    }
}

fn date_value(node_id: &str, field: &str, value: Value) -> Option<DateTime<Utc>> {
    let parsed = match &value {
        Value::String(s) => parse_date(s),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    };
    if parsed.is_none() && !value.is_null() {
        debug!(node_id, field, value = %value, "ignoring unparseable date");
    }
    parsed
}

/// Parses an RFC 3339 timestamp or a plain `YYYY-MM-DD` calendar date.
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
