use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The complete, canonical definition of a mind map graph, ready for reconciliation.
/// This is the target structure for any custom data model conversion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphDefinition {
    pub nodes: Vec<MindMapNode>,
    pub edges: Vec<MindMapEdge>,
}

impl GraphDefinition {
    /// Looks up a node by its identifier.
    pub fn node(&self, id: &str) -> Option<&MindMapNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node(id).is_some()
    }
}

/// A single vertex of the mind map. Hierarchy comes solely from `parent_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct MindMapNode {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub parent_id: Option<String>,
    pub metadata: MetadataFields,
}

/// Every metadata field the engine understands, already parsed.
///
/// Which of these are honored depends on the node's role; see
/// [`NodeRole`](crate::classify::NodeRole).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataFields {
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub parent_project_id: Option<String>,
}

/// A dependency connection between two nodes. Edges carry no hierarchy meaning.
#[derive(Debug, Clone, PartialEq)]
pub struct MindMapEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: Option<String>,
}

/// Task priority as understood by the resource store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Parses a priority name case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" | "normal" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "urgent" | "critical" => Some(Priority::Urgent),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        };
        write!(f, "{}", name)
    }
}
