use serde::{Deserialize, Serialize};

/// Node as submitted by the authoring tool.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WireNode {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(
        default,
        rename = "parentId",
        alias = "parent_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<WireMetadata>,
}

/// The open metadata bag attached to a node. Values are kept loosely typed here
/// and narrowed during conversion; unknown keys are ignored.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct WireMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<serde_json::Value>,
    #[serde(
        default,
        rename = "dueDate",
        alias = "due_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<serde_json::Value>,
    #[serde(
        default,
        rename = "startDate",
        alias = "start_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<serde_json::Value>,
    #[serde(
        default,
        rename = "parentProjectId",
        alias = "parent_project_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_project_id: Option<serde_json::Value>,
}

/// Edge as submitted by the authoring tool.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WireEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Complete wire graph, as carried by a mind map record.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct WireGraph {
    pub nodes: Vec<WireNode>,
    #[serde(default)]
    pub edges: Vec<WireEdge>,
}
