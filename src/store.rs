//! Collaborator interfaces consumed by the reconciliation engine.
//!
//! The engine never talks to a database directly. It drives a [`ResourceStore`] for
//! projects and tasks, a [`MindMapRepository`] for the mind map record itself, and a
//! [`PermissionChecker`] once before any work starts.

use crate::error::StoreError;
use crate::graph::Priority;
use crate::mapping::ResourceMapping;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who owns a mind map and the resources converted from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Owner {
    User(String),
    Team(String),
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::User(id) => write!(f, "user:{}", id),
            Owner::Team(id) => write!(f, "team:{}", id),
        }
    }
}

/// The editable content of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectContent {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

/// Everything needed to create a project. `parent_id` of `None` is a top-level project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub content: ProjectContent,
    pub parent_id: Option<String>,
}

/// The editable content of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskContent {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
}

/// Everything needed to create a task inside a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub content: TaskContent,
    pub project_id: String,
}

/// Simple CRUD access to the owner's projects and tasks.
///
/// Updates only touch content; resources are never moved between parents.
pub trait ResourceStore {
    fn create_project(&mut self, owner: &Owner, project: &NewProject) -> Result<String, StoreError>;
    fn update_project(&mut self, id: &str, content: &ProjectContent) -> Result<(), StoreError>;
    fn delete_project(&mut self, id: &str) -> Result<(), StoreError>;
    /// Nesting depth of a project; top-level projects have depth 0.
    fn project_depth(&self, id: &str) -> Result<usize, StoreError>;

    fn create_task(&mut self, owner: &Owner, task: &NewTask) -> Result<String, StoreError>;
    fn update_task(&mut self, id: &str, content: &TaskContent) -> Result<(), StoreError>;
    fn delete_task(&mut self, id: &str) -> Result<(), StoreError>;
    fn set_task_dependency(&mut self, task_id: &str, depends_on_id: &str) -> Result<(), StoreError>;

    fn count_root_projects(&self, owner: &Owner) -> Result<usize, StoreError>;
    fn count_tasks_for_owner(&self, owner: &Owner) -> Result<usize, StoreError>;
}

/// A persisted mind map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindMap {
    pub id: String,
    pub owner: Owner,
    pub title: String,
    /// Serialized node list, as submitted by the authoring tool.
    pub nodes: String,
    /// Serialized edge list.
    pub edges: String,
    pub is_converted: bool,
    pub converted_at: Option<DateTime<Utc>>,
    pub root_resource_id: Option<String>,
    /// Mapping from the last successful conversion; empty until then.
    pub mapping: ResourceMapping,
}

impl MindMap {
    /// A fresh, never-converted mind map.
    pub fn new(
        id: impl Into<String>,
        owner: Owner,
        title: impl Into<String>,
        nodes: impl Into<String>,
        edges: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            owner,
            title: title.into(),
            nodes: nodes.into(),
            edges: edges.into(),
            is_converted: false,
            converted_at: None,
            root_resource_id: None,
            mapping: ResourceMapping::new(),
        }
    }
}

/// What gets written back to the mind map at the end of a conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRecord {
    pub mapping: ResourceMapping,
    pub converted_at: DateTime<Utc>,
    pub root_resource_id: Option<String>,
    /// The submitted graph, if the request carried one.
    pub graph: Option<(String, String)>,
}

/// Storage for mind map records.
pub trait MindMapRepository {
    fn load(&self, id: &str) -> Result<Option<MindMap>, StoreError>;
    /// Atomically replaces the mapping and conversion state of a mind map.
    fn record_conversion(&mut self, id: &str, record: ConversionRecord) -> Result<(), StoreError>;
}

/// Role/ownership gate, consulted once before reconciliation begins.
pub trait PermissionChecker: Send + Sync {
    fn can_convert(&self, user_id: &str, mind_map_id: &str) -> bool;
}

impl<F> PermissionChecker for F
where
    F: Fn(&str, &str) -> bool + Send + Sync,
{
    fn can_convert(&self, user_id: &str, mind_map_id: &str) -> bool {
        self(user_id, mind_map_id)
    }
}

/// Grants every conversion.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl PermissionChecker for AllowAll {
    fn can_convert(&self, _user_id: &str, _mind_map_id: &str) -> bool {
        true
    }
}
