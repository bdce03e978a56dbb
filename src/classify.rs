//! Structural classification of mind map nodes.
//!
//! Roles are derived purely from `parent_id` relationships and recomputed on every
//! conversion run, since the graph may change shape between runs.

use crate::config::BranchOrdering;
use crate::graph::{GraphDefinition, MetadataFields, MindMapNode, Priority};
use ahash::{AHashMap, AHashSet};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Metadata honored on the root node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootMetadata {
    /// Existing project to attach the root project underneath.
    pub parent_project_id: Option<String>,
}

/// Metadata honored on leaf nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeafMetadata {
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
}

impl From<&MetadataFields> for LeafMetadata {
    fn from(fields: &MetadataFields) -> Self {
        Self {
            priority: fields.priority,
            due_date: fields.due_date,
            start_date: fields.start_date,
        }
    }
}

/// The structural role of a node. Root and branch nodes produce projects, leaves
/// produce tasks. A node with children is never a leaf, whatever its metadata says.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeRole {
    Root(RootMetadata),
    Branch,
    Leaf(LeafMetadata),
}

impl NodeRole {
    fn from_fields(kind: RoleKind, fields: &MetadataFields) -> Self {
        match kind {
            RoleKind::Root => NodeRole::Root(RootMetadata {
                parent_project_id: fields.parent_project_id.clone(),
            }),
            RoleKind::Branch => NodeRole::Branch,
            RoleKind::Leaf => NodeRole::Leaf(LeafMetadata::from(fields)),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeRole::Leaf(_))
    }
}

#[derive(Clone, Copy)]
enum RoleKind {
    Root,
    Branch,
    Leaf,
}

/// The classified view of a graph.
#[derive(Debug, Clone)]
pub struct Classification {
    root_id: String,
    roles: AHashMap<String, NodeRole>,
    /// Node ids in submission order.
    order: Vec<String>,
    /// Effective parent -> children, in submission order.
    children: AHashMap<String, Vec<String>>,
}

/// Classifies every node of a non-empty graph.
///
/// The root is the first node without a parent. If every node declares a parent,
/// the first node in list order is taken as the root.
pub fn classify(graph: &GraphDefinition) -> Classification {
    let root_id = graph
        .nodes
        .iter()
        .find(|n| n.parent_id.is_none())
        .or_else(|| graph.nodes.first())
        .map(|n| n.id.clone())
        .unwrap_or_default();

    let parents: AHashSet<&str> = graph
        .nodes
        .iter()
        .filter_map(|n| n.parent_id.as_deref())
        .collect();

    let mut roles = AHashMap::with_capacity(graph.nodes.len());
    let mut children: AHashMap<String, Vec<String>> = AHashMap::new();
    for node in &graph.nodes {
        let kind = if node.id == root_id {
            RoleKind::Root
        } else if parents.contains(node.id.as_str()) {
            RoleKind::Branch
        } else {
            RoleKind::Leaf
        };
        roles.insert(node.id.clone(), NodeRole::from_fields(kind, &node.metadata));

        if node.id != root_id {
            if let Some(parent) = effective_parent_of(node, &root_id) {
                children
                    .entry(parent.to_string())
                    .or_default()
                    .push(node.id.clone());
            }
        }
    }

    Classification {
        root_id,
        roles,
        order: graph.nodes.iter().map(|n| n.id.clone()).collect(),
        children,
    }
}

/// Parentless non-root nodes hang off the root.
fn effective_parent_of<'a>(node: &'a MindMapNode, root_id: &'a str) -> Option<&'a str> {
    if node.id == root_id {
        return None;
    }
    Some(node.parent_id.as_deref().unwrap_or(root_id))
}

impl Classification {
    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn role(&self, node_id: &str) -> Option<&NodeRole> {
        self.roles.get(node_id)
    }

    /// The parent a node's resource should be created under, or `None` for the root.
    pub fn effective_parent<'a>(&'a self, node: &'a MindMapNode) -> Option<&'a str> {
        effective_parent_of(node, &self.root_id)
    }

    /// Branch node ids in the order the branch phase should visit them.
    ///
    /// `DepthOrdered` walks breadth-first from the root so every branch comes after
    /// its parent; branches unreachable from the root (dangling parents, parent
    /// cycles) are appended in submission order. `ListOrder` is plain submission
    /// order.
    pub fn branches(&self, ordering: BranchOrdering) -> Vec<&str> {
        let is_branch = |id: &str| matches!(self.roles.get(id), Some(NodeRole::Branch));
        match ordering {
            BranchOrdering::ListOrder => self
                .order
                .iter()
                .map(String::as_str)
                .filter(|id| is_branch(*id))
                .collect(),
            BranchOrdering::DepthOrdered => {
                let mut visited: AHashSet<&str> = AHashSet::new();
                let mut ordered = Vec::new();
                let mut queue = VecDeque::from([self.root_id.as_str()]);
                visited.insert(self.root_id.as_str());
                while let Some(current) = queue.pop_front() {
                    for child in self.children.get(current).into_iter().flatten() {
                        if visited.insert(child.as_str()) && is_branch(child.as_str()) {
                            ordered.push(child.as_str());
                            queue.push_back(child.as_str());
                        }
                    }
                }
                ordered.extend(
                    self.order
                        .iter()
                        .map(String::as_str)
                        .filter(|id| is_branch(*id) && !visited.contains(*id)),
                );
                ordered
            }
        }
    }

    /// Leaf node ids in submission order.
    pub fn leaves(&self) -> Vec<&str> {
        self.order
            .iter()
            .map(String::as_str)
            .filter(|id| self.roles.get(*id).is_some_and(NodeRole::is_leaf))
            .collect()
    }

    /// Number of classified nodes.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
