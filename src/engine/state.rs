use crate::mapping::{MappedResource, ResourceKind, ResourceMapping};
use ahash::AHashMap;
use serde::Serialize;

/// Which plan ceiling stopped a node from producing a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LimitKind {
    RootProjects,
    NestingDepth,
    Tasks,
}

/// What happened to a single node during a conversion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Outcome {
    Created {
        kind: ResourceKind,
        resource_id: String,
    },
    Updated {
        kind: ResourceKind,
        resource_id: String,
    },
    Deleted {
        kind: ResourceKind,
        resource_id: String,
    },
    SkippedLimitExceeded {
        limit: LimitKind,
    },
    SkippedParentUnresolved,
    /// The store failed while creating or updating; nothing new was produced.
    SkippedStoreFailure {
        reason: String,
    },
    /// The store refused the delete. The resource is left behind unmapped.
    FailedDelete {
        kind: ResourceKind,
        resource_id: String,
        reason: String,
    },
}

impl Outcome {
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            Outcome::SkippedLimitExceeded { .. }
                | Outcome::SkippedParentUnresolved
                | Outcome::SkippedStoreFailure { .. }
                | Outcome::FailedDelete { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeOutcome {
    pub node_id: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// The value threaded through the phases of a run.
///
/// Each phase takes the state by value and hands back the next one. `previous` is
/// never modified; `retained` is `previous` minus everything the prune phase let
/// go of, and is what later phases consult to find existing resources. `mapping`
/// only ever contains entries for resources that exist after this run.
#[derive(Debug, Clone)]
pub struct ReconciliationState {
    previous: ResourceMapping,
    retained: ResourceMapping,
    mapping: ResourceMapping,
    depths: AHashMap<String, usize>,
    outcomes: Vec<NodeOutcome>,
    root_resource_id: Option<String>,
    edges_processed: usize,
}

impl ReconciliationState {
    pub fn new(previous: ResourceMapping) -> Self {
        Self {
            retained: previous.clone(),
            previous,
            mapping: ResourceMapping::new(),
            depths: AHashMap::new(),
            outcomes: Vec::new(),
            root_resource_id: None,
            edges_processed: 0,
        }
    }

    pub fn previous(&self) -> &ResourceMapping {
        &self.previous
    }

    pub fn retained(&self) -> &ResourceMapping {
        &self.retained
    }

    pub fn mapping(&self) -> &ResourceMapping {
        &self.mapping
    }

    pub fn outcomes(&self) -> &[NodeOutcome] {
        &self.outcomes
    }

    pub fn root_resource_id(&self) -> Option<&str> {
        self.root_resource_id.as_deref()
    }

    pub fn edges_processed(&self) -> usize {
        self.edges_processed
    }

    /// Nesting depth of the project produced by `node_id` in this run.
    pub fn depth_of(&self, node_id: &str) -> Option<usize> {
        self.depths.get(node_id).copied()
    }

    /// Drops a previous entry so later phases treat the node as new.
    pub(crate) fn release(mut self, node_id: &str) -> Self {
        self.retained.remove(node_id);
        self
    }

    pub(crate) fn record(mut self, node_id: &str, outcome: Outcome) -> Self {
        self.outcomes.push(NodeOutcome {
            node_id: node_id.to_string(),
            outcome,
        });
        self
    }

    /// Records a project the node maps to after this run.
    pub(crate) fn with_project(mut self, node_id: &str, resource_id: &str, depth: usize) -> Self {
        self.mapping
            .insert(node_id, MappedResource::project(resource_id));
        self.depths.insert(node_id.to_string(), depth);
        self
    }

    /// Records a project whose nesting depth the store could not report.
    pub(crate) fn with_project_of_unknown_depth(mut self, node_id: &str, resource_id: &str) -> Self {
        self.mapping
            .insert(node_id, MappedResource::project(resource_id));
        self
    }

    /// Records a task the node maps to after this run.
    pub(crate) fn with_task(mut self, node_id: &str, resource_id: &str) -> Self {
        self.mapping.insert(node_id, MappedResource::task(resource_id));
        self
    }

    pub(crate) fn with_root(mut self, resource_id: &str) -> Self {
        self.root_resource_id = Some(resource_id.to_string());
        self
    }

    pub(crate) fn with_edges_processed(mut self, count: usize) -> Self {
        self.edges_processed = count;
        self
    }

    /// Number of outcomes matching `pred`.
    pub fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.outcome)).count()
    }

    /// Consumes the state, yielding the mapping to persist and the root resource.
    pub fn into_mapping(self) -> (ResourceMapping, Option<String>) {
        (self.mapping, self.root_resource_id)
    }
}
