use crate::classify::{Classification, classify};
use crate::config::{BranchOrdering, EngineConfig};
use crate::error::ConversionError;
use crate::graph::{GraphDefinition, parse_graph};
use crate::limits::{PlanLimits, PlanTier};
use crate::store::{ConversionRecord, MindMapRepository, Owner, PermissionChecker, ResourceStore};
use chrono::Utc;
use std::time::Duration;
use tracing::{info, info_span};

mod dependencies;
mod existing;
mod hierarchy;
mod leaves;
mod lock;
mod prune;
mod state;
mod summary;

pub use dependencies::{DependencyLink, translate_dependencies};
pub use hierarchy::HierarchyBuilder;
pub use leaves::LeafMaterializer;
pub use lock::{ConversionLease, ConversionLocks};
pub use state::{LimitKind, NodeOutcome, Outcome, ReconciliationState};
pub use summary::ConversionSummary;

/// A graph submitted alongside a conversion request, replacing the stored one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphPayload {
    pub nodes: String,
    pub edges: String,
}

/// A request to convert (or re-convert) one mind map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub mind_map_id: String,
    pub user_id: String,
    pub plan: PlanTier,
    pub graph: Option<GraphPayload>,
}

impl ConversionRequest {
    /// Converts the graph currently stored on the mind map.
    pub fn new(mind_map_id: impl Into<String>, user_id: impl Into<String>, plan: PlanTier) -> Self {
        Self {
            mind_map_id: mind_map_id.into(),
            user_id: user_id.into(),
            plan,
            graph: None,
        }
    }

    /// Submits a new node/edge list with the request.
    pub fn with_graph(mut self, nodes: impl Into<String>, edges: impl Into<String>) -> Self {
        self.graph = Some(GraphPayload {
            nodes: nodes.into(),
            edges: edges.into(),
        });
        self
    }
}

/// Everything a phase needs besides the state it threads.
pub(crate) struct PhaseContext<'a> {
    pub store: &'a mut dyn ResourceStore,
    pub limits: &'a dyn PlanLimits,
    pub plan: PlanTier,
    pub owner: &'a Owner,
    pub graph: &'a GraphDefinition,
    pub classification: &'a Classification,
    pub ordering: BranchOrdering,
}

/// The mind map reconciliation engine.
///
/// A `Reconciler` is built once and reused for any number of conversions; it holds
/// the plan limits, the permission gate, its configuration and the lease table.
/// Resource and mind map storage are passed per call.
pub struct Reconciler {
    limits: Box<dyn PlanLimits>,
    permissions: Box<dyn PermissionChecker>,
    config: EngineConfig,
    locks: ConversionLocks,
}

pub struct ReconcilerBuilder {
    limits: Box<dyn PlanLimits>,
    permissions: Box<dyn PermissionChecker>,
    config: EngineConfig,
    locks: ConversionLocks,
}

impl ReconcilerBuilder {
    pub fn new(
        limits: impl PlanLimits + 'static,
        permissions: impl PermissionChecker + 'static,
    ) -> Self {
        Self {
            limits: Box::new(limits),
            permissions: Box::new(permissions),
            config: EngineConfig::default(),
            locks: ConversionLocks::new(),
        }
    }
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }
    pub fn with_branch_ordering(mut self, ordering: BranchOrdering) -> Self {
        self.config.branch_ordering = ordering;
        self
    }
    pub fn with_lock_ttl(mut self, ttl: Duration) -> Self {
        self.config.lock_ttl_ms = ttl.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }
    /// Shares a lease table with other reconcilers.
    pub fn with_locks(mut self, locks: ConversionLocks) -> Self {
        self.locks = locks;
        self
    }
    pub fn build(self) -> Reconciler {
        Reconciler {
            limits: self.limits,
            permissions: self.permissions,
            config: self.config,
            locks: self.locks,
        }
    }
}

impl Reconciler {
    pub fn builder(
        limits: impl PlanLimits + 'static,
        permissions: impl PermissionChecker + 'static,
    ) -> ReconcilerBuilder {
        ReconcilerBuilder::new(limits, permissions)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn locks(&self) -> &ConversionLocks {
        &self.locks
    }

    /// Converts a mind map into projects and tasks, reconciling against the mapping
    /// left by the previous conversion.
    ///
    /// Runs under a lease on the mind map. Everything that can reject the request
    /// (missing mind map, permission, tier, malformed or empty graph, node ceiling)
    /// is checked before the store is touched. After that, per-node failures are
    /// recorded in the summary and never abort the run.
    ///
    /// # Returns
    ///
    /// * `Ok(ConversionSummary)`: the run completed and the new mapping was persisted.
    /// * `Err(ConversionError)`: the request was rejected, or the mind map record could
    ///   not be read or written. In the latter case resources touched before the
    ///   failure are not rolled back.
    pub fn convert(
        &self,
        store: &mut dyn ResourceStore,
        mind_maps: &mut dyn MindMapRepository,
        request: ConversionRequest,
    ) -> Result<ConversionSummary, ConversionError> {
        let span = info_span!("convert", mind_map_id = %request.mind_map_id, plan = %request.plan);
        let _entered = span.enter();

        let _lease = self
            .locks
            .acquire(&request.mind_map_id, self.config.lock_ttl())?;

        let mind_map = mind_maps
            .load(&request.mind_map_id)
            .map_err(|e| ConversionError::Internal(e.to_string()))?
            .ok_or_else(|| ConversionError::MindMapNotFound(request.mind_map_id.clone()))?;

        if !self
            .permissions
            .can_convert(&request.user_id, &request.mind_map_id)
        {
            return Err(ConversionError::PermissionDenied {
                user_id: request.user_id,
                mind_map_id: request.mind_map_id,
            });
        }
        if !self.limits.allows_conversion(request.plan) {
            return Err(ConversionError::TierInsufficient(request.plan));
        }

        let (nodes_json, edges_json) = match &request.graph {
            Some(payload) => (payload.nodes.as_str(), payload.edges.as_str()),
            None => (mind_map.nodes.as_str(), mind_map.edges.as_str()),
        };
        let graph = parse_graph(nodes_json, edges_json)?;
        if !self
            .limits
            .can_create_mind_map_with_node_count(request.plan, graph.nodes.len())
        {
            return Err(ConversionError::NodeLimitExceeded {
                count: graph.nodes.len(),
            });
        }

        let classification = classify(&graph);
        let is_re_conversion = mind_map.is_converted;
        info!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            previous_entries = mind_map.mapping.len(),
            is_re_conversion,
            "starting conversion"
        );

        let mut ctx = PhaseContext {
            store,
            limits: self.limits.as_ref(),
            plan: request.plan,
            owner: &mind_map.owner,
            graph: &graph,
            classification: &classification,
            ordering: self.config.branch_ordering,
        };
        let state = ReconciliationState::new(mind_map.mapping.clone());
        let state = prune::run(&mut ctx, state);
        let state = hierarchy::run_root(&mut ctx, state);
        let state = hierarchy::run_branches(&mut ctx, state);
        let state = leaves::run(&mut ctx, state);
        let state = dependencies::run(&mut ctx, state);

        let summary = ConversionSummary::from_state(&state, is_re_conversion);
        let (mapping, root_resource_id) = state.into_mapping();

        mind_maps
            .record_conversion(
                &request.mind_map_id,
                ConversionRecord {
                    mapping,
                    converted_at: Utc::now(),
                    root_resource_id,
                    graph: request.graph.map(|g| (g.nodes, g.edges)),
                },
            )
            .map_err(|e| ConversionError::Internal(e.to_string()))?;

        info!(
            projects_created = summary.projects_created,
            tasks_created = summary.tasks_created,
            tasks_updated = summary.tasks_updated,
            resources_deleted = summary.resources_deleted,
            edges_processed = summary.edges_processed,
            skipped = summary.skipped,
            "conversion finished"
        );
        Ok(summary)
    }
}
