use super::PhaseContext;
use super::existing::{self, task_content};
use super::state::{LimitKind, Outcome, ReconciliationState};
use crate::classify::NodeRole;
use crate::error::LeafError;
use crate::limits::{PlanLimits, PlanTier};
use crate::mapping::ResourceKind;
use crate::store::{NewTask, Owner, ResourceStore, TaskContent};
use tracing::{debug, warn};

/// Creates and updates tasks while honoring the plan's total task ceiling.
pub struct LeafMaterializer<'a> {
    store: &'a mut dyn ResourceStore,
    limits: &'a dyn PlanLimits,
    plan: PlanTier,
    owner: &'a Owner,
}

impl<'a> LeafMaterializer<'a> {
    pub fn new(
        store: &'a mut dyn ResourceStore,
        limits: &'a dyn PlanLimits,
        plan: PlanTier,
        owner: &'a Owner,
    ) -> Self {
        Self {
            store,
            limits,
            plan,
            owner,
        }
    }

    /// Creates a task in `project_id`, counting the owner's existing tasks first.
    pub fn create(&mut self, project_id: &str, content: TaskContent) -> Result<String, LeafError> {
        let current = self.store.count_tasks_for_owner(self.owner)?;
        if !self.limits.can_create_task(self.plan, current) {
            return Err(LeafError::TaskLimitExceeded { current });
        }
        Ok(self.store.create_task(
            self.owner,
            &NewTask {
                content,
                project_id: project_id.to_string(),
            },
        )?)
    }

    pub fn update(&mut self, id: &str, content: &TaskContent) -> Result<(), LeafError> {
        Ok(self.store.update_task(id, content)?)
    }
}

/// Creates or updates a task for every leaf node.
///
/// A leaf already mapped keeps its resource, even a project. A new task goes into
/// the project of the leaf's parent.
pub(super) fn run(ctx: &mut PhaseContext<'_>, state: ReconciliationState) -> ReconciliationState {
    let graph = ctx.graph;
    let classification = ctx.classification;
    let mut state = state;

    for leaf_id in classification.leaves() {
        let (Some(node), Some(NodeRole::Leaf(meta))) =
            (graph.node(leaf_id), classification.role(leaf_id))
        else {
            continue;
        };

        if let Some(existing) = state.retained().get(leaf_id).cloned() {
            state = existing::update_in_place(ctx, state, node, &existing);
            continue;
        }

        let parent = classification
            .effective_parent(node)
            .and_then(|p| existing::parent_project(&state, classification, p));
        let Some((project_id, _)) = parent else {
            warn!(node_id = leaf_id, "parent not mapped; leaf skipped");
            state = state.record(leaf_id, Outcome::SkippedParentUnresolved);
            continue;
        };

        let mut materializer =
            LeafMaterializer::new(&mut *ctx.store, ctx.limits, ctx.plan, ctx.owner);
        state = match materializer.create(&project_id, task_content(node, meta)) {
            Ok(resource_id) => {
                debug!(node_id = leaf_id, %resource_id, %project_id, "created task");
                state.with_task(leaf_id, &resource_id).record(
                    leaf_id,
                    Outcome::Created {
                        kind: ResourceKind::Task,
                        resource_id: resource_id.clone(),
                    },
                )
            }
            Err(LeafError::TaskLimitExceeded { current }) => {
                warn!(node_id = leaf_id, current, "task ceiling reached; leaf skipped");
                state.record(
                    leaf_id,
                    Outcome::SkippedLimitExceeded {
                        limit: LimitKind::Tasks,
                    },
                )
            }
            Err(LeafError::Store(e)) => {
                warn!(node_id = leaf_id, reason = %e, "task not created");
                state.record(
                    leaf_id,
                    Outcome::SkippedStoreFailure {
                        reason: e.to_string(),
                    },
                )
            }
        };
    }
    state
}
