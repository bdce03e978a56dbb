use super::PhaseContext;
use super::existing::{self, project_content};
use super::state::{LimitKind, Outcome, ReconciliationState};
use crate::classify::NodeRole;
use crate::error::{HierarchyError, StoreError};
use crate::limits::{PlanLimits, PlanTier};
use crate::mapping::{MappedResource, ResourceKind};
use crate::store::{NewProject, Owner, ProjectContent, ResourceStore};
use tracing::{debug, warn};

/// Creates and updates projects while honoring the plan's root-count and
/// nesting-depth ceilings.
pub struct HierarchyBuilder<'a> {
    store: &'a mut dyn ResourceStore,
    limits: &'a dyn PlanLimits,
    plan: PlanTier,
    owner: &'a Owner,
}

impl<'a> HierarchyBuilder<'a> {
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

    /// Creates a new top-level project. Returns its id and depth (always 0).
    pub fn create_root(
        &mut self,
        content: ProjectContent,
    ) -> Result<(String, usize), HierarchyError> {
        let current = self.store.count_root_projects(self.owner)?;
        if !self.limits.can_create_root_project(self.plan, current) {
            return Err(HierarchyError::RootLimitExceeded { current });
        }
        let id = self.store.create_project(
            self.owner,
            &NewProject {
                content,
                parent_id: None,
            },
        )?;
        Ok((id, 0))
    }

    /// Creates a subproject under `parent_id`. Returns its id and depth
    /// (`parent_depth + 1`).
    pub fn create_subproject(
        &mut self,
        parent_id: &str,
        parent_depth: usize,
        content: ProjectContent,
    ) -> Result<(String, usize), HierarchyError> {
        if !self.limits.can_create_subproject(self.plan, parent_depth) {
            return Err(HierarchyError::NestingLimitExceeded { parent_depth });
        }
        let id = self.store.create_project(
            self.owner,
            &NewProject {
                content,
                parent_id: Some(parent_id.to_string()),
            },
        )?;
        Ok((id, parent_depth + 1))
    }

    pub fn update(&mut self, id: &str, content: &ProjectContent) -> Result<(), HierarchyError> {
        Ok(self.store.update_project(id, content)?)
    }

    pub fn depth_of(&self, id: &str) -> Result<usize, StoreError> {
        self.store.project_depth(id)
    }
}

fn creation_failure(node_id: &str, error: HierarchyError) -> Outcome {
    warn!(node_id, reason = %error, "project not created");
    match error {
        HierarchyError::NestingLimitExceeded { .. } => Outcome::SkippedLimitExceeded {
            limit: LimitKind::NestingDepth,
        },
        HierarchyError::RootLimitExceeded { .. } => Outcome::SkippedLimitExceeded {
            limit: LimitKind::RootProjects,
        },
        HierarchyError::Store(e) => Outcome::SkippedStoreFailure {
            reason: e.to_string(),
        },
    }
}

/// Splits a retained entry into the project to update in place, or the task a
/// new project replaces.
fn retained_for_project(
    state: &ReconciliationState,
    node_id: &str,
) -> (Option<MappedResource>, Option<String>) {
    match state.retained().get(node_id) {
        Some(existing) if existing.kind == ResourceKind::Project => (Some(existing.clone()), None),
        Some(existing) => (None, Some(existing.id.clone())),
        None => (None, None),
    }
}

/// Creates or updates the root project.
///
/// A root that produced a task in an earlier run gets a new project; the task is
/// deleted once the project exists.
pub(super) fn run_root(
    ctx: &mut PhaseContext<'_>,
    state: ReconciliationState,
) -> ReconciliationState {
    let graph = ctx.graph;
    let classification = ctx.classification;
    let root_id = classification.root_id();
    let Some(node) = graph.node(root_id) else {
        return state;
    };
    let attach_to = match classification.role(root_id) {
        Some(NodeRole::Root(meta)) => meta.parent_project_id.clone(),
        _ => None,
    };

    let (project, stale_task) = retained_for_project(&state, root_id);
    if let Some(existing) = project {
        let state = existing::update_in_place(ctx, state, node, &existing);
        let root = state
            .mapping()
            .resource_of(root_id, ResourceKind::Project)
            .map(str::to_string);
        return match root {
            Some(root) => state.with_root(&root),
            None => state,
        };
    }

    let mut builder = HierarchyBuilder::new(&mut *ctx.store, ctx.limits, ctx.plan, ctx.owner);
    let created = match attach_to {
        Some(parent_project_id) => match builder.depth_of(&parent_project_id) {
            Ok(parent_depth) => {
                builder.create_subproject(&parent_project_id, parent_depth, project_content(node))
            }
            Err(e) => {
                warn!(node_id = %node.id, %parent_project_id, reason = %e, "target parent project unavailable");
                let state = state.record(&node.id, Outcome::SkippedParentUnresolved);
                return existing::keep_task(state, &node.id, stale_task.as_deref());
            }
        },
        None => builder.create_root(project_content(node)),
    };

    match created {
        Ok((resource_id, depth)) => {
            debug!(node_id = %node.id, %resource_id, depth, "created root project");
            let state = match &stale_task {
                Some(task_id) => existing::retire_task(ctx, state, &node.id, task_id),
                None => state,
            };
            state
                .with_project(&node.id, &resource_id, depth)
                .with_root(&resource_id)
                .record(
                    &node.id,
                    Outcome::Created {
                        kind: ResourceKind::Project,
                        resource_id: resource_id.clone(),
                    },
                )
        }
        Err(e) => {
            let state = state.record(&node.id, creation_failure(&node.id, e));
            existing::keep_task(state, &node.id, stale_task.as_deref())
        }
    }
}

/// Creates or updates a subproject for every branch node, in the configured order.
///
/// A branch already mapped to a project keeps it. A node that produced a task
/// before it gained children gets a subproject, and the task is deleted once the
/// subproject exists. Creating needs the parent's project from this run; a branch
/// whose parent has not been mapped is skipped.
pub(super) fn run_branches(
    ctx: &mut PhaseContext<'_>,
    state: ReconciliationState,
) -> ReconciliationState {
    let graph = ctx.graph;
    let classification = ctx.classification;
    let mut state = state;

    for branch_id in classification.branches(ctx.ordering) {
        let Some(node) = graph.node(branch_id) else {
            continue;
        };

        let (project, stale_task) = retained_for_project(&state, branch_id);
        if let Some(existing) = project {
            state = existing::update_in_place(ctx, state, node, &existing);
            continue;
        }

        let parent = classification
            .effective_parent(node)
            .and_then(|p| existing::parent_project(&state, classification, p));
        let Some((parent_resource, parent_depth)) = parent else {
            warn!(node_id = branch_id, "parent not mapped; branch skipped");
            state = state.record(branch_id, Outcome::SkippedParentUnresolved);
            state = existing::keep_task(state, branch_id, stale_task.as_deref());
            continue;
        };
        let parent_depth = match parent_depth {
            Some(depth) => depth,
            None => match ctx.store.project_depth(&parent_resource) {
                Ok(depth) => depth,
                Err(e) => {
                    warn!(node_id = branch_id, %parent_resource, reason = %e, "parent depth unavailable; branch skipped");
                    state = state.record(
                        branch_id,
                        Outcome::SkippedStoreFailure {
                            reason: e.to_string(),
                        },
                    );
                    state = existing::keep_task(state, branch_id, stale_task.as_deref());
                    continue;
                }
            },
        };

        let mut builder = HierarchyBuilder::new(&mut *ctx.store, ctx.limits, ctx.plan, ctx.owner);
        let created = builder.create_subproject(&parent_resource, parent_depth, project_content(node));
        state = match created {
            Ok((resource_id, depth)) => {
                debug!(node_id = branch_id, %resource_id, depth, "created subproject");
                let state = match &stale_task {
                    Some(task_id) => existing::retire_task(ctx, state, branch_id, task_id),
                    None => state,
                };
                state.with_project(branch_id, &resource_id, depth).record(
                    branch_id,
                    Outcome::Created {
                        kind: ResourceKind::Project,
                        resource_id: resource_id.clone(),
                    },
                )
            }
            Err(e) => {
                let state = state.record(branch_id, creation_failure(branch_id, e));
                existing::keep_task(state, branch_id, stale_task.as_deref())
            }
        };
    }
    state
}
