use super::PhaseContext;
use super::hierarchy::HierarchyBuilder;
use super::leaves::LeafMaterializer;
use super::state::{Outcome, ReconciliationState};
use crate::classify::{Classification, LeafMetadata};
use crate::error::{HierarchyError, LeafError, StoreError};
use crate::graph::MindMapNode;
use crate::mapping::{MappedResource, ResourceKind};
use crate::store::{ProjectContent, TaskContent};
use tracing::{debug, warn};

pub(super) fn project_content(node: &MindMapNode) -> ProjectContent {
    ProjectContent {
        name: node.label.clone(),
        description: node.description.clone(),
        color: node.color.clone(),
    }
}

pub(super) fn task_content(node: &MindMapNode, meta: &LeafMetadata) -> TaskContent {
    TaskContent {
        title: node.label.clone(),
        description: node.description.clone(),
        priority: meta.priority,
        due_date: meta.due_date,
        start_date: meta.start_date,
    }
}

/// The project a new child of `parent_node` goes into, with that project's depth
/// when it is known.
///
/// A parent still mapped to a task (its subproject could not be created this run)
/// resolves to the root project instead.
pub(super) fn parent_project(
    state: &ReconciliationState,
    classification: &Classification,
    parent_node: &str,
) -> Option<(String, Option<usize>)> {
    let parent = state.mapping().get(parent_node)?;
    match parent.kind {
        ResourceKind::Project => Some((parent.id.clone(), state.depth_of(parent_node))),
        ResourceKind::Task => {
            let root = state.root_resource_id()?;
            Some((root.to_string(), state.depth_of(classification.root_id())))
        }
    }
}

/// Deletes the task a node produced before it gained children.
pub(super) fn retire_task(
    ctx: &mut PhaseContext<'_>,
    state: ReconciliationState,
    node_id: &str,
    task_id: &str,
) -> ReconciliationState {
    let outcome = match ctx.store.delete_task(task_id) {
        Ok(()) => {
            debug!(node_id, task_id, "deleted task replaced by a project");
            Outcome::Deleted {
                kind: ResourceKind::Task,
                resource_id: task_id.to_string(),
            }
        }
        Err(e) => {
            warn!(node_id, task_id, reason = %e, "replaced task not deleted; left unmapped");
            Outcome::FailedDelete {
                kind: ResourceKind::Task,
                resource_id: task_id.to_string(),
                reason: e.to_string(),
            }
        }
    };
    state.record(node_id, outcome)
}

/// Keeps a node on its old task when its project could not be created.
pub(super) fn keep_task(
    state: ReconciliationState,
    node_id: &str,
    task_id: Option<&str>,
) -> ReconciliationState {
    match task_id {
        Some(task_id) => state.with_task(node_id, task_id),
        None => state,
    }
}

/// Updates the resource a node is already mapped to, as the kind it was mapped to.
///
/// A failed update keeps the entry since the resource still exists, unless the
/// store reports it gone; then the entry is dropped and the next run recreates it.
pub(super) fn update_in_place(
    ctx: &mut PhaseContext<'_>,
    state: ReconciliationState,
    node: &MindMapNode,
    existing: &MappedResource,
) -> ReconciliationState {
    let result = match existing.kind {
        ResourceKind::Project => {
            HierarchyBuilder::new(&mut *ctx.store, ctx.limits, ctx.plan, ctx.owner)
                .update(&existing.id, &project_content(node))
                .map_err(|e| {
                    let gone = matches!(e, HierarchyError::Store(StoreError::NotFound { .. }));
                    (gone, e.to_string())
                })
        }
        ResourceKind::Task => {
            LeafMaterializer::new(&mut *ctx.store, ctx.limits, ctx.plan, ctx.owner)
                .update(&existing.id, &task_content(node, &LeafMetadata::from(&node.metadata)))
                .map_err(|e| {
                    let gone = matches!(e, LeafError::Store(StoreError::NotFound { .. }));
                    (gone, e.to_string())
                })
        }
    };

    match result {
        Ok(()) => {
            debug!(node_id = %node.id, kind = %existing.kind, resource_id = %existing.id, "updated resource");
            keep(ctx, state, node, existing).record(
                &node.id,
                Outcome::Updated {
                    kind: existing.kind,
                    resource_id: existing.id.clone(),
                },
            )
        }
        Err((gone, reason)) => {
            warn!(
                node_id = %node.id,
                kind = %existing.kind,
                resource_id = %existing.id,
                reason = %reason,
                "update failed"
            );
            let state = if gone {
                state
            } else {
                keep(ctx, state, node, existing)
            };
            state.record(&node.id, Outcome::SkippedStoreFailure { reason })
        }
    }
}

fn keep(
    ctx: &PhaseContext<'_>,
    state: ReconciliationState,
    node: &MindMapNode,
    existing: &MappedResource,
) -> ReconciliationState {
    match existing.kind {
        ResourceKind::Project => match ctx.store.project_depth(&existing.id) {
            Ok(depth) => state.with_project(&node.id, &existing.id, depth),
            Err(e) => {
                warn!(node_id = %node.id, resource_id = %existing.id, reason = %e, "project depth unavailable");
                state.with_project_of_unknown_depth(&node.id, &existing.id)
            }
        },
        ResourceKind::Task => state.with_task(&node.id, &existing.id),
    }
}
