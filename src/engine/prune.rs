use super::PhaseContext;
use super::state::{Outcome, ReconciliationState};
use crate::mapping::ResourceKind;
use itertools::Itertools;
use std::cmp::Reverse;
use tracing::{debug, warn};

/// Deletes resources whose node disappeared from the graph.
///
/// Tasks go first, then projects from the deepest up, so a removed subtree can be
/// deleted even by a store that refuses to delete non-empty projects. A failed delete
/// does not abort the run; the entry is still dropped.
pub(super) fn run(ctx: &mut PhaseContext<'_>, state: ReconciliationState) -> ReconciliationState {
    let classification = ctx.classification;
    let targets: Vec<(String, ResourceKind, String)> = state
        .previous()
        .iter()
        .filter(|(node_id, _)| classification.role(node_id).is_none())
        .map(|(node_id, resource)| (node_id.to_string(), resource.kind, resource.id.clone()))
        .collect();

    if targets.is_empty() {
        return state;
    }

    let (tasks, projects): (Vec<_>, Vec<_>) = targets
        .into_iter()
        .partition(|(_, kind, _)| *kind == ResourceKind::Task);

    let projects = projects
        .into_iter()
        .map(|target| {
            // Unknown depths sort last, after anything that might be nested in them.
            let depth = match ctx.store.project_depth(&target.2) {
                Ok(depth) => depth,
                Err(e) => {
                    warn!(node_id = %target.0, resource_id = %target.2, reason = %e, "project depth unavailable");
                    0
                }
            };
            (target, depth)
        })
        .sorted_by_key(|(_, depth)| Reverse(*depth))
        .map(|(target, _)| target);

    let mut state = state;
    for (node_id, kind, resource_id) in tasks.into_iter().chain(projects) {
        let result = match kind {
            ResourceKind::Task => ctx.store.delete_task(&resource_id),
            ResourceKind::Project => ctx.store.delete_project(&resource_id),
        };
        let outcome = match result {
            Ok(()) => {
                debug!(node_id = %node_id, %kind, resource_id = %resource_id, "deleted resource");
                Outcome::Deleted { kind, resource_id }
            }
            Err(e) => {
                warn!(
                    node_id = %node_id,
                    %kind,
                    resource_id = %resource_id,
                    reason = %e,
                    "delete failed; resource left unmapped"
                );
                Outcome::FailedDelete {
                    kind,
                    resource_id,
                    reason: e.to_string(),
                }
            }
        };
        state = state.release(&node_id).record(&node_id, outcome);
    }
    state
}
