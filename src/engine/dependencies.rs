use super::PhaseContext;
use super::state::ReconciliationState;
use crate::graph::MindMapEdge;
use crate::mapping::{ResourceKind, ResourceMapping};
use itertools::Itertools;
use tracing::{debug, warn};

/// A dependency to persist: `task_id` depends on `depends_on_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyLink {
    pub edge_id: String,
    pub task_id: String,
    pub depends_on_id: String,
}

/// Translates graph edges into task dependencies.
///
/// Only edges whose endpoints both map to tasks survive. Self-loops are dropped and
/// repeated source/target pairs are emitted once, keeping the first edge.
pub fn translate_dependencies(
    mapping: &ResourceMapping,
    edges: &[MindMapEdge],
) -> Vec<DependencyLink> {
    edges
        .iter()
        .filter_map(|edge| {
            let task_id = mapping.resource_of(&edge.source, ResourceKind::Task)?;
            let depends_on_id = mapping.resource_of(&edge.target, ResourceKind::Task)?;
            (task_id != depends_on_id).then(|| DependencyLink {
                edge_id: edge.id.clone(),
                task_id: task_id.to_string(),
                depends_on_id: depends_on_id.to_string(),
            })
        })
        .unique_by(|link| (link.task_id.clone(), link.depends_on_id.clone()))
        .collect()
}

/// Persists every translated dependency; failures are logged and skipped.
pub(super) fn run(ctx: &mut PhaseContext<'_>, state: ReconciliationState) -> ReconciliationState {
    let links = translate_dependencies(state.mapping(), &ctx.graph.edges);
    let ignored = ctx.graph.edges.len() - links.len();
    if ignored > 0 {
        debug!(ignored, "edges without a task on both ends ignored");
    }

    let mut processed = 0;
    for link in &links {
        match ctx
            .store
            .set_task_dependency(&link.task_id, &link.depends_on_id)
        {
            Ok(()) => processed += 1,
            Err(e) => warn!(
                edge_id = %link.edge_id,
                task_id = %link.task_id,
                depends_on_id = %link.depends_on_id,
                reason = %e,
                "dependency not set"
            ),
        }
    }
    state.with_edges_processed(processed)
}
