use super::state::{NodeOutcome, Outcome, ReconciliationState};
use crate::mapping::ResourceKind;
use serde::Serialize;

/// What a conversion run did, as returned to the caller.
///
/// Counts may be smaller than the submitted graph: skipped nodes are listed in
/// `outcomes` with their reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionSummary {
    pub root_resource_id: Option<String>,
    pub projects_created: usize,
    pub projects_updated: usize,
    pub tasks_created: usize,
    pub tasks_updated: usize,
    pub resources_deleted: usize,
    pub edges_processed: usize,
    pub skipped: usize,
    pub is_re_conversion: bool,
    pub message: String,
    pub outcomes: Vec<NodeOutcome>,
}

impl ConversionSummary {
    pub(super) fn from_state(state: &ReconciliationState, is_re_conversion: bool) -> Self {
        let created = |kind: ResourceKind| {
            state.count(|o| matches!(o, Outcome::Created { kind: k, .. } if *k == kind))
        };
        let updated = |kind: ResourceKind| {
            state.count(|o| matches!(o, Outcome::Updated { kind: k, .. } if *k == kind))
        };

        let projects_created = created(ResourceKind::Project);
        let tasks_created = created(ResourceKind::Task);
        let resources_deleted = state.count(|o| matches!(o, Outcome::Deleted { .. }));
        let skipped = state.count(Outcome::is_skip);

        let verb = if is_re_conversion {
            "re-converted"
        } else {
            "converted"
        };
        let mut message = format!(
            "Mind map {}: {} project(s) and {} task(s) created",
            verb, projects_created, tasks_created
        );
        if resources_deleted > 0 {
            message.push_str(&format!(", {} resource(s) deleted", resources_deleted));
        }
        if skipped > 0 {
            message.push_str(&format!(", {} node(s) skipped", skipped));
        }

        Self {
            root_resource_id: state.root_resource_id().map(str::to_string),
            projects_created,
            projects_updated: updated(ResourceKind::Project),
            tasks_created,
            tasks_updated: updated(ResourceKind::Task),
            resources_deleted,
            edges_processed: state.edges_processed(),
            skipped,
            is_re_conversion,
            message,
            outcomes: state.outcomes().to_vec(),
        }
    }

    /// Outcome recorded for `node_id`, if any. A node with more than one outcome
    /// reports its last.
    pub fn outcome_of(&self, node_id: &str) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .rev()
            .find(|o| o.node_id == node_id)
            .map(|o| &o.outcome)
    }
}
