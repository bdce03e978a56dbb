//! Subscription plan ceilings.
//!
//! How limits are computed is up to the host application; the engine only asks
//! yes/no questions through [`PlanLimits`]. [`QuotaTable`] is a ready-made,
//! configurable answer to those questions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Subscription tier of the converting owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Pro,
    Team,
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanTier::Free => write!(f, "free"),
            PlanTier::Pro => write!(f, "pro"),
            PlanTier::Team => write!(f, "team"),
        }
    }
}

/// Capacity checks consulted by the engine. All checks are read-then-act and
/// therefore soft under concurrent creation elsewhere.
pub trait PlanLimits: Send + Sync {
    /// Whether the tier includes mind map conversion at all.
    fn allows_conversion(&self, plan: PlanTier) -> bool;
    fn can_create_root_project(&self, plan: PlanTier, current_count: usize) -> bool;
    /// Whether a project at `parent_depth` may receive a subproject.
    fn can_create_subproject(&self, plan: PlanTier, parent_depth: usize) -> bool;
    fn can_create_mind_map_with_node_count(&self, plan: PlanTier, count: usize) -> bool;
    fn can_create_task(&self, plan: PlanTier, current_count: usize) -> bool;
}

/// Ceilings for a single tier. `None` means unlimited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanQuota {
    pub conversion_enabled: bool,
    pub max_root_projects: Option<usize>,
    /// Deepest allowed subproject; top-level projects are depth 0.
    pub max_nesting_depth: Option<usize>,
    pub max_tasks: Option<usize>,
    pub max_mind_map_nodes: Option<usize>,
}

impl PlanQuota {
    /// No ceilings at all.
    pub fn unlimited() -> Self {
        Self {
            conversion_enabled: true,
            max_root_projects: None,
            max_nesting_depth: None,
            max_tasks: None,
            max_mind_map_nodes: None,
        }
    }

    pub fn with_max_tasks(mut self, max: usize) -> Self {
        self.max_tasks = Some(max);
        self
    }

    pub fn with_max_nesting_depth(mut self, max: usize) -> Self {
        self.max_nesting_depth = Some(max);
        self
    }

    pub fn with_max_root_projects(mut self, max: usize) -> Self {
        self.max_root_projects = Some(max);
        self
    }

    pub fn with_max_mind_map_nodes(mut self, max: usize) -> Self {
        self.max_mind_map_nodes = Some(max);
        self
    }
}

impl Default for PlanQuota {
    fn default() -> Self {
        Self::unlimited()
    }
}

fn under(ceiling: Option<usize>, value: usize) -> bool {
    ceiling.is_none_or(|max| value < max)
}

/// A single quota applies to every tier.
impl PlanLimits for PlanQuota {
    fn allows_conversion(&self, _plan: PlanTier) -> bool {
        self.conversion_enabled
    }

    fn can_create_root_project(&self, _plan: PlanTier, current_count: usize) -> bool {
        under(self.max_root_projects, current_count)
    }

    fn can_create_subproject(&self, _plan: PlanTier, parent_depth: usize) -> bool {
        self.max_nesting_depth
            .is_none_or(|max| parent_depth.saturating_add(1) <= max)
    }

    fn can_create_mind_map_with_node_count(&self, _plan: PlanTier, count: usize) -> bool {
        self.max_mind_map_nodes.is_none_or(|max| count <= max)
    }

    fn can_create_task(&self, _plan: PlanTier, current_count: usize) -> bool {
        under(self.max_tasks, current_count)
    }
}

/// One quota per tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaTable {
    pub free: PlanQuota,
    pub pro: PlanQuota,
    pub team: PlanQuota,
}

impl QuotaTable {
    pub fn quota(&self, plan: PlanTier) -> &PlanQuota {
        match plan {
            PlanTier::Free => &self.free,
            PlanTier::Pro => &self.pro,
            PlanTier::Team => &self.team,
        }
    }
}

impl Default for QuotaTable {
    fn default() -> Self {
        Self {
            free: PlanQuota {
                conversion_enabled: false,
                max_root_projects: Some(3),
                max_nesting_depth: Some(1),
                max_tasks: Some(50),
                max_mind_map_nodes: Some(50),
            },
            pro: PlanQuota {
                conversion_enabled: true,
                max_root_projects: Some(25),
                max_nesting_depth: Some(3),
                max_tasks: Some(1_000),
                max_mind_map_nodes: Some(500),
            },
            team: PlanQuota {
                conversion_enabled: true,
                max_root_projects: None,
                max_nesting_depth: Some(5),
                max_tasks: None,
                max_mind_map_nodes: Some(2_000),
            },
        }
    }
}

impl PlanLimits for QuotaTable {
    fn allows_conversion(&self, plan: PlanTier) -> bool {
        self.quota(plan).allows_conversion(plan)
    }

    fn can_create_root_project(&self, plan: PlanTier, current_count: usize) -> bool {
        self.quota(plan).can_create_root_project(plan, current_count)
    }

    fn can_create_subproject(&self, plan: PlanTier, parent_depth: usize) -> bool {
        self.quota(plan).can_create_subproject(plan, parent_depth)
    }

    fn can_create_mind_map_with_node_count(&self, plan: PlanTier, count: usize) -> bool {
        self.quota(plan)
            .can_create_mind_map_with_node_count(plan, count)
    }

    fn can_create_task(&self, plan: PlanTier, current_count: usize) -> bool {
        self.quota(plan).can_create_task(plan, current_count)
    }
}
