//! An in-memory project/task store and mind map repository.
//!
//! Mirrors the behavior expected from a relational backend closely enough to drive
//! the engine end to end: projects refuse to be deleted while they still contain
//! subprojects or tasks, and counts are scoped per owner. A [`MemoryWorkspace`]
//! bundles both halves and can be snapshotted to disk with bincode.

use crate::error::{SnapshotError, StoreError};
use crate::store::{
    ConversionRecord, MindMap, MindMapRepository, NewProject, NewTask, Owner, ProjectContent,
    ResourceStore, TaskContent,
};
use ahash::{AHashMap, AHashSet};
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fs;
use std::io::{Read, Write};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProjectRecord {
    pub id: String,
    pub owner: Owner,
    pub content: ProjectContent,
    pub parent_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TaskRecord {
    pub id: String,
    pub owner: Owner,
    pub content: TaskContent,
    pub project_id: String,
    pub depends_on: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct MemoryStore {
    projects: AHashMap<String, ProjectRecord>,
    tasks: AHashMap<String, TaskRecord>,
    next_id: u64,
    /// Resource ids whose update/delete fails with a backend error.
    #[serde(skip)]
    failing: AHashSet<String>,
    /// Project ids whose depth lookup fails.
    #[serde(skip)]
    failing_depth: AHashSet<String>,
    /// Number of `ResourceStore` calls made so far.
    #[serde(skip)]
    calls: Cell<usize>,
}

fn project_missing(id: &str) -> StoreError {
    StoreError::NotFound {
        entity: "project",
        id: id.to_string(),
    }
}

fn task_missing(id: &str) -> StoreError {
    StoreError::NotFound {
        entity: "task",
        id: id.to_string(),
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(&self, id: &str) -> Option<&ProjectRecord> {
        self.projects.get(id)
    }

    pub fn task(&self, id: &str) -> Option<&TaskRecord> {
        self.tasks.get(id)
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Makes every update and delete of `resource_id` fail.
    pub fn fail_on(&mut self, resource_id: impl Into<String>) {
        self.failing.insert(resource_id.into());
    }

    /// Makes `project_depth` fail for `project_id`.
    pub fn fail_depth_on(&mut self, project_id: impl Into<String>) {
        self.failing_depth.insert(project_id.into());
    }

    /// Number of store operations performed, reads included.
    pub fn store_calls(&self) -> usize {
        self.calls.get()
    }

    fn touch(&self) {
        self.calls.set(self.calls.get() + 1);
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn check_failing(&self, id: &str) -> Result<(), StoreError> {
        if self.failing.contains(id) {
            return Err(StoreError::Backend(format!("injected failure for '{}'", id)));
        }
        Ok(())
    }
}

impl ResourceStore for MemoryStore {
    fn create_project(&mut self, owner: &Owner, project: &NewProject) -> Result<String, StoreError> {
        self.touch();
        if let Some(parent_id) = &project.parent_id {
            if !self.projects.contains_key(parent_id) {
                return Err(project_missing(parent_id));
            }
        }
        let id = self.next_id("project");
        self.projects.insert(
            id.clone(),
            ProjectRecord {
                id: id.clone(),
                owner: owner.clone(),
                content: project.content.clone(),
                parent_id: project.parent_id.clone(),
            },
        );
        Ok(id)
    }

    fn update_project(&mut self, id: &str, content: &ProjectContent) -> Result<(), StoreError> {
        self.touch();
        self.check_failing(id)?;
        let project = self.projects.get_mut(id).ok_or_else(|| project_missing(id))?;
        project.content = content.clone();
        Ok(())
    }

    fn delete_project(&mut self, id: &str) -> Result<(), StoreError> {
        self.touch();
        self.check_failing(id)?;
        if !self.projects.contains_key(id) {
            return Err(project_missing(id));
        }
        let has_children = self
            .projects
            .values()
            .any(|p| p.parent_id.as_deref() == Some(id))
            || self.tasks.values().any(|t| t.project_id == id);
        if has_children {
            return Err(StoreError::Rejected(format!(
                "project '{}' still contains subprojects or tasks",
                id
            )));
        }
        self.projects.remove(id);
        Ok(())
    }

    fn project_depth(&self, id: &str) -> Result<usize, StoreError> {
        self.touch();
        if self.failing_depth.contains(id) {
            return Err(StoreError::Backend(format!("injected depth failure for '{}'", id)));
        }
        let mut current = self.projects.get(id).ok_or_else(|| project_missing(id))?;
        let mut depth = 0;
        while let Some(parent_id) = &current.parent_id {
            if depth > self.projects.len() {
                return Err(StoreError::Backend(format!(
                    "project '{}' has a cyclic parent chain",
                    id
                )));
            }
            current = self
                .projects
                .get(parent_id)
                .ok_or_else(|| project_missing(parent_id))?;
            depth += 1;
        }
        Ok(depth)
    }

    fn create_task(&mut self, owner: &Owner, task: &NewTask) -> Result<String, StoreError> {
        self.touch();
        if !self.projects.contains_key(&task.project_id) {
            return Err(project_missing(&task.project_id));
        }
        let id = self.next_id("task");
        self.tasks.insert(
            id.clone(),
            TaskRecord {
                id: id.clone(),
                owner: owner.clone(),
                content: task.content.clone(),
                project_id: task.project_id.clone(),
                depends_on: None,
            },
        );
        Ok(id)
    }

    fn update_task(&mut self, id: &str, content: &TaskContent) -> Result<(), StoreError> {
        self.touch();
        self.check_failing(id)?;
        let task = self.tasks.get_mut(id).ok_or_else(|| task_missing(id))?;
        task.content = content.clone();
        Ok(())
    }

    fn delete_task(&mut self, id: &str) -> Result<(), StoreError> {
        self.touch();
        self.check_failing(id)?;
        self.tasks.remove(id).ok_or_else(|| task_missing(id))?;
        for task in self.tasks.values_mut() {
            if task.depends_on.as_deref() == Some(id) {
                task.depends_on = None;
            }
        }
        Ok(())
    }

    fn set_task_dependency(&mut self, task_id: &str, depends_on_id: &str) -> Result<(), StoreError> {
        self.touch();
        if !self.tasks.contains_key(depends_on_id) {
            return Err(task_missing(depends_on_id));
        }
        let task = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| task_missing(task_id))?;
        task.depends_on = Some(depends_on_id.to_string());
        Ok(())
    }

    fn count_root_projects(&self, owner: &Owner) -> Result<usize, StoreError> {
        self.touch();
        Ok(self
            .projects
            .values()
            .filter(|p| p.parent_id.is_none() && &p.owner == owner)
            .count())
    }

    fn count_tasks_for_owner(&self, owner: &Owner) -> Result<usize, StoreError> {
        self.touch();
        Ok(self.tasks.values().filter(|t| &t.owner == owner).count())
    }
}

/// Mind map records keyed by id.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct MemoryMindMaps {
    mind_maps: AHashMap<String, MindMap>,
}

impl MemoryMindMaps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mind_map: MindMap) {
        self.mind_maps.insert(mind_map.id.clone(), mind_map);
    }

    pub fn get(&self, id: &str) -> Option<&MindMap> {
        self.mind_maps.get(id)
    }

    pub fn len(&self) -> usize {
        self.mind_maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mind_maps.is_empty()
    }
}

impl MindMapRepository for MemoryMindMaps {
    fn load(&self, id: &str) -> Result<Option<MindMap>, StoreError> {
        Ok(self.mind_maps.get(id).cloned())
    }

    fn record_conversion(&mut self, id: &str, record: ConversionRecord) -> Result<(), StoreError> {
        let mind_map = self
            .mind_maps
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "mind map",
                id: id.to_string(),
            })?;
        if let Some((nodes, edges)) = record.graph {
            mind_map.nodes = nodes;
            mind_map.edges = edges;
        }
        mind_map.mapping = record.mapping;
        mind_map.converted_at = Some(record.converted_at);
        mind_map.root_resource_id = record.root_resource_id;
        mind_map.is_converted = true;
        Ok(())
    }
}

/// A resource store and its mind maps, persisted together.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct MemoryWorkspace {
    pub store: MemoryStore,
    pub mind_maps: MemoryMindMaps,
}

impl MemoryWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes the workspace with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        encode_to_vec(self, standard()).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    /// Decodes a workspace produced by [`MemoryWorkspace::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        decode_from_slice(bytes, standard())
            .map(|(workspace, _)| workspace)
            .map_err(|e| SnapshotError::Decode(e.to_string()))
    }

    /// Saves the workspace to a file.
    pub fn save(&self, path: &str) -> Result<(), SnapshotError> {
        let bytes = self.to_bytes()?;
        let mut file = fs::File::create(path).map_err(|source| SnapshotError::Io {
            path: path.to_string(),
            source,
        })?;
        file.write_all(&bytes).map_err(|source| SnapshotError::Io {
            path: path.to_string(),
            source,
        })
    }

    /// Loads a workspace from a file.
    pub fn from_file(path: &str) -> Result<Self, SnapshotError> {
        let mut file = fs::File::open(path).map_err(|source| SnapshotError::Io {
            path: path.to_string(),
            source,
        })?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|source| SnapshotError::Io {
                path: path.to_string(),
                source,
            })?;
        Self::from_bytes(&bytes)
    }
}
