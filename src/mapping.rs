//! The persisted node-to-resource mapping.
//!
//! The mapping is the single source of truth for "which graph node produced which
//! resource" and is what makes repeated conversions idempotent. Its JSON form is
//! `{ "<nodeId>": { "type": "project" | "task", "id": "<resourceId>" } }`.

use crate::error::SnapshotError;
use ahash::AHashMap;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of resource a node produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Project,
    Task,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Project => write!(f, "project"),
            ResourceKind::Task => write!(f, "task"),
        }
    }
}

/// A single mapping entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MappedResource {
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub id: String,
}

impl MappedResource {
    pub fn project(id: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::Project,
            id: id.into(),
        }
    }

    pub fn task(id: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::Task,
            id: id.into(),
        }
    }
}

/// Node id -> produced resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceMapping {
    entries: AHashMap<String, MappedResource>,
}

impl ResourceMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, node_id: &str) -> Option<&MappedResource> {
        self.entries.get(node_id)
    }

    /// The resource id of `node_id`, only if it was mapped to `kind`.
    pub fn resource_of(&self, node_id: &str, kind: ResourceKind) -> Option<&str> {
        self.entries
            .get(node_id)
            .filter(|r| r.kind == kind)
            .map(|r| r.id.as_str())
    }

    pub fn insert(&mut self, node_id: impl Into<String>, resource: MappedResource) {
        self.entries.insert(node_id.into(), resource);
    }

    pub fn remove(&mut self, node_id: &str) -> Option<MappedResource> {
        self.entries.remove(node_id)
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.entries.contains_key(node_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by node id, for deterministic iteration.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MappedResource)> {
        self.entries
            .iter()
            .sorted_by(|a, b| a.0.cmp(b.0))
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries of the given kind.
    pub fn count(&self, kind: ResourceKind) -> usize {
        self.entries.values().filter(|r| r.kind == kind).count()
    }

    /// Serializes the mapping to its persisted JSON form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let ordered: std::collections::BTreeMap<&str, &MappedResource> = self
            .entries
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        serde_json::to_string(&ordered)
    }

    /// Parses a persisted mapping. A blank or `null` payload is an empty mapping,
    /// which is what a never-converted mind map carries.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        if json.trim().is_empty() {
            return Ok(Self::new());
        }
        serde_json::from_str::<Option<Self>>(json).map(Option::unwrap_or_default)
    }

    /// Encodes the mapping with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        encode_to_vec(self, standard()).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    /// Decodes a mapping produced by [`ResourceMapping::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        decode_from_slice(bytes, standard())
            .map(|(mapping, _)| mapping)
            .map_err(|e| SnapshotError::Decode(e.to_string()))
    }
}

impl FromIterator<(String, MappedResource)> for ResourceMapping {
    fn from_iter<I: IntoIterator<Item = (String, MappedResource)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
