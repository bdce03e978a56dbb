use crate::limits::PlanTier;
use thiserror::Error;

/// Errors that can occur while parsing a serialized node/edge graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Failed to parse {field} payload: {message}")]
    MalformedGraph {
        field: &'static str,
        message: String,
    },

    #[error("The mind map contains no nodes")]
    EmptyGraph,
}

/// Errors that can occur when converting a custom user format into a `GraphDefinition`.
#[derive(Error, Debug, Clone)]
pub enum GraphConversionError {
    #[error("Invalid custom data: {0}")]
    ValidationError(String),
}

/// Errors reported by the external project/task store and mind map repository.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{entity} '{id}' does not exist")]
    NotFound { entity: &'static str, id: String },

    #[error("The store rejected the operation: {0}")]
    Rejected(String),

    #[error("Storage backend failure: {0}")]
    Backend(String),
}

/// Errors that can occur while creating a project in the hierarchy.
#[derive(Error, Debug, Clone)]
pub enum HierarchyError {
    #[error("Plan does not allow a subproject below depth {parent_depth}")]
    NestingLimitExceeded { parent_depth: usize },

    #[error("Plan does not allow another root project ({current} already exist)")]
    RootLimitExceeded { current: usize },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors that can occur while creating or updating a task.
#[derive(Error, Debug, Clone)]
pub enum LeafError {
    #[error("Plan task ceiling reached ({current} tasks already exist)")]
    TaskLimitExceeded { current: usize },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Fatal errors that abort a conversion. Pre-flight variants are raised before any
/// resource is touched.
#[derive(Error, Debug, Clone)]
pub enum ConversionError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Mind map '{0}' not found")]
    MindMapNotFound(String),

    #[error("User '{user_id}' may not convert mind map '{mind_map_id}'")]
    PermissionDenied {
        user_id: String,
        mind_map_id: String,
    },

    #[error("The {0} plan does not include mind map conversion")]
    TierInsufficient(PlanTier),

    #[error("A mind map with {count} nodes exceeds the plan's node ceiling")]
    NodeLimitExceeded { count: usize },

    #[error("Mind map '{0}' is already being converted")]
    ConversionInProgress(String),

    #[error("Internal conversion failure: {0}")]
    Internal(String),
}

/// Errors that can occur while saving or loading a binary snapshot.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Serialization failed: {0}")]
    Encode(String),

    #[error("Deserialization failed: {0}")]
    Decode(String),

    #[error("Could not access '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while loading settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read settings file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
