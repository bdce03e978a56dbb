//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the kumitate crate.
//! Import this module to get access to the core functionality without having to import
//! each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use kumitate::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let settings = Settings::from_file("path/to/settings.json")?;
//! let mut workspace = MemoryWorkspace::from_file("path/to/workspace.bin")?;
//!
//! let reconciler = Reconciler::builder(settings.quotas, AllowAll)
//!     .with_config(settings.engine)
//!     .build();
//! let summary = reconciler.convert(
//!     &mut workspace.store,
//!     &mut workspace.mind_maps,
//!     ConversionRequest::new("mind-map-id", "user-id", PlanTier::Team),
//! )?;
//!
//! println!("Conversion Result: {:?}", summary);
//! # Ok(())
//! # }
//! ```

// Engine entry points
pub use crate::engine::{
    ConversionRequest, ConversionSummary, LimitKind, NodeOutcome, Outcome, Reconciler,
    ReconcilerBuilder,
};

// Graph model and parsing
pub use crate::classify::{Classification, NodeRole, classify};
pub use crate::graph::{
    GraphDefinition, IntoGraph, MetadataFields, MindMapEdge, MindMapNode, Priority, WireEdge,
    WireGraph, WireNode, parse_graph,
};

// Mapping and storage
pub use crate::mapping::{MappedResource, ResourceKind, ResourceMapping};
pub use crate::memory::MemoryWorkspace;
pub use crate::store::{
    AllowAll, MindMap, MindMapRepository, Owner, PermissionChecker, ResourceStore,
};

// Limits and configuration
pub use crate::config::{BranchOrdering, EngineConfig, Settings};
pub use crate::limits::{PlanLimits, PlanQuota, PlanTier, QuotaTable};

// Error types
pub use crate::error::{ConversionError, GraphError, StoreError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
