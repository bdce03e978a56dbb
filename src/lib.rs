//! # Kumitate - Mind Map Reconciliation Engine
//!
//! **Kumitate** turns a node-based mind map into a hierarchy of projects and tasks, and
//! keeps that hierarchy in sync when the mind map is edited and converted again. The
//! root node becomes a project, nodes with children become subprojects, childless
//! nodes become tasks, and edges between two task nodes become task dependencies.
//!
//! ## Core Workflow
//!
//! The engine is storage-agnostic. It drives collaborator traits and persists a
//! node-to-resource mapping on the mind map itself, which is what makes repeated
//! conversions idempotent. The primary workflow is:
//!
//! 1.  **Provide Storage**: Implement [`store::ResourceStore`] for your projects and tasks and
//!     [`store::MindMapRepository`] for mind map records, or use the in-memory
//!     [`memory::MemoryWorkspace`].
//! 2.  **Build a Reconciler**: Use `Reconciler::builder` with your plan limits and permission
//!     gate. The reconciler is reusable and can be shared across requests.
//! 3.  **Convert**: Call `convert` with a [`engine::ConversionRequest`]. Every run diffs the
//!     current graph against the previous mapping: missing nodes are deleted, mapped nodes
//!     are updated in place, and new nodes are created.
//! 4.  **Inspect**: The returned [`engine::ConversionSummary`] reports what was created,
//!     updated, deleted and skipped, node by node.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kumitate::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let nodes = r#"[
//!         {"id": "A", "label": "Launch"},
//!         {"id": "B", "label": "Venue", "parentId": "A"},
//!         {"id": "C", "label": "Write invitations", "parentId": "A"},
//!         {"id": "D", "label": "Book venue", "parentId": "B"}
//!     ]"#;
//!     let edges = r#"[{"id": "e1", "source": "C", "target": "D"}]"#;
//!
//!     let mut workspace = MemoryWorkspace::new();
//!     let owner = Owner::User("u1".to_string());
//!     workspace
//!         .mind_maps
//!         .insert(MindMap::new("m1", owner, "Launch plan", nodes, edges));
//!
//!     let reconciler = Reconciler::builder(QuotaTable::default(), AllowAll).build();
//!     let request = ConversionRequest::new("m1", "u1", PlanTier::Pro);
//!     let summary = reconciler.convert(&mut workspace.store, &mut workspace.mind_maps, request)?;
//!
//!     println!("{}", summary.message);
//!     for entry in &summary.outcomes {
//!         println!("  {} -> {:?}", entry.node_id, entry.outcome);
//!     }
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod limits;
pub mod mapping;
pub mod memory;
pub mod prelude;
pub mod store;
