//! # ardoq-sync
//!
//! Diff-and-upsert synchronization over a remote workspace graph.
//!
//! Build an [`Orchestrator`] around any [`ardoq_core::Transport`] and call
//! [`Orchestrator::upsert_component`] / [`Orchestrator::upsert_reference`]
//! with desired state; the orchestrator decides whether to reuse, update or
//! create. [`pipeline::run`] applies a whole [`Manifest`] at once.

pub mod cache;
pub mod diff;
pub mod error;
pub mod manifest;
pub mod matcher;
pub mod pipeline;
pub mod report;
pub mod upsert;

pub use cache::WorkspaceCache;
pub use error::SyncError;
pub use manifest::Manifest;
pub use pipeline::PipelineResult;
pub use report::{ChangeEvent, ChangeReporter, Counts, NewComponent, Report};
pub use upsert::{Orchestrator, UpsertAction, Upserted};
