//! Mutation interception and classification for Scrivener.
//!
//! This crate is the capture half of the audit pipeline: it wraps the
//! host's low-level "apply a batch of table mutations" entry point, decides
//! which mutations are audit-worthy, resolves the relational state a
//! complete record needs, and hands finished events to the audit logger.
//!
//! - Synchronous, inline with the triggering request; no queue, no worker.
//! - Best effort: nothing in here can fail the underlying mutation.

mod batch;
mod capture;
mod classify;
mod enrich;

pub use batch::{MutationBatch, MutationCommand, TableMutation};
pub use capture::{install_capture, AuditingManipulator, CapturePipeline, Manipulator};
pub use classify::{CaptureConfig, MutationClassifier};
pub use enrich::enrich;
