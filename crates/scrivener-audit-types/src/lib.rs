//! Audit event types for Scrivener.

mod actor;
mod context;
mod event;
mod id;
mod kind;
mod severity;

pub use actor::Principal;
pub use context::EventContext;
pub use event::{AuditEvent, AuditEventBuilder, Subject};
pub use id::AuditEventId;
pub use kind::AuditEventKind;
pub use severity::AuditSeverity;
