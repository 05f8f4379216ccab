//! Host-application interfaces consumed by the Scrivener audit core.
//!
//! The audit layer never owns sessions, permissions or persistence. This
//! crate defines the narrow surface it reads instead: the current actor and
//! request ([`AuditContext`]), entity lookups and relation resolution
//! ([`EntityStore`]), and the vocabulary of watched entities and join
//! tables.

mod context;
mod entity;
mod error;
mod request;
mod store;

pub use context::AuditContext;
pub use entity::{EntityId, EntityKind, EntityRecord, JoinTable, Relation};
pub use error::HostError;
pub use request::RequestContext;
pub use store::EntityStore;
