//! Domain lifecycle hooks feeding the Scrivener audit log.
//!
//! The host raises a [`DomainEvent`] at each well-defined lifecycle moment
//! (login, publish, delete, MFA, session termination); the [`HookBus`]
//! fans it out to subscribers, of which [`AuditHooks`] is the one this
//! crate ships: it applies the per-hook actor guards, resolves effective
//! state, and emits one record per event.

mod bus;
mod events;
mod hooks;

pub use bus::{HookBus, HookSubscriber};
pub use events::{ContentRecord, DomainEvent, LoginSession, Visibility};
pub use hooks::{AuditHooks, HooksConfig};
