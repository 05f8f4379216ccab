//! Read-only persistence lookups the audit core issues against the host.

use crate::{EntityId, EntityKind, EntityRecord, JoinTable, Relation};

/// Read-only access to the host's persistence layer.
///
/// Every method observes current committed state at call time. The audit
/// layer issues these lookups synchronously, inline with the triggering
/// request; implementations must not assume any other caller.
pub trait EntityStore: Send + Sync {
    /// Load an entity by kind and identifier.
    ///
    /// Returning `None` is normal (the record may have become unavailable
    /// within the triggering transaction) and callers skip silently.
    fn load(&self, kind: EntityKind, id: EntityId) -> Option<EntityRecord>;

    /// Whether a join row currently exists in persisted state.
    ///
    /// Used to detect idempotent re-adds: a join mutation for an already
    /// associated pair is a no-op and must not be audited.
    fn join_exists(&self, join: JoinTable, group: EntityId, related: EntityId) -> bool;

    /// Resolve a relational summary to its display strings (group titles or
    /// permission codes), in the host's natural order.
    fn relation_titles(&self, relation: Relation, id: EntityId) -> Vec<String>;
}
