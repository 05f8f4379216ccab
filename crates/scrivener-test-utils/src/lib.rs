//! Shared test fixtures for Scrivener crates.

use scrivener_audit_host::{
    EntityId, EntityKind, EntityRecord, EntityStore, JoinTable, Relation,
};
use scrivener_audit_types::Principal;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// An in-memory [`EntityStore`] with fixture builders.
///
/// Interior mutability lets tests keep mutating the store after handing an
/// `Arc` of it to the code under test, mimicking host state changing
/// between lookups.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<(EntityKind, EntityId), EntityRecord>>,
    joins: Mutex<HashSet<(JoinTable, EntityId, EntityId)>>,
    relations: Mutex<HashMap<(Relation, EntityId), Vec<String>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under an entity kind.
    pub fn insert(&self, kind: EntityKind, record: EntityRecord) {
        self.records
            .lock()
            .expect("store poisoned")
            .insert((kind, record.id), record);
    }

    /// Add a member account.
    pub fn add_member(&self, id: u64, email: &str, title: &str) {
        self.insert(
            EntityKind::Member,
            EntityRecord::new(id, "Member", title).with_email(email),
        );
    }

    /// Add a group.
    pub fn add_group(&self, id: u64, title: &str) {
        self.insert(EntityKind::Group, EntityRecord::new(id, "Group", title));
    }

    /// Add a permission role.
    pub fn add_role(&self, id: u64, title: &str) {
        self.insert(
            EntityKind::PermissionRole,
            EntityRecord::new(id, "PermissionRole", title),
        );
    }

    /// Add a permission role code.
    pub fn add_role_code(&self, id: u64, code: &str) {
        self.insert(
            EntityKind::PermissionRoleCode,
            EntityRecord::new(id, "PermissionRoleCode", code).with_code(code),
        );
    }

    /// Remove a record, simulating it vanishing mid-transaction.
    pub fn remove(&self, kind: EntityKind, id: impl Into<EntityId>) {
        self.records
            .lock()
            .expect("store poisoned")
            .remove(&(kind, id.into()));
    }

    /// Record a persisted join row.
    pub fn add_join(&self, join: JoinTable, group: impl Into<EntityId>, related: impl Into<EntityId>) {
        self.joins
            .lock()
            .expect("store poisoned")
            .insert((join, group.into(), related.into()));
    }

    /// Drop a persisted join row.
    pub fn remove_join(&self, join: JoinTable, group: impl Into<EntityId>, related: impl Into<EntityId>) {
        self.joins
            .lock()
            .expect("store poisoned")
            .remove(&(join, group.into(), related.into()));
    }

    /// Set the resolved values for a relation lookup.
    pub fn set_relation<I, S>(&self, relation: Relation, id: impl Into<EntityId>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relations.lock().expect("store poisoned").insert(
            (relation, id.into()),
            values.into_iter().map(Into::into).collect(),
        );
    }
}

impl EntityStore for MemoryStore {
    fn load(&self, kind: EntityKind, id: EntityId) -> Option<EntityRecord> {
        self.records
            .lock()
            .expect("store poisoned")
            .get(&(kind, id))
            .cloned()
    }

    fn join_exists(&self, join: JoinTable, group: EntityId, related: EntityId) -> bool {
        self.joins
            .lock()
            .expect("store poisoned")
            .contains(&(join, group, related))
    }

    fn relation_titles(&self, relation: Relation, id: EntityId) -> Vec<String> {
        self.relations
            .lock()
            .expect("store poisoned")
            .get(&(relation, id))
            .cloned()
            .unwrap_or_default()
    }
}

/// A ready-made admin principal matching the fixtures used across tests.
pub fn admin() -> Principal {
    Principal::new(1, "ADMIN@example.org", "Admin User")
}
