//! The unit the persistence layer hands to the interceptor.

use scrivener_audit_host::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Low-level persistence command for one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationCommand {
    /// A new row.
    Insert,
    /// An existing row changed.
    Update,
    /// A row removed; ignored by the classifier (deletions are audited via
    /// domain hooks instead).
    Delete,
}

impl MutationCommand {
    /// Whether the classifier considers this command at all.
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Insert | Self::Update)
    }
}

/// One table's entry within a mutation batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableMutation {
    /// Target table name.
    pub table: String,
    /// What is being done to it.
    pub command: MutationCommand,
    /// Record identifier, for single-record tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    /// Field values; join tables carry their foreign keys here because the
    /// identifier alone is insufficient.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub fields: HashMap<String, Value>,
}

impl TableMutation {
    /// Read a field as an entity identifier, accepting integer or numeric
    /// string values as the host's drivers produce both.
    pub fn field_id(&self, key: &str) -> Option<EntityId> {
        match self.fields.get(key)? {
            Value::Number(n) => n.as_u64().map(EntityId),
            Value::String(s) => s.parse::<u64>().ok().map(EntityId),
            _ => None,
        }
    }
}

/// The set of table-level changes produced by one persistence "apply" call.
///
/// Iteration order is the order the host supplied, and classification
/// preserves it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MutationBatch {
    entries: Vec<TableMutation>,
}

impl MutationBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&mut self, entry: TableMutation) {
        self.entries.push(entry);
    }

    /// Append an insert of a record with an identifier.
    pub fn insert(mut self, table: impl Into<String>, id: u64) -> Self {
        self.entries.push(TableMutation {
            table: table.into(),
            command: MutationCommand::Insert,
            id: Some(EntityId(id)),
            fields: HashMap::new(),
        });
        self
    }

    /// Append an update of a record with an identifier.
    pub fn update(mut self, table: impl Into<String>, id: u64) -> Self {
        self.entries.push(TableMutation {
            table: table.into(),
            command: MutationCommand::Update,
            id: Some(EntityId(id)),
            fields: HashMap::new(),
        });
        self
    }

    /// Append a join-table insert carrying foreign keys.
    pub fn insert_join(
        mut self,
        table: impl Into<String>,
        fields: impl IntoIterator<Item = (&'static str, u64)>,
    ) -> Self {
        self.entries.push(TableMutation {
            table: table.into(),
            command: MutationCommand::Insert,
            id: None,
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), Value::from(v)))
                .collect(),
        });
        self
    }

    /// Entries in host-supplied order.
    pub fn iter(&self) -> impl Iterator<Item = &TableMutation> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the batch carries no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_id_accepts_number_and_string() {
        let batch = MutationBatch::new().insert_join("Group_Members", [("GroupID", 3)]);
        let entry = batch.iter().next().unwrap();
        assert_eq!(entry.field_id("GroupID"), Some(EntityId(3)));
        assert_eq!(entry.field_id("MemberID"), None);

        let mut entry = entry.clone();
        entry.fields.insert("MemberID".into(), Value::String("17".into()));
        assert_eq!(entry.field_id("MemberID"), Some(EntityId(17)));

        entry.fields.insert("MemberID".into(), Value::String("joe".into()));
        assert_eq!(entry.field_id("MemberID"), None);
    }

    #[test]
    fn batch_preserves_order() {
        let batch = MutationBatch::new()
            .insert("Group", 1)
            .update("Member", 2)
            .insert_join("Group_Members", [("GroupID", 1), ("MemberID", 2)]);
        let tables: Vec<_> = batch.iter().map(|m| m.table.as_str()).collect();
        assert_eq!(tables, ["Group", "Member", "Group_Members"]);
        assert_eq!(batch.len(), 3);
    }

    #[test]
    fn delete_is_not_a_write() {
        assert!(MutationCommand::Insert.is_write());
        assert!(MutationCommand::Update.is_write());
        assert!(!MutationCommand::Delete.is_write());
    }
}
