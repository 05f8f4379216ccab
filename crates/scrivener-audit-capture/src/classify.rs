//! Deciding which table mutations are audit-worthy.

use crate::enrich::{enrich, render_pairs};
use crate::{MutationBatch, TableMutation};
use scrivener_audit_host::{
    AuditContext, EntityKind, EntityRecord, EntityStore, JoinTable,
};
use scrivener_audit_types::{AuditEvent, AuditEventKind, Principal, Subject};
use serde::Deserialize;
use std::sync::Arc;

const MODIFIED_TEMPLATE: &str = "\"{actor}\" (ID: {actor_id}) modified {entity} \
    (ID: {subject_id}, ClassName: {class_name}, Title: \"{title}\", {extended})";

const ROLE_ADDED_TEMPLATE: &str = "\"{actor}\" (ID: {actor_id}) added PermissionRole \
    \"{role}\" (ID: {role_id}) to Group \"{group}\" (ID: {group_id})";

const MEMBER_ADDED_TEMPLATE: &str = "\"{actor}\" (ID: {actor_id}) added Member \
    \"{member}\" (ID: {member_id}) to Group \"{group}\" (ID: {group_id})";

/// Configuration for mutation classification.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Request paths containing this marker are part of the authentication
    /// flow; watched-table writes there are login bookkeeping, not edits,
    /// and are excluded as noise.
    pub auth_path_marker: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            auth_path_marker: "Security".to_string(),
        }
    }
}

/// Classifies a mutation batch into audit events.
///
/// Each batch entry is considered independently, in batch order. Missing
/// records are skipped silently; they may have become unavailable within
/// the triggering transaction.
pub struct MutationClassifier {
    store: Arc<dyn EntityStore>,
    config: CaptureConfig,
}

impl MutationClassifier {
    /// Create a classifier over the host store.
    pub fn new(store: Arc<dyn EntityStore>, config: CaptureConfig) -> Self {
        Self { store, config }
    }

    /// Classify one batch. Returns no events when no actor is
    /// authenticated: system-initiated and anonymous mutations are never
    /// audited through this path.
    pub fn classify(&self, ctx: &AuditContext, batch: &MutationBatch) -> Vec<AuditEvent> {
        let Some(actor) = ctx.existing_actor() else {
            return Vec::new();
        };

        let mut events = Vec::new();
        for entry in batch.iter() {
            if !entry.command.is_write() {
                continue;
            }

            if let Some(kind) = EntityKind::from_table(&entry.table) {
                if self.in_auth_flow(ctx) {
                    continue;
                }
                if let Some(event) = self.classify_watched(actor, kind, entry) {
                    events.push(event);
                }
            } else if let Some(join) = JoinTable::from_table(&entry.table) {
                if let Some(event) = self.classify_join(actor, join, entry) {
                    events.push(event);
                }
            }
        }
        events
    }

    fn in_auth_flow(&self, ctx: &AuditContext) -> bool {
        ctx.request_uri()
            .map(|uri| uri.contains(&self.config.auth_path_marker))
            .unwrap_or(false)
    }

    fn classify_watched(
        &self,
        actor: &Principal,
        kind: EntityKind,
        entry: &TableMutation,
    ) -> Option<AuditEvent> {
        let id = entry.id?;
        let record = self.store.load(kind, id)?;

        let event_kind = if entry.command == crate::MutationCommand::Insert {
            AuditEventKind::Create
        } else {
            AuditEventKind::Update
        };

        let pairs = enrich(self.store.as_ref(), kind, &record);
        let mut builder = AuditEvent::builder(event_kind, MODIFIED_TEMPLATE)
            .actor(actor)
            .target(Subject::new(kind.table(), id.value()).with_title(&record.title))
            .field("entity", kind.table())
            .field("subject_id", id.to_string())
            .field("class_name", &record.class_name)
            .field("title", &record.title)
            .field("extended", render_pairs(&pairs));
        for (label, value) in pairs {
            builder = builder.extended(label, value);
        }
        Some(builder.build())
    }

    /// Join-table inserts and updates describe "X added to group". The
    /// existence probe runs against pre-mutation persisted state (the
    /// interceptor fires before commit): an already-present pair means this
    /// mutation is an idempotent re-add and is suppressed.
    fn classify_join(
        &self,
        actor: &Principal,
        join: JoinTable,
        entry: &TableMutation,
    ) -> Option<AuditEvent> {
        let group_id = entry.field_id(join.group_key())?;
        let related_id = entry.field_id(join.related_key())?;

        if self.store.join_exists(join, group_id, related_id) {
            return None;
        }

        let group = self.store.load(EntityKind::Group, group_id)?;
        let related = self.store.load(join.related_kind(), related_id)?;

        let event = match join {
            JoinTable::GroupRoles => self.join_event(
                actor,
                ROLE_ADDED_TEMPLATE,
                "role",
                related.title.clone(),
                "role_id",
                related_id.to_string(),
                &group,
                group_id,
                &related,
            ),
            JoinTable::GroupMembers => self.join_event(
                actor,
                MEMBER_ADDED_TEMPLATE,
                "member",
                related.display_name().to_string(),
                "member_id",
                related_id.to_string(),
                &group,
                group_id,
                &related,
            ),
        };
        Some(event)
    }

    #[allow(clippy::too_many_arguments)]
    fn join_event(
        &self,
        actor: &Principal,
        template: &str,
        name_key: &str,
        name_value: String,
        id_key: &str,
        id_value: String,
        group: &EntityRecord,
        group_id: scrivener_audit_host::EntityId,
        related: &EntityRecord,
    ) -> AuditEvent {
        AuditEvent::builder(AuditEventKind::Update, template)
            .actor(actor)
            .target(Subject::new("Group", group_id.value()).with_title(&group.title))
            .field(name_key, name_value)
            .field(id_key, id_value)
            .field("group", &group.title)
            .field("group_id", group_id.to_string())
            .field("related_class", &related.class_name)
            .build()
    }
}
