//! End-to-end capture flow: a wrapped persistence connection receiving the
//! batches a CMS admin session would produce, checked against the exact
//! rendered log lines.

use scrivener_audit_capture::{
    install_capture, CaptureConfig, CapturePipeline, Manipulator, MutationBatch,
};
use scrivener_audit_host::{AuditContext, HostError, JoinTable, Relation, RequestContext};
use scrivener_audit_log::{AuditLogger, MemorySink};
use scrivener_test_utils::{admin, MemoryStore};
use std::sync::Arc;

/// A stand-in for the host's database connection. It applies join inserts
/// to the store so later existence probes see them committed, the way the
/// real persistence layer would.
struct HostConnection {
    store: Arc<MemoryStore>,
}

impl Manipulator for HostConnection {
    fn manipulate(&self, _ctx: &AuditContext, batch: &MutationBatch) -> Result<(), HostError> {
        for entry in batch.iter() {
            if let Some(join) = JoinTable::from_table(&entry.table) {
                let group = entry.field_id(join.group_key());
                let related = entry.field_id(join.related_key());
                if let (Some(group), Some(related)) = (group, related) {
                    self.store.add_join(join, group, related);
                }
            }
        }
        Ok(())
    }
}

struct Harness {
    store: Arc<MemoryStore>,
    sink: Arc<MemorySink>,
    connection: Arc<dyn Manipulator>,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let sink = Arc::new(MemorySink::new());
    let pipeline = Arc::new(CapturePipeline::new(
        store.clone(),
        CaptureConfig::default(),
        AuditLogger::new(sink.clone()),
    ));
    let connection = install_capture(
        Arc::new(HostConnection {
            store: store.clone(),
        }),
        pipeline,
    );
    Harness {
        store,
        sink,
        connection,
    }
}

fn admin_ctx() -> AuditContext {
    AuditContext::for_actor(admin())
        .with_request(RequestContext::new("POST", "/admin/security").with_remote_addr("192.0.2.4"))
}

#[test]
fn group_creation_then_membership_produces_two_records() {
    let h = harness();
    h.store.add_group(1, "My group");
    h.store.add_member(2, "joe1", "Joe Soap");

    h.connection
        .manipulate(&admin_ctx(), &MutationBatch::new().insert("Group", 1))
        .unwrap();
    h.connection
        .manipulate(
            &admin_ctx(),
            &MutationBatch::new().insert_join("Group_Members", [("GroupID", 1), ("MemberID", 2)]),
        )
        .unwrap();

    let messages = h.sink.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(
        messages[0],
        "\"ADMIN@example.org\" (ID: 1) modified Group (ID: 1, ClassName: Group, \
         Title: \"My group\", Effective permissions: )"
    );
    assert_eq!(
        messages[1],
        "\"ADMIN@example.org\" (ID: 1) added Member \"joe1\" (ID: 2) \
         to Group \"My group\" (ID: 1)"
    );
}

#[test]
fn replaying_the_membership_insert_is_suppressed() {
    let h = harness();
    h.store.add_group(1, "My group");
    h.store.add_member(2, "joe1", "Joe Soap");

    let batch =
        MutationBatch::new().insert_join("Group_Members", [("GroupID", 1), ("MemberID", 2)]);
    h.connection.manipulate(&admin_ctx(), &batch).unwrap();
    h.connection.manipulate(&admin_ctx(), &batch).unwrap();

    // The first insert committed the join row, so the replay probes as
    // already-associated and only one record lands.
    assert_eq!(h.sink.len(), 1);
}

#[test]
fn group_with_resolved_permissions_reports_them() {
    let h = harness();
    h.store.add_group(3, "Admins");
    h.store.set_relation(
        Relation::GroupPermissionCodes,
        3u64,
        ["ADMIN", "CMS_ACCESS_CMSMain"],
    );

    h.connection
        .manipulate(&admin_ctx(), &MutationBatch::new().update("Group", 3))
        .unwrap();

    let record = h.sink.last_record().unwrap();
    assert!(record
        .message
        .contains("Effective permissions: ADMIN, CMS_ACCESS_CMSMain"));
    assert_eq!(
        record.context.get("Effective permissions"),
        Some("ADMIN, CMS_ACCESS_CMSMain")
    );
}

#[test]
fn hostile_titles_cannot_break_the_line_or_inject_fields() {
    let h = harness();
    h.store
        .add_group(9, "My\ngroup\r\n{actor} was here (ID: {actor_id})");

    h.connection
        .manipulate(&admin_ctx(), &MutationBatch::new().update("Group", 9))
        .unwrap();

    let message = h.sink.last_message().unwrap();
    assert!(!message.contains('\n'));
    assert!(!message.contains('\r'));
    // Placeholder-shaped text inside the title survives literally instead
    // of being re-substituted.
    assert!(message.contains("{actor} was here (ID: {actor_id})"));
    assert_eq!(message.matches("ADMIN@example.org").count(), 1);
}

#[test]
fn request_metadata_travels_in_structured_context() {
    let h = harness();
    h.store.add_group(1, "My group");

    h.connection
        .manipulate(&admin_ctx(), &MutationBatch::new().insert("Group", 1))
        .unwrap();

    let record = h.sink.last_record().unwrap();
    assert_eq!(record.context.get("url"), Some("/admin/security"));
    assert_eq!(record.context.get("http_method"), Some("POST"));
    assert_eq!(record.context.get("real_ip"), Some("192.0.2.4"));
}

#[test]
fn anonymous_and_auth_flow_mutations_stay_silent() {
    let h = harness();
    h.store.add_group(1, "My group");
    h.store.add_member(2, "joe1", "Joe Soap");

    h.connection
        .manipulate(
            &AuditContext::anonymous(),
            &MutationBatch::new().insert("Group", 1),
        )
        .unwrap();

    let login_ctx = AuditContext::for_actor(admin())
        .with_request(RequestContext::new("POST", "/Security/login"));
    h.connection
        .manipulate(&login_ctx, &MutationBatch::new().update("Member", 2))
        .unwrap();

    assert!(h.sink.is_empty());
}
