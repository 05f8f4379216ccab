//! Simulates an admin session against an in-memory host and prints the
//! audit records it produces.
//!
//! Run with `cargo run -p scrivener-audit-capture --example admin_session`.

use scrivener_audit_capture::{
    install_capture, CaptureConfig, CapturePipeline, Manipulator, MutationBatch,
};
use scrivener_audit_host::{AuditContext, HostError, RequestContext};
use scrivener_audit_log::{AuditLogger, MemorySink};
use scrivener_test_utils::{admin, MemoryStore};
use std::sync::Arc;

struct NullConnection;

impl Manipulator for NullConnection {
    fn manipulate(&self, _ctx: &AuditContext, _batch: &MutationBatch) -> Result<(), HostError> {
        Ok(())
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .init();

    let store = Arc::new(MemoryStore::new());
    store.add_group(1, "My group");
    store.add_member(2, "joe1", "Joe Soap");

    let sink = Arc::new(MemorySink::new());
    let pipeline = Arc::new(CapturePipeline::new(
        store,
        CaptureConfig::default(),
        AuditLogger::new(sink.clone()),
    ));
    let connection = install_capture(Arc::new(NullConnection), pipeline);

    let ctx = AuditContext::for_actor(admin())
        .with_request(RequestContext::new("POST", "/admin/security").with_remote_addr("192.0.2.4"));

    connection
        .manipulate(&ctx, &MutationBatch::new().insert("Group", 1))
        .expect("in-memory connection cannot fail");
    connection
        .manipulate(
            &ctx,
            &MutationBatch::new().insert_join("Group_Members", [("GroupID", 1), ("MemberID", 2)]),
        )
        .expect("in-memory connection cannot fail");

    for message in sink.messages() {
        println!("{message}");
    }
}
