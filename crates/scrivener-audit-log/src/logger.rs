//! The named audit logger handed to every hook and pipeline.

use crate::{AuditSink, LineFormatter};
use scrivener_audit_host::RequestContext;
use scrivener_audit_types::{AuditEvent, EventContext};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Renders events and delivers them to the configured sink.
///
/// The sink is constructor-injected and swappable, which is how tests
/// substitute a [`MemorySink`](crate::MemorySink). Delivery failures are
/// counted and reported on the diagnostic channel; they never reach the
/// caller, so the business operation that raised the event is unaffected.
#[derive(Clone)]
pub struct AuditLogger {
    sink: Arc<dyn AuditSink>,
    formatter: LineFormatter,
    dropped: Arc<AtomicU64>,
}

impl AuditLogger {
    /// Create a logger over a sink.
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self {
            sink,
            formatter: LineFormatter::new(),
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Render and deliver one event.
    ///
    /// When a request is supplied its metadata is attached to the outgoing
    /// structured context (`url`, `http_method`, `referrer`, `real_ip`),
    /// leaving the rendered message itself untouched.
    pub fn emit(&self, event: &AuditEvent, request: Option<&RequestContext>) {
        let message = self.formatter.format_event(event);
        let context = self.outgoing_context(event, request);

        if let Err(e) = self.sink.dispatch(event.severity, &message, &context) {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            warn!(error = %e, "audit record dropped");
        }
    }

    fn outgoing_context(&self, event: &AuditEvent, request: Option<&RequestContext>) -> EventContext {
        let mut context = event.extended.clone();
        if let Some(request) = request {
            context.set("url", &request.uri);
            context.set("http_method", &request.method);
            if let Some(referrer) = request.referrer.as_deref() {
                context.set("referrer", referrer);
            }
            context.set("real_ip", request.client_ip());
        }
        context
    }

    /// Number of records lost to transport failures since construction.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemorySink, SinkError};
    use scrivener_audit_types::{AuditEventKind, AuditSeverity, Principal};

    #[test]
    fn emits_rendered_single_line() {
        let sink = Arc::new(MemorySink::new());
        let logger = AuditLogger::new(sink.clone());
        let actor = Principal::new(1, "admin@example.org", "Admin");

        let event = AuditEvent::builder(AuditEventKind::Update, "\"{actor}\" modified {what}")
            .actor(&actor)
            .field("what", "Group\n\"My group\"")
            .build();
        logger.emit(&event, None);

        assert_eq!(
            sink.last_message().as_deref(),
            Some("\"admin@example.org\" modified Group \"My group\"")
        );
    }

    #[test]
    fn request_metadata_lands_in_structured_context() {
        let sink = Arc::new(MemorySink::new());
        let logger = AuditLogger::new(sink.clone());
        let request = RequestContext::new("POST", "/admin/groups")
            .with_remote_addr("192.0.2.9")
            .with_referrer("/admin");

        let event = AuditEvent::builder(AuditEventKind::Notice, "plain").build();
        logger.emit(&event, Some(&request));

        let record = sink.last_record().unwrap();
        assert_eq!(record.context.get("url"), Some("/admin/groups"));
        assert_eq!(record.context.get("http_method"), Some("POST"));
        assert_eq!(record.context.get("referrer"), Some("/admin"));
        assert_eq!(record.context.get("real_ip"), Some("192.0.2.9"));
        assert_eq!(record.message, "plain");
    }

    #[test]
    fn extended_context_is_forwarded_to_the_sink() {
        let sink = Arc::new(MemorySink::new());
        let logger = AuditLogger::new(sink.clone());

        let event = AuditEvent::builder(AuditEventKind::Update, "m")
            .extended("Effective permissions", "ADMIN, CMS_ACCESS")
            .build();
        logger.emit(&event, None);

        let record = sink.last_record().unwrap();
        assert_eq!(
            record.context.get("Effective permissions"),
            Some("ADMIN, CMS_ACCESS")
        );
    }

    #[test]
    fn sink_failure_is_contained_and_counted() {
        struct FailingSink;
        impl AuditSink for FailingSink {
            fn dispatch(
                &self,
                _severity: AuditSeverity,
                _message: &str,
                _context: &EventContext,
            ) -> Result<(), SinkError> {
                Err(SinkError::Transport("down".to_string()))
            }
        }

        let logger = AuditLogger::new(Arc::new(FailingSink));
        let event = AuditEvent::builder(AuditEventKind::Notice, "m").build();
        logger.emit(&event, None);
        logger.emit(&event, None);
        assert_eq!(logger.dropped_count(), 2);
    }
}
