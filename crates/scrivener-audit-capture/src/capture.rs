//! The interceptor seam over the host's persistence entry point.

use crate::{CaptureConfig, MutationBatch, MutationClassifier};
use scrivener_audit_host::{AuditContext, EntityStore, HostError};
use scrivener_audit_log::AuditLogger;
use std::sync::Arc;
use tracing::debug;

/// The host persistence call the interceptor decorates: apply one batch of
/// table mutations.
///
/// Implementations are the host's own database layer; the audit layer only
/// wraps them. `captures_audit` is the double-install guard: wrapping an
/// already-capturing manipulator must be a no-op, or every mutation would
/// be logged twice.
pub trait Manipulator: Send + Sync {
    /// Apply a batch of mutations.
    fn manipulate(&self, ctx: &AuditContext, batch: &MutationBatch) -> Result<(), HostError>;

    /// Whether audit capture is already installed on this manipulator.
    fn captures_audit(&self) -> bool {
        false
    }
}

/// Classifies intercepted batches and emits the resulting events.
///
/// Every lookup this pipeline performs is infallible by contract
/// ([`EntityStore`] returns options, the logger contains sink failures),
/// so nothing here can surface an error into the mutation path.
pub struct CapturePipeline {
    classifier: MutationClassifier,
    logger: AuditLogger,
}

impl CapturePipeline {
    /// Create a pipeline over the host store and audit logger.
    pub fn new(store: Arc<dyn EntityStore>, config: CaptureConfig, logger: AuditLogger) -> Self {
        Self {
            classifier: MutationClassifier::new(store, config),
            logger,
        }
    }

    /// Inspect one batch and emit whatever it classifies to, in batch
    /// order, at most once per qualifying entry.
    pub fn intercept(&self, ctx: &AuditContext, batch: &MutationBatch) {
        let events = self.classifier.classify(ctx, batch);
        if !events.is_empty() {
            debug!(count = events.len(), "classified mutation batch");
        }
        for event in &events {
            self.logger.emit(event, ctx.request.as_ref());
        }
    }
}

/// Decorator installing audit capture in front of a [`Manipulator`].
///
/// Interception runs before delegation, so the existence probes the
/// classifier issues still observe pre-mutation state. A capture failure
/// cannot occur on this path (see [`CapturePipeline`]); the underlying
/// mutation always proceeds.
pub struct AuditingManipulator {
    inner: Arc<dyn Manipulator>,
    pipeline: Arc<CapturePipeline>,
}

impl Manipulator for AuditingManipulator {
    fn manipulate(&self, ctx: &AuditContext, batch: &MutationBatch) -> Result<(), HostError> {
        self.pipeline.intercept(ctx, batch);
        self.inner.manipulate(ctx, batch)
    }

    fn captures_audit(&self) -> bool {
        true
    }
}

/// Install audit capture on a persistence connection, once.
///
/// Installing over an already-capturing manipulator returns it unchanged.
pub fn install_capture(
    inner: Arc<dyn Manipulator>,
    pipeline: Arc<CapturePipeline>,
) -> Arc<dyn Manipulator> {
    if inner.captures_audit() {
        return inner;
    }
    Arc::new(AuditingManipulator { inner, pipeline })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrivener_audit_log::MemorySink;
    use scrivener_audit_types::Principal;
    use scrivener_test_utils::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingManipulator {
        applied: AtomicUsize,
    }

    impl CountingManipulator {
        fn new() -> Self {
            Self {
                applied: AtomicUsize::new(0),
            }
        }
    }

    impl Manipulator for CountingManipulator {
        fn manipulate(&self, _ctx: &AuditContext, _batch: &MutationBatch) -> Result<(), HostError> {
            self.applied.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn pipeline(store: Arc<MemoryStore>, sink: Arc<MemorySink>) -> Arc<CapturePipeline> {
        Arc::new(CapturePipeline::new(
            store,
            CaptureConfig::default(),
            AuditLogger::new(sink),
        ))
    }

    #[test]
    fn decorator_logs_then_delegates() {
        let store = Arc::new(MemoryStore::new());
        store.add_group(1, "My group");
        let sink = Arc::new(MemorySink::new());
        let inner = Arc::new(CountingManipulator::new());

        let wrapped = install_capture(inner.clone(), pipeline(store, sink.clone()));
        let ctx = AuditContext::for_actor(Principal::new(1, "ADMIN@example.org", "Admin"));
        wrapped
            .manipulate(&ctx, &MutationBatch::new().insert("Group", 1))
            .unwrap();

        assert_eq!(inner.applied.load(Ordering::SeqCst), 1);
        assert_eq!(sink.len(), 1);
        assert!(sink.last_message().unwrap().contains("modified Group"));
    }

    #[test]
    fn double_install_is_a_no_op() {
        let store = Arc::new(MemoryStore::new());
        let sink = Arc::new(MemorySink::new());
        let p = pipeline(store, sink);

        let inner: Arc<dyn Manipulator> = Arc::new(CountingManipulator::new());
        let once = install_capture(inner, p.clone());
        let twice = install_capture(once.clone(), p);
        assert!(Arc::ptr_eq(&once, &twice));
    }

    #[test]
    fn mutation_proceeds_when_nothing_classifies() {
        let store = Arc::new(MemoryStore::new());
        let sink = Arc::new(MemorySink::new());
        let inner = Arc::new(CountingManipulator::new());

        let wrapped = install_capture(inner.clone(), pipeline(store, sink.clone()));
        wrapped
            .manipulate(
                &AuditContext::anonymous(),
                &MutationBatch::new().insert("Group", 1),
            )
            .unwrap();

        assert_eq!(inner.applied.load(Ordering::SeqCst), 1);
        assert!(sink.is_empty());
    }
}
