//! Explicit hook registration.
//!
//! The original design grafted hook methods onto host classes through
//! extension mixins; here the host raises events on a bus and subscribers
//! register explicitly at startup.

use crate::DomainEvent;
use scrivener_audit_host::AuditContext;
use std::sync::Arc;

/// A receiver of domain lifecycle events.
pub trait HookSubscriber: Send + Sync {
    /// Handle one event. Must not fail; audit outcomes never reach the
    /// host operation that raised the event.
    fn on_event(&self, ctx: &AuditContext, event: &DomainEvent);
}

/// Fans lifecycle events out to subscribers, in subscription order.
#[derive(Default)]
pub struct HookBus {
    subscribers: Vec<Arc<dyn HookSubscriber>>,
}

impl HookBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber.
    pub fn subscribe(&mut self, subscriber: Arc<dyn HookSubscriber>) {
        self.subscribers.push(subscriber);
    }

    /// Raise one event, synchronously, in the caller's stack.
    pub fn emit(&self, ctx: &AuditContext, event: &DomainEvent) {
        for subscriber in &self.subscribers {
            subscriber.on_event(ctx, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter(AtomicUsize);

    impl HookSubscriber for Counter {
        fn on_event(&self, _ctx: &AuditContext, _event: &DomainEvent) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn delivers_to_every_subscriber() {
        let first = Arc::new(Counter(AtomicUsize::new(0)));
        let second = Arc::new(Counter(AtomicUsize::new(0)));

        let mut bus = HookBus::new();
        bus.subscribe(first.clone());
        bus.subscribe(second.clone());
        bus.emit(&AuditContext::anonymous(), &DomainEvent::LoggedIn);

        assert_eq!(first.0.load(Ordering::SeqCst), 1);
        assert_eq!(second.0.load(Ordering::SeqCst), 1);
    }
}
