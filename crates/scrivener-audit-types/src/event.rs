//! Core audit event type.

use crate::{AuditEventId, AuditEventKind, AuditSeverity, EventContext, Principal};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A complete audit event.
///
/// Events are ephemeral: constructed, formatted and dispatched within the
/// call stack of the action that triggered them, never persisted by this
/// subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event identifier.
    pub id: AuditEventId,
    /// When the event was captured.
    pub timestamp: DateTime<Utc>,
    /// Coarse classification.
    pub kind: AuditEventKind,
    /// Event severity.
    pub severity: AuditSeverity,
    /// The acting principal, when one resolved.
    pub actor: Option<Principal>,
    /// The entity acted upon, when applicable.
    pub target: Option<Subject>,
    /// Message template with named `{placeholder}` fields, never
    /// pre-interpolated with untrusted data.
    pub template: String,
    /// Placeholder name to raw (untrusted) value.
    pub context: EventContext,
    /// Computed relational summary (e.g. resolved permission codes), by
    /// display label.
    #[serde(default, skip_serializing_if = "EventContext::is_empty")]
    pub extended: EventContext,
}

/// The entity an audit event is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Type of the subject (e.g. `Group`, `Page`).
    pub subject_type: String,
    /// Subject identifier.
    pub subject_id: u64,
    /// Display title, if any.
    pub title: Option<String>,
}

impl Subject {
    /// Create a new subject.
    pub fn new(subject_type: impl Into<String>, subject_id: u64) -> Self {
        Self {
            subject_type: subject_type.into(),
            subject_id,
            title: None,
        }
    }

    /// Add a display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl AuditEvent {
    /// Create a new event builder.
    pub fn builder(kind: AuditEventKind, template: impl Into<String>) -> AuditEventBuilder {
        AuditEventBuilder::new(kind, template)
    }
}

/// Builder for constructing audit events.
#[derive(Debug)]
pub struct AuditEventBuilder {
    kind: AuditEventKind,
    severity: Option<AuditSeverity>,
    actor: Option<Principal>,
    target: Option<Subject>,
    template: String,
    context: EventContext,
    extended: EventContext,
}

impl AuditEventBuilder {
    /// Create a new builder.
    pub fn new(kind: AuditEventKind, template: impl Into<String>) -> Self {
        Self {
            kind,
            severity: None,
            actor: None,
            target: None,
            template: template.into(),
            context: EventContext::new(),
            extended: EventContext::new(),
        }
    }

    /// Set the severity (defaults to `Info`).
    pub fn severity(mut self, severity: AuditSeverity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Set the actor, and expose its identity as the `actor`/`actor_id`
    /// placeholders.
    pub fn actor(mut self, actor: &Principal) -> Self {
        self.context.set("actor", actor.display_name());
        self.context.set("actor_id", actor.id.to_string());
        self.actor = Some(actor.clone());
        self
    }

    /// Set the target subject.
    pub fn target(mut self, target: Subject) -> Self {
        self.target = Some(target);
        self
    }

    /// Set a placeholder field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.set(name, value);
        self
    }

    /// Add a computed relational summary entry.
    pub fn extended(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.extended.set(label, value);
        self
    }

    /// Build the event.
    pub fn build(self) -> AuditEvent {
        AuditEvent {
            id: AuditEventId::new(),
            timestamp: Utc::now(),
            kind: self.kind,
            severity: self.severity.unwrap_or_default(),
            actor: self.actor,
            target: self.target,
            template: self.template,
            context: self.context,
            extended: self.extended,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let event = AuditEvent::builder(AuditEventKind::Notice, "{actor} did a thing").build();
        assert_eq!(event.severity, AuditSeverity::Info);
        assert!(event.actor.is_none());
        assert!(event.target.is_none());
        assert!(event.context.is_empty());
    }

    #[test]
    fn actor_populates_placeholders() {
        let admin = Principal::new(7, "admin@example.org", "Admin");
        let event = AuditEvent::builder(AuditEventKind::Update, "{actor} (ID: {actor_id})")
            .actor(&admin)
            .build();
        assert_eq!(event.context.get("actor"), Some("admin@example.org"));
        assert_eq!(event.context.get("actor_id"), Some("7"));
        assert_eq!(event.actor.as_ref().map(|a| a.id), Some(7));
    }

    #[test]
    fn subject_builder() {
        let subject = Subject::new("Group", 12).with_title("My group");
        let event = AuditEvent::builder(AuditEventKind::Create, "t")
            .target(subject.clone())
            .build();
        assert_eq!(event.target, Some(subject));
    }
}
