//! The terminal transport interface and its in-memory test double.

use scrivener_audit_types::{AuditSeverity, EventContext};
use std::sync::Mutex;
use thiserror::Error;

/// Failure delivering a record to the transport.
#[derive(Error, Debug)]
pub enum SinkError {
    /// The transport rejected or lost the record.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The transport connection could not be established.
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

/// A side-channel transport for formatted audit records.
///
/// Implementations receive the rendered single-line message plus the
/// structured context; plain-text transports may ignore the context.
/// Delivery is best effort: the caller contains errors and the triggering
/// business operation is never affected.
pub trait AuditSink: Send + Sync {
    /// Deliver one record.
    fn dispatch(
        &self,
        severity: AuditSeverity,
        message: &str,
        context: &EventContext,
    ) -> Result<(), SinkError>;
}

/// One record as received by a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedRecord {
    /// Severity the record was dispatched at.
    pub severity: AuditSeverity,
    /// The rendered single-line message.
    pub message: String,
    /// Structured context delivered alongside the message.
    pub context: EventContext,
}

/// An in-memory sink collecting records for assertions in tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LoggedRecord>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All records received so far.
    pub fn records(&self) -> Vec<LoggedRecord> {
        self.records.lock().expect("sink poisoned").clone()
    }

    /// Rendered messages only, in dispatch order.
    pub fn messages(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.message).collect()
    }

    /// The most recent message, if any.
    pub fn last_message(&self) -> Option<String> {
        self.records().last().map(|r| r.message.clone())
    }

    /// The most recent record, if any.
    pub fn last_record(&self) -> Option<LoggedRecord> {
        self.records().last().cloned()
    }

    /// Number of records received.
    pub fn len(&self) -> usize {
        self.records.lock().expect("sink poisoned").len()
    }

    /// Whether nothing has been received.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discard all collected records.
    pub fn clear(&self) {
        self.records.lock().expect("sink poisoned").clear();
    }
}

impl AuditSink for MemorySink {
    fn dispatch(
        &self,
        severity: AuditSeverity,
        message: &str,
        context: &EventContext,
    ) -> Result<(), SinkError> {
        self.records.lock().expect("sink poisoned").push(LoggedRecord {
            severity,
            message: message.to_string(),
            context: context.clone(),
        });
        Ok(())
    }
}
