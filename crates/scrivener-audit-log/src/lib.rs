//! Message formatting and side-channel delivery for Scrivener audit records.
//!
//! The formatter turns an event's template and raw context into exactly one
//! sanitized line; the sink delivers it to a transport kept logically
//! separate from general application logging, so audit records cannot be
//! dropped or filtered by ordinary log configuration.

mod format;
mod logger;
mod sink;
mod syslog_sink;

pub use format::LineFormatter;
pub use logger::AuditLogger;
pub use sink::{AuditSink, LoggedRecord, MemorySink, SinkError};
pub use syslog_sink::{SyslogConfig, SyslogSink};
