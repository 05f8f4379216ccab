//! Syslog delivery for audit records.
//!
//! Audit records go to a dedicated authentication facility, a side channel
//! kept apart from regular application logging so audit trail and error
//! noise never mix.

use crate::{AuditSink, SinkError};
use scrivener_audit_types::{AuditSeverity, EventContext};
use std::sync::Mutex;
use syslog::{Facility, Formatter3164, Logger, LoggerBackend};

/// Configuration for the syslog transport.
#[derive(Debug, Clone)]
pub struct SyslogConfig {
    /// Tag identifying this application within the syslog stream.
    pub ident: String,
    /// Syslog facility; defaults to the authentication facility.
    pub facility: Facility,
}

impl Default for SyslogConfig {
    fn default() -> Self {
        Self {
            ident: "scrivener_audit".to_string(),
            facility: Facility::LOG_AUTH,
        }
    }
}

/// Audit sink writing single-line records to the local syslog daemon.
///
/// The writer needs `&mut` for every send, so it sits behind a `Mutex`;
/// most syslog daemons serialize concurrent writers anyway.
pub struct SyslogSink {
    writer: Mutex<Logger<LoggerBackend, Formatter3164>>,
}

impl SyslogSink {
    /// Connect to the local syslog daemon over its Unix socket.
    pub fn connect(config: SyslogConfig) -> Result<Self, SinkError> {
        let formatter = Formatter3164 {
            facility: config.facility,
            hostname: None,
            process: config.ident,
            pid: std::process::id(),
        };

        let writer = syslog::unix(formatter)
            .map_err(|e| SinkError::Unavailable(format!("syslog connection failed: {e}")))?;

        Ok(Self {
            writer: Mutex::new(writer),
        })
    }

    fn render_line(message: &str, context: &EventContext) -> String {
        if context.is_empty() {
            return message.to_string();
        }
        match serde_json::to_string(context) {
            Ok(json) => format!("{message} {json}"),
            Err(_) => message.to_string(),
        }
    }
}

impl AuditSink for SyslogSink {
    fn dispatch(
        &self,
        severity: AuditSeverity,
        message: &str,
        context: &EventContext,
    ) -> Result<(), SinkError> {
        let line = Self::render_line(message, context);
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| SinkError::Transport("syslog writer poisoned".to_string()))?;

        let result = match severity {
            AuditSeverity::Debug => writer.debug(line),
            AuditSeverity::Info => writer.info(line),
            AuditSeverity::Notice => writer.notice(line),
            AuditSeverity::Warning => writer.warning(line),
            AuditSeverity::Error => writer.err(line),
            AuditSeverity::Critical => writer.crit(line),
        };

        result.map_err(|e| SinkError::Transport(format!("syslog write failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_appended_as_json() {
        let context = EventContext::new().with("url", "/admin").with("real_ip", "10.0.0.1");
        let line = SyslogSink::render_line("m", &context);
        assert_eq!(line, r#"m {"url":"/admin","real_ip":"10.0.0.1"}"#);
    }

    #[test]
    fn empty_context_leaves_message_bare() {
        assert_eq!(SyslogSink::render_line("m", &EventContext::new()), "m");
    }

    #[test]
    fn default_config_targets_auth_facility() {
        let config = SyslogConfig::default();
        assert_eq!(config.ident, "scrivener_audit");
        assert!(matches!(config.facility, Facility::LOG_AUTH));
    }
}
