//! Audit event severity levels.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Severity level for audit events.
///
/// The capture pipeline itself only emits `Info` and `Warning`; the full
/// scale exists so a sink can map onto syslog priorities without loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSeverity {
    /// Diagnostic detail.
    Debug,
    /// Normal audited operations.
    Info,
    /// Normal but significant conditions.
    Notice,
    /// Degraded events, e.g. a failed login with no usable identifier.
    Warning,
    /// Errors within the audited application.
    Error,
    /// Critical security events.
    Critical,
}

impl AuditSeverity {
    /// Numeric value for comparison (higher = more severe).
    pub fn level(&self) -> u8 {
        match self {
            Self::Debug => 0,
            Self::Info => 1,
            Self::Notice => 2,
            Self::Warning => 3,
            Self::Error => 4,
            Self::Critical => 5,
        }
    }

    /// Check if this severity meets a minimum threshold.
    pub fn meets_threshold(&self, threshold: Self) -> bool {
        self.level() >= threshold.level()
    }
}

impl PartialOrd for AuditSeverity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AuditSeverity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.level().cmp(&other.level())
    }
}

impl Default for AuditSeverity {
    fn default() -> Self {
        Self::Info
    }
}
