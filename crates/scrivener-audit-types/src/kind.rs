//! Coarse audit event classification.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// CRUD-or-notice classification of an audited action.
///
/// Used by downstream consumers for filtering and alerting; the rendered
/// message carries the human-readable detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumIter, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AuditEventKind {
    /// A record or association came into existence.
    Create,
    /// A record was read (reserved; the capture pipeline does not emit these).
    Read,
    /// A record or association was changed.
    Update,
    /// A record was removed.
    Delete,
    /// A lifecycle observation with no direct data mutation (logins,
    /// denials, MFA and session events).
    Notice,
}

impl AuditEventKind {
    /// All kinds, for consumers building filters.
    pub fn all() -> impl Iterator<Item = Self> {
        use strum::IntoEnumIterator;
        Self::iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn round_trips_through_string_form() {
        for kind in AuditEventKind::all() {
            let s = kind.to_string();
            assert_eq!(AuditEventKind::from_str(&s).unwrap(), kind);
        }
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&AuditEventKind::Create).unwrap();
        assert_eq!(json, "\"create\"");
    }
}
