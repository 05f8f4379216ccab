//! The authenticated principal performing an audited action.

use serde::{Deserialize, Serialize};

/// A resolved principal from the host's session layer.
///
/// An id of `0` is the sentinel for "not authenticated"; hooks that require
/// an actor treat such a principal the same as an absent one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Host-assigned identifier; `0` means unauthenticated.
    pub id: u64,
    /// Primary email, when the account has one.
    pub email: Option<String>,
    /// Fallback display title (e.g. full name).
    pub title: String,
    /// Consecutive failed login attempts, when the host tracks them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_login_count: Option<u32>,
}

impl Principal {
    /// Create a principal with an email address.
    pub fn new(id: u64, email: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            email: Some(email.into()),
            title: title.into(),
            failed_login_count: None,
        }
    }

    /// Create a principal without an email address.
    pub fn titled(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            email: None,
            title: title.into(),
            failed_login_count: None,
        }
    }

    /// Record the host's failed-login counter.
    pub fn with_failed_logins(mut self, count: u32) -> Self {
        self.failed_login_count = Some(count);
        self
    }

    /// Whether this principal denotes a real, authenticated account.
    pub fn exists(&self) -> bool {
        self.id != 0
    }

    /// Email falling back to title, the identity shown in every record.
    pub fn display_name(&self) -> &str {
        match self.email.as_deref() {
            Some(email) if !email.is_empty() => email,
            _ => &self.title,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_email() {
        let p = Principal::new(3, "admin@example.org", "Admin User");
        assert_eq!(p.display_name(), "admin@example.org");
    }

    #[test]
    fn display_name_falls_back_to_title() {
        let p = Principal::titled(3, "Admin User");
        assert_eq!(p.display_name(), "Admin User");

        let mut p = Principal::new(3, "", "Admin User");
        assert_eq!(p.display_name(), "Admin User");
        p.email = None;
        assert_eq!(p.display_name(), "Admin User");
    }

    #[test]
    fn zero_id_does_not_exist() {
        assert!(!Principal::titled(0, "anon").exists());
        assert!(Principal::titled(1, "joe").exists());
    }
}
