//! The cross-cutting input every hook and interceptor call receives.

use crate::RequestContext;
use scrivener_audit_types::Principal;
use serde::{Deserialize, Serialize};

/// Resolved actor and request metadata for one triggering action.
///
/// Built once per request by the host and passed by reference; the audit
/// core holds no ambient state of its own.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditContext {
    /// The authenticated principal, if one resolved.
    pub actor: Option<Principal>,
    /// The active request, if the action ran under one.
    pub request: Option<RequestContext>,
}

impl AuditContext {
    /// A context with neither actor nor request (system-initiated work).
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A context for an authenticated actor.
    pub fn for_actor(actor: Principal) -> Self {
        Self {
            actor: Some(actor),
            request: None,
        }
    }

    /// Attach the active request.
    pub fn with_request(mut self, request: RequestContext) -> Self {
        self.request = Some(request);
        self
    }

    /// The actor, if it resolves to a real authenticated account.
    ///
    /// A principal with the `0` sentinel id counts as absent, the same as
    /// no principal at all.
    pub fn existing_actor(&self) -> Option<&Principal> {
        self.actor.as_ref().filter(|actor| actor.exists())
    }

    /// URI of the active request, if any.
    pub fn request_uri(&self) -> Option<&str> {
        self.request.as_ref().map(|r| r.uri.as_str())
    }
}
