//! The lifecycle events the host can raise.

use scrivener_audit_host::EntityId;
use scrivener_audit_types::Principal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{Display, EnumString};

/// Visibility mode of a content record, with the host's exact string forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Display, EnumString)]
pub enum Visibility {
    /// Visible to anyone.
    Anyone,
    /// Visible to any logged-in user.
    LoggedInUsers,
    /// Restricted to explicitly named groups.
    OnlyTheseUsers,
    /// Inherited from the parent record.
    Inherit,
}

/// A versioned content record as the publish-family hooks see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Record identifier.
    pub id: EntityId,
    /// Display title.
    pub title: String,
    /// Human-readable singular type name (e.g. `Page`).
    pub singular_name: String,
    /// Concrete class name.
    pub class_name: String,
    /// Version number at the time of the hook.
    pub version: u32,
    /// Viewer visibility mode.
    pub can_view: Visibility,
    /// Editor visibility mode.
    pub can_edit: Visibility,
}

impl ContentRecord {
    /// Create a record with open visibility defaults.
    pub fn new(id: u64, singular_name: impl Into<String>, title: impl Into<String>) -> Self {
        let singular_name = singular_name.into();
        Self {
            id: EntityId(id),
            title: title.into(),
            class_name: singular_name.clone(),
            singular_name,
            version: 1,
            can_view: Visibility::Anyone,
            can_edit: Visibility::LoggedInUsers,
        }
    }

    /// Set the concrete class name.
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    /// Set the version.
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Set the visibility modes.
    pub fn with_visibility(mut self, can_view: Visibility, can_edit: Visibility) -> Self {
        self.can_view = can_view;
        self.can_edit = can_edit;
        self
    }
}

/// A login session as seen by the session-termination hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginSession {
    /// Session identifier.
    pub id: u64,
    /// The account the session belongs to.
    pub owner: Principal,
}

/// One lifecycle moment raised by the host.
///
/// Events carry the subject of the action; the acting principal and request
/// travel separately in the `AuditContext` every `emit` receives. MFA
/// events name their member explicitly because they can fire mid-login,
/// before a session actor exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A login completed.
    LoggedIn,
    /// A session was restored from a "remember me" token.
    AutoLoggedIn,
    /// A login attempt failed; the submitted form fields, if any.
    AuthenticationFailed {
        /// Raw submitted fields, keyed as the login form posts them.
        attempt: HashMap<String, String>,
    },
    /// A logout completed.
    LoggedOut,
    /// A record was published. `original` is the pre-publish state, absent
    /// on a first-ever publish.
    Published {
        record: ContentRecord,
        original: Option<ContentRecord>,
    },
    /// A record was unpublished.
    Unpublished { record: ContentRecord },
    /// A draft record was reverted to its live version.
    RevertedToLive { record: ContentRecord },
    /// A record was duplicated.
    Duplicated { record: ContentRecord },
    /// A record was deleted.
    Deleted { record: ContentRecord },
    /// An archived record was restored to the draft stage.
    RestoredToStage { record: ContentRecord },
    /// A response was refused with a client-error status.
    PermissionDenied { status_code: u16 },
    /// A member was removed from a group, via either side's relation.
    MemberRemovedFromGroup { member: EntityId, group: EntityId },
    /// An MFA challenge was passed.
    MfaVerificationSucceeded { member: Principal, method: String },
    /// An MFA challenge was failed.
    MfaVerificationFailed { member: Principal, method: String },
    /// An MFA method was registered.
    MfaMethodRegistered { member: Principal, method: String },
    /// Registering an MFA method failed.
    MfaRegistrationFailed { member: Principal, method: String },
    /// Optional MFA registration was skipped.
    MfaRegistrationSkipped { member: Principal },
    /// A login session is being terminated.
    SessionTerminated { session: LoginSession },
}
