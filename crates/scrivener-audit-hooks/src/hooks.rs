//! The audit subscriber: one handler per lifecycle hook.

use crate::{ContentRecord, DomainEvent, HookSubscriber, LoginSession, Visibility};
use scrivener_audit_host::{AuditContext, EntityId, EntityKind, EntityStore, Relation};
use scrivener_audit_log::AuditLogger;
use scrivener_audit_types::{AuditEvent, AuditEventKind, AuditSeverity, Principal};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

const LOGGED_IN: &str = "\"{actor}\" (ID: {actor_id}) successfully logged in";
const AUTO_LOGGED_IN: &str =
    "\"{actor}\" (ID: {actor_id}) successfully restored autologin session";
const LOGGED_OUT: &str = "\"{actor}\" (ID: {actor_id}) successfully logged out";
const LOGIN_FAILED: &str = "Failed login attempt using email \"{login}\"";
const LOGIN_FAILED_UNKNOWN: &str = "Could not determine username/email of failed \
    authentication. This could be due to login form not using Email or Login field \
    for POST data.";

const PUBLISHED: &str = "\"{actor}\" (ID: {actor_id}) published {type} \"{title}\" \
    (ID: {subject_id}, Version: {version}, ClassName: {class_name}, \
    Effective ViewerGroups: {viewer_groups}, Effective EditorGroups: {editor_groups})";
const UNPUBLISHED: &str =
    "\"{actor}\" (ID: {actor_id}) unpublished {type} \"{title}\" (ID: {subject_id})";
const REVERTED: &str = "\"{actor}\" (ID: {actor_id}) reverted {type} \"{title}\" \
    (ID: {subject_id}) to it's live version (#{version})";
const DUPLICATED: &str =
    "\"{actor}\" (ID: {actor_id}) duplicated {type} \"{title}\" (ID: {subject_id})";
const DELETED: &str =
    "\"{actor}\" (ID: {actor_id}) deleted {type} \"{title}\" (ID: {subject_id})";
const RESTORED: &str =
    "\"{actor}\" (ID: {actor_id}) restored {type} \"{title}\" to stage (ID: {subject_id})";

const PERMISSION_DENIED: &str =
    "HTTP code {status} - \"{actor}\" (ID: {actor_id}) is denied access to {uri}";

const MEMBER_REMOVED: &str = "\"{actor}\" (ID: {actor_id}) removed Member \"{member}\" \
    (ID: {member_id}) from Group \"{group}\" (ID: {group_id})";

const MFA_VERIFIED: &str =
    "\"{actor}\" (ID: {actor_id}) successfully verified using MFA method";
const MFA_VERIFY_FAILED: &str =
    "\"{actor}\" (ID: {actor_id}) failed to verify using MFA method";
const MFA_REGISTERED: &str = "\"{actor}\" (ID: {actor_id}) registered MFA method";
const MFA_REGISTER_FAILED: &str =
    "\"{actor}\" (ID: {actor_id}) failed registering new MFA method";
const MFA_SKIPPED: &str = "\"{actor}\" (ID: {actor_id}) skipped MFA registration";

const SESSION_TERMINATED: &str = "Login session (ID: {session_id}) for Member \
    \"{owner}\" (ID: {owner_id}) is being removed by Member \"{actor}\" (ID: {actor_id})";

/// Identity shown when a denial fires with no resolvable actor.
const UNAUTHENTICATED: &str = "(unauthenticated)";

/// Configuration for the hook handlers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HooksConfig {
    /// The host's account-lockout threshold; when set, failed MFA
    /// verifications report the member's attempt count against it.
    pub lock_out_after_incorrect_logins: Option<u32>,
}

/// The audit log's subscriber to host lifecycle events.
///
/// Most handlers are guarded on a resolvable, existing authenticated actor
/// and silently no-op without one. Authentication-failure and
/// permission-denied handlers fire regardless: there the failure itself is
/// the auditable fact.
pub struct AuditHooks {
    logger: AuditLogger,
    store: Arc<dyn EntityStore>,
    config: HooksConfig,
}

impl HookSubscriber for AuditHooks {
    fn on_event(&self, ctx: &AuditContext, event: &DomainEvent) {
        match event {
            DomainEvent::LoggedIn => self.on_logged_in(ctx),
            DomainEvent::AutoLoggedIn => self.on_auto_logged_in(ctx),
            DomainEvent::AuthenticationFailed { attempt } => {
                self.on_authentication_failed(ctx, attempt)
            }
            DomainEvent::LoggedOut => self.on_logged_out(ctx),
            DomainEvent::Published { record, original } => {
                self.on_published(ctx, record, original.as_ref())
            }
            DomainEvent::Unpublished { record } => self.on_unpublished(ctx, record),
            DomainEvent::RevertedToLive { record } => self.on_reverted_to_live(ctx, record),
            DomainEvent::Duplicated { record } => self.on_duplicated(ctx, record),
            DomainEvent::Deleted { record } => self.on_deleted(ctx, record),
            DomainEvent::RestoredToStage { record } => self.on_restored_to_stage(ctx, record),
            DomainEvent::PermissionDenied { status_code } => {
                self.on_permission_denied(ctx, *status_code)
            }
            DomainEvent::MemberRemovedFromGroup { member, group } => {
                self.on_member_removed_from_group(ctx, *member, *group)
            }
            DomainEvent::MfaVerificationSucceeded { member, method } => {
                self.on_mfa_verification_succeeded(ctx, member, method)
            }
            DomainEvent::MfaVerificationFailed { member, method } => {
                self.on_mfa_verification_failed(ctx, member, method)
            }
            DomainEvent::MfaMethodRegistered { member, method } => {
                self.on_mfa_method_registered(ctx, member, method)
            }
            DomainEvent::MfaRegistrationFailed { member, method } => {
                self.on_mfa_registration_failed(ctx, member, method)
            }
            DomainEvent::MfaRegistrationSkipped { member } => {
                self.on_mfa_registration_skipped(ctx, member)
            }
            DomainEvent::SessionTerminated { session } => {
                self.on_session_terminated(ctx, session)
            }
        }
    }
}

impl AuditHooks {
    /// Create the subscriber over the host store and audit logger.
    pub fn new(logger: AuditLogger, store: Arc<dyn EntityStore>, config: HooksConfig) -> Self {
        Self {
            logger,
            store,
            config,
        }
    }

    fn emit(&self, ctx: &AuditContext, event: AuditEvent) {
        self.logger.emit(&event, ctx.request.as_ref());
    }

    fn on_logged_in(&self, ctx: &AuditContext) {
        let Some(actor) = ctx.existing_actor() else { return };
        let event = AuditEvent::builder(AuditEventKind::Notice, LOGGED_IN)
            .actor(actor)
            .build();
        self.emit(ctx, event);
    }

    fn on_auto_logged_in(&self, ctx: &AuditContext) {
        let Some(actor) = ctx.existing_actor() else { return };
        let event = AuditEvent::builder(AuditEventKind::Notice, AUTO_LOGGED_IN)
            .actor(actor)
            .build();
        self.emit(ctx, event);
    }

    fn on_logged_out(&self, ctx: &AuditContext) {
        let Some(actor) = ctx.existing_actor() else { return };
        let event = AuditEvent::builder(AuditEventKind::Notice, LOGGED_OUT)
            .actor(actor)
            .build();
        self.emit(ctx, event);
    }

    /// Failed logins carry whatever the login form posted. LDAP-style forms
    /// use a `Login` field, the default form uses `Email`; with neither,
    /// the record degrades to a warning diagnostic with no identity.
    fn on_authentication_failed(&self, ctx: &AuditContext, attempt: &HashMap<String, String>) {
        let login = attempt
            .get("Login")
            .or_else(|| attempt.get("Email"))
            .filter(|value| !value.is_empty());

        let event = match login {
            Some(login) => AuditEvent::builder(AuditEventKind::Notice, LOGIN_FAILED)
                .field("login", login)
                .build(),
            None => AuditEvent::builder(AuditEventKind::Notice, LOGIN_FAILED_UNKNOWN)
                .severity(AuditSeverity::Warning)
                .build(),
        };
        self.emit(ctx, event);
    }

    /// Effective groups for a restricted record come from the pre-publish
    /// (original) state; a first-ever publish has no original, and the
    /// resolved list stays empty. Any empty resolution falls back to the
    /// visibility mode name itself.
    fn effective_groups(
        &self,
        mode: Visibility,
        relation: Relation,
        original: Option<&ContentRecord>,
    ) -> String {
        if mode == Visibility::OnlyTheseUsers {
            if let Some(original) = original {
                let titles = self.store.relation_titles(relation, original.id);
                if !titles.is_empty() {
                    return titles.join(", ");
                }
            }
        }
        mode.to_string()
    }

    fn content_event(
        &self,
        kind: AuditEventKind,
        template: &str,
        actor: &Principal,
        record: &ContentRecord,
    ) -> scrivener_audit_types::AuditEventBuilder {
        AuditEvent::builder(kind, template)
            .actor(actor)
            .target(
                scrivener_audit_types::Subject::new(&record.singular_name, record.id.value())
                    .with_title(&record.title),
            )
            .field("type", &record.singular_name)
            .field("title", &record.title)
            .field("subject_id", record.id.to_string())
    }

    fn on_published(
        &self,
        ctx: &AuditContext,
        record: &ContentRecord,
        original: Option<&ContentRecord>,
    ) {
        let Some(actor) = ctx.existing_actor() else { return };

        let viewer_groups =
            self.effective_groups(record.can_view, Relation::ContentViewerGroups, original);
        let editor_groups =
            self.effective_groups(record.can_edit, Relation::ContentEditorGroups, original);

        let event = self
            .content_event(AuditEventKind::Update, PUBLISHED, actor, record)
            .field("version", record.version.to_string())
            .field("class_name", &record.class_name)
            .field("viewer_groups", &viewer_groups)
            .field("editor_groups", &editor_groups)
            .extended("Effective ViewerGroups", viewer_groups.clone())
            .extended("Effective EditorGroups", editor_groups.clone())
            .build();
        self.emit(ctx, event);
    }

    fn on_unpublished(&self, ctx: &AuditContext, record: &ContentRecord) {
        let Some(actor) = ctx.existing_actor() else { return };
        let event = self
            .content_event(AuditEventKind::Update, UNPUBLISHED, actor, record)
            .build();
        self.emit(ctx, event);
    }

    fn on_reverted_to_live(&self, ctx: &AuditContext, record: &ContentRecord) {
        let Some(actor) = ctx.existing_actor() else { return };
        let event = self
            .content_event(AuditEventKind::Update, REVERTED, actor, record)
            .field("version", record.version.to_string())
            .build();
        self.emit(ctx, event);
    }

    fn on_duplicated(&self, ctx: &AuditContext, record: &ContentRecord) {
        let Some(actor) = ctx.existing_actor() else { return };
        let event = self
            .content_event(AuditEventKind::Create, DUPLICATED, actor, record)
            .build();
        self.emit(ctx, event);
    }

    fn on_deleted(&self, ctx: &AuditContext, record: &ContentRecord) {
        let Some(actor) = ctx.existing_actor() else { return };
        let event = self
            .content_event(AuditEventKind::Delete, DELETED, actor, record)
            .build();
        self.emit(ctx, event);
    }

    fn on_restored_to_stage(&self, ctx: &AuditContext, record: &ContentRecord) {
        let Some(actor) = ctx.existing_actor() else { return };
        let event = self
            .content_event(AuditEventKind::Update, RESTORED, actor, record)
            .build();
        self.emit(ctx, event);
    }

    /// Denials are audited for every client-error status. The denial is
    /// recorded even when no actor resolves; losing the record would hide
    /// exactly the probing this hook exists to surface.
    fn on_permission_denied(&self, ctx: &AuditContext, status_code: u16) {
        if !(400..500).contains(&status_code) {
            return;
        }

        let uri = ctx.request_uri().unwrap_or_default().to_string();
        let mut builder = AuditEvent::builder(AuditEventKind::Notice, PERMISSION_DENIED)
            .field("status", status_code.to_string());
        builder = match ctx.existing_actor() {
            Some(actor) => builder.actor(actor),
            None => builder
                .field("actor", UNAUTHENTICATED)
                .field("actor_id", "0"),
        };
        let event = builder.field("uri", uri).build();
        self.emit(ctx, event);
    }

    fn on_member_removed_from_group(&self, ctx: &AuditContext, member: EntityId, group: EntityId) {
        let Some(actor) = ctx.existing_actor() else { return };
        let Some(member) = self.store.load(EntityKind::Member, member) else {
            return;
        };
        let Some(group) = self.store.load(EntityKind::Group, group) else {
            return;
        };

        let event = AuditEvent::builder(AuditEventKind::Update, MEMBER_REMOVED)
            .actor(actor)
            .field("member", member.display_name())
            .field("member_id", member.id.to_string())
            .field("group", &group.title)
            .field("group_id", group.id.to_string())
            .build();
        self.emit(ctx, event);
    }

    fn on_mfa_verification_succeeded(&self, ctx: &AuditContext, member: &Principal, method: &str) {
        let event = AuditEvent::builder(AuditEventKind::Notice, MFA_VERIFIED)
            .actor(member)
            .extended("method", method)
            .build();
        self.emit(ctx, event);
    }

    fn on_mfa_verification_failed(&self, ctx: &AuditContext, member: &Principal, method: &str) {
        let mut builder = AuditEvent::builder(AuditEventKind::Notice, MFA_VERIFY_FAILED)
            .actor(member)
            .extended("method", method);
        if let Some(limit) = self.config.lock_out_after_incorrect_logins {
            builder = builder
                .extended(
                    "attempts",
                    member.failed_login_count.unwrap_or_default().to_string(),
                )
                .extended("attempt_limit", limit.to_string());
        }
        self.emit(ctx, builder.build());
    }

    fn on_mfa_method_registered(&self, ctx: &AuditContext, member: &Principal, method: &str) {
        let event = AuditEvent::builder(AuditEventKind::Notice, MFA_REGISTERED)
            .actor(member)
            .extended("method", method)
            .build();
        self.emit(ctx, event);
    }

    fn on_mfa_registration_failed(&self, ctx: &AuditContext, member: &Principal, method: &str) {
        let event = AuditEvent::builder(AuditEventKind::Notice, MFA_REGISTER_FAILED)
            .actor(member)
            .extended("method", method)
            .build();
        self.emit(ctx, event);
    }

    fn on_mfa_registration_skipped(&self, ctx: &AuditContext, member: &Principal) {
        let event = AuditEvent::builder(AuditEventKind::Notice, MFA_SKIPPED)
            .actor(member)
            .build();
        self.emit(ctx, event);
    }

    fn on_session_terminated(&self, ctx: &AuditContext, session: &LoginSession) {
        let Some(actor) = ctx.existing_actor() else { return };
        if !session.owner.exists() {
            return;
        }

        let event = AuditEvent::builder(AuditEventKind::Notice, SESSION_TERMINATED)
            .actor(actor)
            .field("session_id", session.id.to_string())
            .field("owner", session.owner.display_name())
            .field("owner_id", session.owner.id.to_string())
            .build();
        self.emit(ctx, event);
    }
}
