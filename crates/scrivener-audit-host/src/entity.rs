//! Watched entities, join tables and resolvable relations.

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumIter, EnumString};

/// Identifier of a persisted host entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl EntityId {
    /// The raw identifier.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// The watched entity kinds: tables whose inserts and updates are always
/// inspected for audit relevance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumIter, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    /// An account/principal record.
    Member,
    /// A permission-bearing group.
    Group,
    /// A reusable permission role.
    PermissionRole,
    /// A single permission code attached to a role.
    PermissionRoleCode,
}

impl EntityKind {
    /// The host table backing this entity kind.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Member => "Member",
            Self::Group => "Group",
            Self::PermissionRole => "PermissionRole",
            Self::PermissionRoleCode => "PermissionRoleCode",
        }
    }

    /// Resolve a table name to a watched entity kind.
    pub fn from_table(table: &str) -> Option<Self> {
        use strum::IntoEnumIterator;
        Self::iter().find(|kind| kind.table() == table)
    }
}

/// A record loaded from the host by table and identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Record identifier.
    pub id: EntityId,
    /// Concrete class name as the host reports it (subclasses included).
    pub class_name: String,
    /// Display title.
    pub title: String,
    /// Email, for member records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Permission code value, for role-code records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl EntityRecord {
    /// Create a record with the mandatory fields.
    pub fn new(id: impl Into<EntityId>, class_name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            class_name: class_name.into(),
            title: title.into(),
            email: None,
            code: None,
        }
    }

    /// Attach an email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Attach a permission code value.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Email falling back to title, matching how principals are displayed.
    pub fn display_name(&self) -> &str {
        match self.email.as_deref() {
            Some(email) if !email.is_empty() => email,
            _ => &self.title,
        }
    }
}

/// Many-to-many join tables whose mutations require foreign-key lookups
/// rather than a single record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinTable {
    /// Roles attached to a group.
    GroupRoles,
    /// Members belonging to a group.
    GroupMembers,
}

impl JoinTable {
    /// The host table backing this join.
    pub fn table(&self) -> &'static str {
        match self {
            Self::GroupRoles => "Group_Roles",
            Self::GroupMembers => "Group_Members",
        }
    }

    /// Resolve a table name to a join table.
    pub fn from_table(table: &str) -> Option<Self> {
        match table {
            "Group_Roles" => Some(Self::GroupRoles),
            "Group_Members" => Some(Self::GroupMembers),
            _ => None,
        }
    }

    /// Field name of the group-side foreign key.
    pub fn group_key(&self) -> &'static str {
        "GroupID"
    }

    /// Field name of the non-group foreign key.
    pub fn related_key(&self) -> &'static str {
        match self {
            Self::GroupRoles => "PermissionRoleID",
            Self::GroupMembers => "MemberID",
        }
    }

    /// Entity kind on the non-group side of the join.
    pub fn related_kind(&self) -> EntityKind {
        match self {
            Self::GroupRoles => EntityKind::PermissionRole,
            Self::GroupMembers => EntityKind::Member,
        }
    }
}

/// Relational summaries the enricher can ask the host to resolve.
///
/// All are read-only lookups against current committed state; each yields
/// display strings (titles or permission codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Permission codes attached to a group, directly or via its roles.
    GroupPermissionCodes,
    /// Titles of groups a role is attached to.
    RoleGroups,
    /// Permission codes a role carries.
    RoleCodes,
    /// Titles of groups a member belongs to.
    MemberGroups,
    /// Titles of viewer groups attached to a content record.
    ContentViewerGroups,
    /// Titles of editor groups attached to a content record.
    ContentEditorGroups,
}
