//! Core types for Guildsmith
//!
//! Defines the workspace resources the engine reads and mutates:
//! - Platform identifiers (snowflake-style) and run/session identifiers
//! - Roles, channels and their kinds
//! - Permission overwrites and principals
//! - Creation requests handed to the platform

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use ulid::Ulid;

macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw numeric value
            #[inline]
            #[must_use]
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

snowflake_id!(
    /// Workspace (community server) identifier
    WorkspaceId
);
snowflake_id!(
    /// Role identifier
    RoleId
);
snowflake_id!(
    /// Channel identifier (categories are channels too)
    ChannelId
);
snowflake_id!(
    /// Member / operator identifier
    UserId
);

/// Provisioning run identifier (ULID for sortability in logs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunId(pub Ulid);

impl RunId {
    /// Generate new run ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Confirmation session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Ulid);

impl SessionId {
    /// Generate new session ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Channel permission bits the engine grants or denies
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Permission {
    /// See the channel in the sidebar
    ViewChannel,
    /// Post messages in a text channel
    SendMessages,
    /// Join a voice channel
    Connect,
    /// Talk in a voice channel
    Speak,
}

/// Kind of channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelKind {
    /// Grouping container for other channels
    Category,
    /// Text channel
    Text,
    /// Voice channel
    Voice,
}

impl ChannelKind {
    /// Check if this is a grouping container
    #[inline]
    #[must_use]
    pub fn is_category(&self) -> bool {
        matches!(self, ChannelKind::Category)
    }
}

/// Subject of a permission overwrite
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Principal {
    /// The implicit default ("everyone") group of the workspace
    Everyone,
    /// A concrete role
    Role(RoleId),
}

/// Per-resource permission delta for one principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOverwrite {
    /// Who the overwrite applies to
    pub principal: Principal,
    /// Explicitly granted permissions
    pub allow: BTreeSet<Permission>,
    /// Explicitly denied permissions
    pub deny: BTreeSet<Permission>,
}

impl PermissionOverwrite {
    /// Overwrite that only grants
    #[must_use]
    pub fn allow(principal: Principal, permissions: &[Permission]) -> Self {
        Self {
            principal,
            allow: permissions.iter().copied().collect(),
            deny: BTreeSet::new(),
        }
    }

    /// Overwrite that only denies
    #[must_use]
    pub fn deny(principal: Principal, permissions: &[Permission]) -> Self {
        Self {
            principal,
            allow: BTreeSet::new(),
            deny: permissions.iter().copied().collect(),
        }
    }
}

/// A role as listed by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleInfo {
    /// Platform identifier
    pub id: RoleId,
    /// Display name
    pub name: String,
    /// Owned by an integration; never deleted by this system
    pub managed: bool,
    /// The workspace's default principal
    pub everyone: bool,
}

impl RoleInfo {
    /// Whether teardown must leave this role alone
    #[inline]
    #[must_use]
    pub fn is_protected(&self) -> bool {
        self.managed || self.everyone
    }
}

/// A channel as listed by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    /// Platform identifier
    pub id: ChannelId,
    /// Display name
    pub name: String,
    /// Channel kind
    pub kind: ChannelKind,
    /// Parent category, if nested
    pub parent: Option<ChannelId>,
    /// Overwrites attached at creation
    pub overwrites: Vec<PermissionOverwrite>,
}

/// Role creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRole {
    /// Display name
    pub name: String,
    /// RGB colour (`0xRRGGBB`)
    pub color: u32,
    /// Audit-log reason
    pub reason: String,
}

/// Channel creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateChannel {
    /// Display name
    pub name: String,
    /// Channel kind
    pub kind: ChannelKind,
    /// Parent category
    pub parent: Option<ChannelId>,
    /// Overwrites to attach
    pub overwrites: Vec<PermissionOverwrite>,
}

impl CreateChannel {
    /// New top-level channel request
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ChannelKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: None,
            overwrites: Vec::new(),
        }
    }

    /// Nest under a category
    #[inline]
    #[must_use]
    pub fn under(mut self, parent: ChannelId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Attach overwrites
    #[inline]
    #[must_use]
    pub fn with_overwrites(mut self, overwrites: Vec<PermissionOverwrite>) -> Self {
        self.overwrites = overwrites;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_protection() {
        let mut role = RoleInfo {
            id: RoleId(1),
            name: "DJ".to_string(),
            managed: false,
            everyone: false,
        };
        assert!(!role.is_protected());

        role.managed = true;
        assert!(role.is_protected());

        role.managed = false;
        role.everyone = true;
        assert!(role.is_protected());
    }

    #[test]
    fn create_channel_builder() {
        let req = CreateChannel::new("🎧-geral", ChannelKind::Text)
            .under(ChannelId(7))
            .with_overwrites(vec![PermissionOverwrite::deny(
                Principal::Everyone,
                &[Permission::ViewChannel],
            )]);

        assert_eq!(req.parent, Some(ChannelId(7)));
        assert_eq!(req.overwrites.len(), 1);
        assert!(req.overwrites[0].deny.contains(&Permission::ViewChannel));
    }

    #[test]
    fn ids_display() {
        assert_eq!(RoleId(42).to_string(), "42");
        assert_ne!(RunId::new(), RunId::new());
    }
}
