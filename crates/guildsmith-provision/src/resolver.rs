//! Role resolver
//!
//! Find-before-create over a name index built from one fresh listing:
//! - Exact name match returns the existing role
//! - Otherwise the role is created and recorded in the index
//!
//! The index belongs to a single provisioning run and is never reused.

use guildsmith_core::{CreateRole, PlatformError, RoleId, WorkspaceId, WorkspacePlatform};
use indexmap::IndexMap;
use serde::Serialize;

/// Audit-log reason attached to created roles
pub const CREATE_REASON: &str = "Criação automática de cargos";

/// A resolved workspace role; identity is the display name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RoleHandle {
    /// Platform identifier
    pub id: RoleId,
    /// Display name
    pub name: String,
}

/// Per-run name → role index with create-on-miss
pub struct RoleResolver<'p> {
    platform: &'p dyn WorkspacePlatform,
    workspace: WorkspaceId,
    index: IndexMap<String, RoleHandle>,
    created: usize,
}

impl std::fmt::Debug for RoleResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleResolver")
            .field("workspace", &self.workspace)
            .field("indexed", &self.index.len())
            .field("created", &self.created)
            .finish_non_exhaustive()
    }
}

impl<'p> RoleResolver<'p> {
    /// Build the index from the workspace's current roles
    ///
    /// The default principal is never indexed. When several roles share a
    /// name the first one listed wins.
    ///
    /// # Errors
    /// - `PlatformError` if the listing cannot be read
    pub async fn load(
        platform: &'p dyn WorkspacePlatform,
        workspace: WorkspaceId,
    ) -> Result<Self, PlatformError> {
        let roles = platform.list_roles(workspace).await?;

        let mut index = IndexMap::with_capacity(roles.len());
        for role in roles.into_iter().filter(|r| !r.everyone) {
            index.entry(role.name.clone()).or_insert(RoleHandle {
                id: role.id,
                name: role.name,
            });
        }
        tracing::debug!(%workspace, indexed = index.len(), "role index loaded");

        Ok(Self {
            platform,
            workspace,
            index,
            created: 0,
        })
    }

    /// Return the role named `name`, creating it if the index has no match
    ///
    /// # Errors
    /// - `PlatformError` if the create call is rejected
    pub async fn resolve(&mut self, name: &str) -> Result<RoleHandle, PlatformError> {
        if let Some(handle) = self.index.get(name) {
            tracing::debug!(role = name, id = %handle.id, "reusing role");
            return Ok(handle.clone());
        }

        let request = CreateRole {
            name: name.to_string(),
            color: random_color(),
            reason: CREATE_REASON.to_string(),
        };
        let role = self
            .platform
            .create_role(self.workspace, request)
            .await
            .map_err(|e| {
                tracing::error!(role = name, error = %e, "role creation rejected");
                e
            })?;

        let handle = RoleHandle {
            id: role.id,
            name: name.to_string(),
        };
        self.index.insert(name.to_string(), handle.clone());
        self.created += 1;
        tracing::info!(role = name, id = %handle.id, "role created");

        Ok(handle)
    }

    /// Roles created by this resolver so far
    #[inline]
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.created
    }

    /// Handle for a name already in the index
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RoleHandle> {
        self.index.get(name)
    }

    /// Number of indexed roles
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if the index is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Random `0xRRGGBB` colour for a new role
fn random_color() -> u32 {
    rand::random::<u32>() & 0x00FF_FFFF
}
