//! Bulk teardown executor
//!
//! Deletes every channel except the exempt one and every role that is not
//! protected. Deletions are issued concurrently up to a configured bound,
//! and one failure never cancels its siblings: each target gets its own
//! outcome and the batch always runs to completion.

use crate::error::TeardownError;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use guildsmith_core::{
    ChannelId, ChannelInfo, ChannelKind, PlatformError, RoleId, RoleInfo, TeardownConfig,
    WorkspaceId, WorkspacePlatform,
};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// A single resource scheduled for deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DeletionTarget {
    /// Channel or category
    Channel {
        id: ChannelId,
        name: String,
        kind: ChannelKind,
    },
    /// Role
    Role { id: RoleId, name: String },
}

impl DeletionTarget {
    /// Display name of the target
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            DeletionTarget::Channel { name, .. } | DeletionTarget::Role { name, .. } => name,
        }
    }

    /// Check if this target is a channel
    #[inline]
    #[must_use]
    pub fn is_channel(&self) -> bool {
        matches!(self, DeletionTarget::Channel { .. })
    }
}

impl fmt::Display for DeletionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeletionTarget::Channel { id, name, .. } => write!(f, "channel '{name}' ({id})"),
            DeletionTarget::Role { id, name } => write!(f, "role '{name}' ({id})"),
        }
    }
}

/// What teardown will delete and what it keeps
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownPlan {
    /// Channels (categories included) to delete
    pub channels: Vec<DeletionTarget>,
    /// Roles to delete
    pub roles: Vec<DeletionTarget>,
    /// Channels kept because of the exemption
    pub retained_channels: usize,
    /// Roles kept because they are protected
    pub retained_roles: usize,
}

impl TeardownPlan {
    /// Partition a listing into targets and retained resources
    ///
    /// The exemption matches the channel name exactly.
    #[must_use]
    pub fn from_listing(channels: &[ChannelInfo], roles: &[RoleInfo], exempt_channel: &str) -> Self {
        let mut plan = Self::default();
        for channel in channels {
            if channel.name == exempt_channel {
                plan.retained_channels += 1;
                continue;
            }
            plan.channels.push(DeletionTarget::Channel {
                id: channel.id,
                name: channel.name.clone(),
                kind: channel.kind,
            });
        }
        for role in roles {
            if role.is_protected() {
                plan.retained_roles += 1;
                continue;
            }
            plan.roles.push(DeletionTarget::Role {
                id: role.id,
                name: role.name.clone(),
            });
        }
        plan
    }

    /// Total number of deletions this plan issues
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len() + self.roles.len()
    }

    /// Check if there is nothing to delete
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn into_targets(self) -> impl Iterator<Item = DeletionTarget> {
        self.channels.into_iter().chain(self.roles)
    }
}

/// Result of one deletion attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionOutcome {
    /// What was attempted
    pub target: DeletionTarget,
    /// Platform answer
    pub result: Result<(), PlatformError>,
}

impl DeletionOutcome {
    /// Check if the deletion succeeded
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Attempt counts of a finished batch
///
/// Counts attempts, not successes: a channel whose deletion failed is still
/// counted in `channels_attempted` and also in `failures`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeletionTally {
    pub channels_attempted: usize,
    pub roles_attempted: usize,
    pub failures: usize,
}

impl DeletionTally {
    /// Fold per-item outcomes into counts
    #[must_use]
    pub fn from_outcomes(outcomes: &[DeletionOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut tally, outcome| {
            if outcome.target.is_channel() {
                tally.channels_attempted += 1;
            } else {
                tally.roles_attempted += 1;
            }
            if !outcome.is_success() {
                tally.failures += 1;
            }
            tally
        })
    }
}

/// Report of a completed teardown
#[derive(Debug, Clone, Serialize)]
pub struct TeardownReport {
    pub tally: DeletionTally,
    pub retained_channels: usize,
    pub retained_roles: usize,
    /// Per-item outcomes in completion order
    #[serde(skip)]
    pub outcomes: Vec<DeletionOutcome>,
    pub completed_at: DateTime<Utc>,
}

impl TeardownReport {
    /// Outcomes that failed
    pub fn failures(&self) -> impl Iterator<Item = &DeletionOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

/// Issues the deletions of a teardown plan
#[derive(Clone)]
pub struct BulkTeardown {
    platform: Arc<dyn WorkspacePlatform>,
    config: TeardownConfig,
}

impl fmt::Debug for BulkTeardown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BulkTeardown")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BulkTeardown {
    /// Create executor
    #[must_use]
    pub fn new(platform: Arc<dyn WorkspacePlatform>, config: TeardownConfig) -> Self {
        Self { platform, config }
    }

    /// Executor settings
    #[inline]
    #[must_use]
    pub fn config(&self) -> &TeardownConfig {
        &self.config
    }

    /// List the workspace and compute the plan
    ///
    /// # Errors
    ///
    /// Returns [`TeardownError::Listing`] if either listing fails.
    pub async fn plan(&self, workspace: WorkspaceId) -> Result<TeardownPlan, TeardownError> {
        let channels = self
            .platform
            .list_channels(workspace)
            .await
            .map_err(|source| TeardownError::Listing {
                resource: "channels",
                source,
            })?;
        let roles = self
            .platform
            .list_roles(workspace)
            .await
            .map_err(|source| TeardownError::Listing {
                resource: "roles",
                source,
            })?;
        Ok(TeardownPlan::from_listing(
            &channels,
            &roles,
            &self.config.exempt_channel,
        ))
    }

    /// Plan and run the teardown of `workspace`
    ///
    /// # Errors
    ///
    /// Fails only when the workspace cannot be listed. Individual deletion
    /// failures are reported in the returned [`TeardownReport`].
    #[tracing::instrument(skip(self))]
    pub async fn execute(&self, workspace: WorkspaceId) -> Result<TeardownReport, TeardownError> {
        let plan = self.plan(workspace).await?;
        Ok(self.execute_plan(workspace, plan).await)
    }

    /// Run every deletion of `plan`, at most `max_concurrent_deletions` at once
    pub async fn execute_plan(&self, workspace: WorkspaceId, plan: TeardownPlan) -> TeardownReport {
        let retained_channels = plan.retained_channels;
        let retained_roles = plan.retained_roles;
        let limit = self.config.max_concurrent_deletions.max(1);
        tracing::info!(targets = plan.len(), limit, "starting bulk teardown");

        let outcomes: Vec<DeletionOutcome> = stream::iter(plan.into_targets())
            .map(|target| self.delete(workspace, target))
            .buffer_unordered(limit)
            .collect()
            .await;

        let tally = DeletionTally::from_outcomes(&outcomes);
        tracing::info!(
            channels = tally.channels_attempted,
            roles = tally.roles_attempted,
            failures = tally.failures,
            "bulk teardown finished"
        );

        TeardownReport {
            tally,
            retained_channels,
            retained_roles,
            outcomes,
            completed_at: Utc::now(),
        }
    }

    async fn delete(&self, workspace: WorkspaceId, target: DeletionTarget) -> DeletionOutcome {
        let result = match &target {
            DeletionTarget::Channel { id, .. } => self.platform.delete_channel(workspace, *id).await,
            DeletionTarget::Role { id, .. } => self.platform.delete_role(workspace, *id).await,
        };
        if let Err(e) = &result {
            tracing::warn!(%target, error = %e, "deletion failed");
        }
        DeletionOutcome { target, result }
    }
}
