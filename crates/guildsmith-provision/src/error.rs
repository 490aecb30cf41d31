//! Error types for provisioning
//!
//! A provisioning run either fails validation before touching the workspace,
//! or aborts part-way with a record of what it had already created.

use guildsmith_core::{PlatformError, ValidationError};
use serde::Serialize;

/// Provisioning errors
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// Input rejected before any mutation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Platform rejected a call; the rest of the run was skipped
    #[error("{stage} '{resource}' failed after {progress}: {source}")]
    Aborted {
        /// Step that was running
        stage: BuildStage,
        /// Name of the resource being read or created
        resource: String,
        /// Resources already in place (not rolled back)
        progress: BuildProgress,
        /// Underlying rejection
        #[source]
        source: PlatformError,
    },
}

impl ProvisionError {
    /// Check if nothing was mutated
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Partial progress, if the run got past validation
    #[inline]
    #[must_use]
    pub fn progress(&self) -> Option<&BuildProgress> {
        match self {
            Self::Aborted { progress, .. } => Some(progress),
            Self::Validation(_) => None,
        }
    }

    /// Underlying platform rejection
    #[inline]
    #[must_use]
    pub fn platform_error(&self) -> Option<&PlatformError> {
        match self {
            Self::Aborted { source, .. } => Some(source),
            Self::Validation(_) => None,
        }
    }
}

/// Step of a provisioning run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BuildStage {
    /// Reading the role listing
    ListRoles,
    /// Creating a role
    Role,
    /// Creating a template category
    Category,
    /// Creating a template channel
    Channel,
    /// Creating a per-game category or channel
    GameCategory,
    /// Creating the verification gateway
    Gateway,
}

impl std::fmt::Display for BuildStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            BuildStage::ListRoles => "listing roles",
            BuildStage::Role => "creating role",
            BuildStage::Category => "creating category",
            BuildStage::Channel => "creating channel",
            BuildStage::GameCategory => "creating game category",
            BuildStage::Gateway => "creating verification gateway",
        };
        f.write_str(label)
    }
}

/// Counters accumulated by a provisioning run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildProgress {
    /// Distinct roles resolved (reused or created)
    pub roles_resolved: usize,
    /// Roles that had to be created
    pub roles_created: usize,
    /// Categories created
    pub categories_created: usize,
    /// Text and voice channels created, gateway included
    pub channels_created: usize,
}

impl std::fmt::Display for BuildProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} roles ({} new), {} categories, {} channels",
            self.roles_resolved, self.roles_created, self.categories_created, self.channels_created
        )
    }
}
