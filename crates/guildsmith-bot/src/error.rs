//! Top-level error type
//!
//! Wraps every concern's error so command handlers can use `?` across
//! provisioning, teardown and configuration.

use guildsmith_core::{ConfigError, PlatformError, ValidationError};
use guildsmith_provision::ProvisionError;
use guildsmith_teardown::TeardownError;

/// Main Guildsmith error type
#[derive(Debug, thiserror::Error)]
pub enum GuildsmithError {
    /// Input rejected before any mutation
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Provisioning run aborted
    #[error("provisioning failed: {0}")]
    Provision(#[from] ProvisionError),

    /// Teardown could not start
    #[error("teardown failed: {0}")]
    Teardown(#[from] TeardownError),

    /// Platform call outside the engines failed
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invoker lacks the operator permission
    #[error("administrator permission required")]
    NotAdministrator,
}

impl GuildsmithError {
    /// Check if the input itself was invalid
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        match self {
            GuildsmithError::Validation(_) => true,
            GuildsmithError::Provision(e) => e.is_validation(),
            _ => false,
        }
    }

    /// Check if retrying the same command may succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            GuildsmithError::Platform(e) => e.is_retryable(),
            GuildsmithError::Provision(e) => e.platform_error().is_some_and(PlatformError::is_retryable),
            GuildsmithError::Teardown(TeardownError::Listing { source, .. }) => source.is_retryable(),
            _ => false,
        }
    }
}
