//! Error types for teardown
//!
//! Individual deletion failures are never errors here: they are recorded as
//! per-item outcomes. Only failures that prevent the batch from starting are.

use crate::confirmation::SessionState;
use guildsmith_core::PlatformError;

/// Teardown errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TeardownError {
    /// Listing the workspace failed; nothing was deleted
    #[error("failed to list {resource}: {source}")]
    Listing {
        /// "channels" or "roles"
        resource: &'static str,
        #[source]
        source: PlatformError,
    },

    /// Confirmation state machine refused a transition
    #[error("illegal confirmation transition: {from:?} -> {to:?}")]
    IllegalTransition { from: SessionState, to: SessionState },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_error_display() {
        let err = TeardownError::Listing {
            resource: "roles",
            source: PlatformError::Forbidden("view audit".to_string()),
        };
        assert_eq!(err.to_string(), "failed to list roles: forbidden: view audit");
    }
}
