//! Guildsmith Teardown - confirmation-gated bulk deletion
//!
//! Two pieces, composed by the command layer:
//! - [`ConfirmationGate`] opens a single-decision session that only the
//!   invoker can resolve before a deadline
//! - [`BulkTeardown`] deletes every non-exempt channel and every
//!   unprotected role with bounded concurrency and per-item outcomes
//!
//! # Example
//!
//! ```rust,ignore
//! use guildsmith_teardown::{BulkTeardown, ConfirmationGate, ConfirmationOutcome};
//!
//! # async fn example(
//! #     platform: std::sync::Arc<dyn guildsmith_core::WorkspacePlatform>,
//! #     mut decisions: tokio::sync::mpsc::UnboundedReceiver<guildsmith_core::DecisionEvent>,
//! # ) {
//! let session = ConfirmationGate::default().open(guildsmith_core::UserId(7));
//! if session.await_outcome(&mut decisions).await == ConfirmationOutcome::Approved {
//!     let report = BulkTeardown::new(platform, Default::default())
//!         .execute(guildsmith_core::WorkspaceId(1))
//!         .await
//!         .unwrap();
//!     println!("{} failures", report.tally.failures);
//! }
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod confirmation;
pub mod error;
pub mod executor;

pub use confirmation::{
    allowed_transitions, validate_transition, ConfirmationGate, ConfirmationOutcome,
    ConfirmationSession, Decision, SessionState, CANCEL_CONTROL_ID, CONFIRM_CONTROL_ID,
};
pub use error::TeardownError;
pub use executor::{
    BulkTeardown, DeletionOutcome, DeletionTally, DeletionTarget, TeardownPlan, TeardownReport,
};
