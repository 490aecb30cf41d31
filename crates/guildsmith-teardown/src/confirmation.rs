//! Confirmation gate
//!
//! Single-decision state machine guarding the destructive path:
//!
//! ```text
//! PROMPTED ──approve──▶ APPROVED
//!     │ ───cancel───▶ CANCELLED
//!     └──deadline───▶ TIMED_OUT
//! ```
//!
//! Only decisions from the invoker count. A session is consumed when it
//! reaches a terminal state and cannot be reopened.

use crate::error::TeardownError;
use guildsmith_core::{
    ConfirmationConfig, Control, ControlStyle, DecisionCollector, DecisionEvent, Message,
    SessionId, UserId,
};
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

/// Custom id of the approve button
pub const CONFIRM_CONTROL_ID: &str = "confirmar_exclusao";
/// Custom id of the cancel button
pub const CANCEL_CONTROL_ID: &str = "cancelar_exclusao";

/// Confirmation session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SessionState {
    /// Waiting for the invoker
    Prompted,
    /// Invoker approved; teardown may run
    Approved,
    /// Invoker cancelled
    Cancelled,
    /// Deadline passed without an accepted decision
    TimedOut,
}

impl SessionState {
    /// Check if no further transition is possible
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionState::Prompted)
    }
}

/// States reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: SessionState) -> Vec<SessionState> {
    use SessionState::*;
    match from {
        Prompted => vec![Approved, Cancelled, TimedOut],
        Approved | Cancelled | TimedOut => vec![],
    }
}

/// Validates a state transition
pub fn validate_transition(from: SessionState, to: SessionState) -> Result<(), TeardownError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(TeardownError::IllegalTransition { from, to })
    }
}

/// A decision carried by a button press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Proceed with teardown
    Approve,
    /// Abandon teardown
    Cancel,
}

impl Decision {
    /// Map a pressed control to a decision
    #[must_use]
    pub fn from_control_id(control_id: &str) -> Option<Self> {
        match control_id {
            CONFIRM_CONTROL_ID => Some(Decision::Approve),
            CANCEL_CONTROL_ID => Some(Decision::Cancel),
            _ => None,
        }
    }
}

/// Terminal result of a confirmation session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfirmationOutcome {
    /// Teardown may run
    Approved,
    /// Operator cancelled
    Cancelled,
    /// Nobody eligible decided in time
    TimedOut,
}

/// One pending confirmation, owned by the teardown request that opened it
#[derive(Debug)]
pub struct ConfirmationSession {
    id: SessionId,
    invoker: UserId,
    deadline: Instant,
    state: SessionState,
}

impl ConfirmationSession {
    /// Open a session whose deadline is `timeout` from now
    #[must_use]
    pub fn open(invoker: UserId, timeout: Duration) -> Self {
        let session = Self {
            id: SessionId::new(),
            invoker,
            deadline: Instant::now() + timeout,
            state: SessionState::Prompted,
        };
        tracing::info!(session = %session.id, %invoker, timeout_secs = timeout.as_secs(), "confirmation prompted");
        session
    }

    /// Session identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Member allowed to decide
    #[inline]
    #[must_use]
    pub fn invoker(&self) -> UserId {
        self.invoker
    }

    /// Point in time after which the session times out
    #[inline]
    #[must_use]
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Feed one decision event
    ///
    /// Events from other members, unknown controls and events after a
    /// terminal state leave the session unchanged.
    pub fn offer(&mut self, event: &DecisionEvent) -> SessionState {
        if self.state.is_terminal() {
            return self.state;
        }
        if event.user != self.invoker {
            tracing::debug!(session = %self.id, user = %event.user, "ignoring decision from non-invoker");
            return self.state;
        }
        let target = match Decision::from_control_id(&event.control_id) {
            Some(Decision::Approve) => SessionState::Approved,
            Some(Decision::Cancel) => SessionState::Cancelled,
            None => {
                tracing::debug!(session = %self.id, control = %event.control_id, "ignoring unknown control");
                return self.state;
            }
        };
        self.transition(target)
    }

    /// Mark the deadline as reached
    pub fn expire(&mut self) -> SessionState {
        if self.state.is_terminal() {
            return self.state;
        }
        self.transition(SessionState::TimedOut)
    }

    /// Wait for the invoker's decision or the deadline, whichever comes first
    ///
    /// If the collector closes early, the session still runs to its deadline.
    pub async fn await_outcome<C>(mut self, collector: &mut C) -> ConfirmationOutcome
    where
        C: DecisionCollector + ?Sized,
    {
        loop {
            match tokio::time::timeout_at(self.deadline, collector.next_decision()).await {
                Ok(Some(event)) => {
                    if self.offer(&event).is_terminal() {
                        break;
                    }
                }
                Ok(None) => {
                    tokio::time::sleep_until(self.deadline).await;
                    self.expire();
                    break;
                }
                Err(_) => {
                    self.expire();
                    break;
                }
            }
        }

        let outcome = match self.state {
            SessionState::Approved => ConfirmationOutcome::Approved,
            SessionState::Cancelled => ConfirmationOutcome::Cancelled,
            SessionState::TimedOut | SessionState::Prompted => ConfirmationOutcome::TimedOut,
        };
        tracing::info!(session = %self.id, ?outcome, "confirmation resolved");
        outcome
    }

    fn transition(&mut self, to: SessionState) -> SessionState {
        match validate_transition(self.state, to) {
            Ok(()) => self.state = to,
            Err(e) => tracing::warn!(session = %self.id, error = %e, "transition refused"),
        }
        self.state
    }
}

/// Opens confirmation sessions with the configured deadline
#[derive(Debug, Clone, Default)]
pub struct ConfirmationGate {
    config: ConfirmationConfig,
}

impl ConfirmationGate {
    /// Create gate
    #[inline]
    #[must_use]
    pub fn new(config: ConfirmationConfig) -> Self {
        Self { config }
    }

    /// Time the invoker has to decide
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.config.timeout()
    }

    /// Open a session for `invoker`
    #[must_use]
    pub fn open(&self, invoker: UserId) -> ConfirmationSession {
        ConfirmationSession::open(invoker, self.timeout())
    }

    /// Prompt shown to the invoker
    #[must_use]
    pub fn prompt(&self, exempt_channel: &str) -> Message {
        Message::text(format!(
            "⚠️ Tem certeza que deseja excluir todas as categorias, canais (exceto \"{exempt_channel}\") e cargos? Essa ação é irreversível!"
        ))
        .with_control(Control::new(
            CONFIRM_CONTROL_ID,
            "Confirmar Exclusão",
            ControlStyle::Danger,
        ))
        .with_control(Control::new(
            CANCEL_CONTROL_ID,
            "Cancelar",
            ControlStyle::Secondary,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tokio::sync::mpsc;

    const INVOKER: UserId = UserId(1);
    const OTHER: UserId = UserId(2);

    fn state_strategy() -> impl Strategy<Value = SessionState> {
        prop_oneof![
            Just(SessionState::Prompted),
            Just(SessionState::Approved),
            Just(SessionState::Cancelled),
            Just(SessionState::TimedOut),
        ]
    }

    #[test]
    fn prompted_transitions() {
        assert!(validate_transition(SessionState::Prompted, SessionState::Approved).is_ok());
        assert!(validate_transition(SessionState::Prompted, SessionState::Cancelled).is_ok());
        assert!(validate_transition(SessionState::Prompted, SessionState::TimedOut).is_ok());
        assert!(validate_transition(SessionState::Prompted, SessionState::Prompted).is_err());
    }

    #[test]
    fn terminal_states_are_final() {
        assert!(validate_transition(SessionState::Approved, SessionState::Cancelled).is_err());
        assert!(validate_transition(SessionState::TimedOut, SessionState::Approved).is_err());
        assert!(validate_transition(SessionState::Cancelled, SessionState::Prompted).is_err());
    }

    proptest! {
        #[test]
        fn prop_validate_matches_table(from in state_strategy(), to in state_strategy()) {
            let allowed = allowed_transitions(from);
            prop_assert_eq!(validate_transition(from, to).is_ok(), allowed.contains(&to));
            if from.is_terminal() {
                prop_assert!(allowed.is_empty());
            }
        }
    }

    #[test]
    fn foreign_decision_is_ignored() {
        let mut session = ConfirmationSession::open(INVOKER, Duration::from_secs(30));

        let state = session.offer(&DecisionEvent::new(OTHER, CONFIRM_CONTROL_ID));
        assert_eq!(state, SessionState::Prompted);

        let state = session.offer(&DecisionEvent::new(INVOKER, CONFIRM_CONTROL_ID));
        assert_eq!(state, SessionState::Approved);
    }

    #[test]
    fn unknown_control_is_ignored() {
        let mut session = ConfirmationSession::open(INVOKER, Duration::from_secs(30));
        assert_eq!(
            session.offer(&DecisionEvent::new(INVOKER, "verificado")),
            SessionState::Prompted
        );
    }

    #[test]
    fn decision_after_terminal_state_is_ignored() {
        let mut session = ConfirmationSession::open(INVOKER, Duration::from_secs(30));
        session.offer(&DecisionEvent::new(INVOKER, CANCEL_CONTROL_ID));

        assert_eq!(
            session.offer(&DecisionEvent::new(INVOKER, CONFIRM_CONTROL_ID)),
            SessionState::Cancelled
        );
        assert_eq!(session.expire(), SessionState::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn approve_within_deadline() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let session = ConfirmationSession::open(INVOKER, Duration::from_secs(30));

        tx.send(DecisionEvent::new(INVOKER, CONFIRM_CONTROL_ID)).unwrap();
        assert_eq!(session.await_outcome(&mut rx).await, ConfirmationOutcome::Approved);
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_channel_delivers_decisions() {
        let (tx, mut rx) = mpsc::channel(4);
        let session = ConfirmationSession::open(INVOKER, Duration::from_secs(30));

        tx.send(DecisionEvent::new(OTHER, CANCEL_CONTROL_ID)).await.unwrap();
        tx.send(DecisionEvent::new(INVOKER, CANCEL_CONTROL_ID)).await.unwrap();

        assert_eq!(session.await_outcome(&mut rx).await, ConfirmationOutcome::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn no_decision_times_out_at_deadline() {
        let (_tx, mut rx) = mpsc::unbounded_channel::<DecisionEvent>();
        let start = Instant::now();
        let session = ConfirmationSession::open(INVOKER, Duration::from_secs(30));

        assert_eq!(session.await_outcome(&mut rx).await, ConfirmationOutcome::TimedOut);
        assert!(start.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn closed_collector_waits_for_deadline() {
        let (tx, mut rx) = mpsc::unbounded_channel::<DecisionEvent>();
        drop(tx);
        let start = Instant::now();
        let session = ConfirmationSession::open(INVOKER, Duration::from_secs(30));

        assert_eq!(session.await_outcome(&mut rx).await, ConfirmationOutcome::TimedOut);
        assert!(start.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn late_decision_is_too_late() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let session = ConfirmationSession::open(INVOKER, Duration::from_secs(30));

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(31)).await;
            let _ = tx.send(DecisionEvent::new(INVOKER, CONFIRM_CONTROL_ID));
        });

        assert_eq!(session.await_outcome(&mut rx).await, ConfirmationOutcome::TimedOut);
    }

    #[test]
    fn prompt_has_two_controls() {
        let prompt = ConfirmationGate::default().prompt("geral");
        let ids: Vec<_> = prompt.controls.iter().map(|c| c.custom_id.as_str()).collect();
        assert_eq!(ids, vec![CONFIRM_CONTROL_ID, CANCEL_CONTROL_ID]);
        assert!(prompt.content.contains("\"geral\""));
    }
}
