//! Offline simulation against the in-memory platform
//!
//! Drives the command router the way a gateway connection would, with
//! scripted confirmation decisions, and collects every reply.

use crate::commands::{CommandRouter, TeardownResolution};
use crate::error::GuildsmithError;
use guildsmith_core::{
    ChannelKind, DecisionEvent, GuildsmithConfig, InMemoryPlatform, Invoker, Message,
    PlatformError, Responder, UserId, Visibility, WorkspaceId,
};
use guildsmith_provision::BuildReport;
use guildsmith_teardown::{TeardownReport, CANCEL_CONTROL_ID, CONFIRM_CONTROL_ID};
use parking_lot::Mutex;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Workspace used by every simulation
pub const SIM_WORKSPACE: WorkspaceId = WorkspaceId(1);
/// Administrator issuing commands
pub const SIM_OPERATOR: UserId = UserId(100);
/// Member who presses buttons that are not theirs
pub const SIM_BYSTANDER: UserId = UserId(101);

/// Theme provisioned before a simulated teardown
const TEARDOWN_SEED_THEME: &str = "games";

/// Scripted answer to the teardown prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScriptedDecision {
    /// Operator approves
    Approve,
    /// Operator cancels
    Cancel,
    /// Nobody answers
    None,
    /// Another member approves first, then the operator
    ForeignThenApprove,
}

impl ScriptedDecision {
    /// Accepted command-line values
    pub const VALUES: [&'static str; 4] = ["approve", "cancel", "none", "foreign-then-approve"];

    fn events(self) -> Vec<DecisionEvent> {
        match self {
            ScriptedDecision::Approve => vec![DecisionEvent::new(SIM_OPERATOR, CONFIRM_CONTROL_ID)],
            ScriptedDecision::Cancel => vec![DecisionEvent::new(SIM_OPERATOR, CANCEL_CONTROL_ID)],
            ScriptedDecision::None => vec![],
            ScriptedDecision::ForeignThenApprove => vec![
                DecisionEvent::new(SIM_BYSTANDER, CONFIRM_CONTROL_ID),
                DecisionEvent::new(SIM_OPERATOR, CONFIRM_CONTROL_ID),
            ],
        }
    }
}

impl FromStr for ScriptedDecision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(ScriptedDecision::Approve),
            "cancel" => Ok(ScriptedDecision::Cancel),
            "none" => Ok(ScriptedDecision::None),
            "foreign-then-approve" => Ok(ScriptedDecision::ForeignThenApprove),
            other => Err(format!("unknown decision: {other}")),
        }
    }
}

/// Responder that keeps replies in order
#[derive(Debug, Default)]
pub struct TranscriptResponder {
    replies: Mutex<Vec<Message>>,
}

impl TranscriptResponder {
    /// Reply texts so far
    #[must_use]
    pub fn contents(&self) -> Vec<String> {
        self.replies.lock().iter().map(|m| m.content.clone()).collect()
    }
}

#[async_trait::async_trait]
impl Responder for TranscriptResponder {
    async fn defer(&self, visibility: Visibility) -> Result<(), PlatformError> {
        tracing::debug!(?visibility, "reply deferred");
        Ok(())
    }

    async fn edit_reply(&self, message: Message) -> Result<(), PlatformError> {
        tracing::debug!(content = %message.content, "reply");
        self.replies.lock().push(message);
        Ok(())
    }
}

/// Result of one simulated session
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimulationReport {
    /// Replies in delivery order
    pub replies: Vec<String>,
    /// One entry per successful provisioning run
    pub builds: Vec<BuildReport>,
    /// Errors surfaced by the commands
    pub errors: Vec<String>,
    /// Teardown result, when one ran
    pub teardown: Option<TeardownReport>,
    /// Roles left in the workspace
    pub roles_remaining: usize,
    /// Channels left in the workspace
    pub channels_remaining: usize,
}

/// In-memory workspace plus a router over it
#[derive(Debug)]
pub struct Simulation {
    platform: Arc<InMemoryPlatform>,
    router: CommandRouter,
}

impl Simulation {
    /// Workspace seeded with the exempt channel, the default principal and
    /// a managed integration role
    #[must_use]
    pub fn new(config: GuildsmithConfig) -> Self {
        let platform = Arc::new(InMemoryPlatform::new(SIM_WORKSPACE));
        platform.seed_channel(config.teardown.exempt_channel.clone(), ChannelKind::Text, None);
        platform.seed_role("Guildsmith", true);
        let router = CommandRouter::new(platform.clone(), config);
        Self { platform, router }
    }

    /// Backing platform
    #[inline]
    #[must_use]
    pub fn platform(&self) -> &Arc<InMemoryPlatform> {
        &self.platform
    }

    /// Run `create-structure` `runs` times
    pub async fn create_structure(&self, theme: &str, runs: usize) -> SimulationReport {
        let responder = TranscriptResponder::default();
        let mut report = SimulationReport::default();

        for _ in 0..runs {
            match self
                .router
                .create_structure(&responder, SIM_WORKSPACE, theme)
                .await
            {
                Ok(build) => report.builds.push(build),
                Err(e) => report.errors.push(e.to_string()),
            }
        }

        self.finish(report, &responder)
    }

    /// Provision a games structure, then run `teardown-all` with `decision`
    ///
    /// # Errors
    ///
    /// Returns an error if the preliminary provisioning run fails.
    pub async fn teardown(
        &self,
        decision: ScriptedDecision,
    ) -> Result<SimulationReport, GuildsmithError> {
        let responder = TranscriptResponder::default();
        let mut report = SimulationReport::default();

        let build = self
            .router
            .create_structure(&responder, SIM_WORKSPACE, TEARDOWN_SEED_THEME)
            .await?;
        report.builds.push(build);

        let (tx, mut rx) = mpsc::unbounded_channel();
        for event in decision.events() {
            // The receiver is alive for the whole call, so sends cannot fail.
            let _ = tx.send(event);
        }
        drop(tx);

        match self
            .router
            .teardown_all(
                &responder,
                SIM_WORKSPACE,
                Invoker::admin(SIM_OPERATOR),
                &mut rx,
            )
            .await
        {
            Ok(TeardownResolution::Completed(teardown)) => report.teardown = Some(teardown),
            Ok(TeardownResolution::Cancelled | TeardownResolution::TimedOut) => {}
            Err(e) => report.errors.push(e.to_string()),
        }

        Ok(self.finish(report, &responder))
    }

    fn finish(&self, mut report: SimulationReport, responder: &TranscriptResponder) -> SimulationReport {
        report.replies = responder.contents();
        report.roles_remaining = self.platform.roles().len();
        report.channels_remaining = self.platform.channels().len();
        report
    }
}
