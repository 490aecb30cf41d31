//! Testing utilities for Guildsmith workspace
//!
//! Shared fixtures, a recording responder and decision-event helpers.

#![allow(missing_docs)]

use guildsmith_core::{
    ChannelKind, DecisionEvent, InMemoryPlatform, Message, PlatformError, Responder, UserId,
    Visibility, WorkspaceId,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

pub const WORKSPACE: WorkspaceId = WorkspaceId(1_000);
pub const OPERATOR: UserId = UserId(7);
pub const OTHER_USER: UserId = UserId(8);
pub const EXEMPT_CHANNEL: &str = "geral";

/// Workspace holding only the default principal
pub fn empty_platform() -> Arc<InMemoryPlatform> {
    Arc::new(InMemoryPlatform::new(WORKSPACE))
}

/// Workspace with the exempt channel and one managed integration role
pub fn seeded_platform() -> Arc<InMemoryPlatform> {
    let platform = empty_platform();
    platform.seed_channel(EXEMPT_CHANNEL, ChannelKind::Text, None);
    platform.seed_role("Guildsmith Bot", true);
    platform
}

/// Count of channels and roles teardown is expected to attempt
pub fn expected_teardown(platform: &InMemoryPlatform) -> (usize, usize) {
    let channels = platform
        .channels()
        .iter()
        .filter(|c| c.name != EXEMPT_CHANNEL)
        .count();
    let roles = platform.roles().iter().filter(|r| !r.is_protected()).count();
    (channels, roles)
}

/// Decision event stream fed by the test
pub fn decision_channel() -> (
    mpsc::UnboundedSender<DecisionEvent>,
    mpsc::UnboundedReceiver<DecisionEvent>,
) {
    mpsc::unbounded_channel()
}

/// Responder that keeps every interaction for later assertions
#[derive(Debug, Default)]
pub struct RecordingResponder {
    deferred: Mutex<Vec<Visibility>>,
    replies: Mutex<Vec<Message>>,
}

impl RecordingResponder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn deferred(&self) -> Vec<Visibility> {
        self.deferred.lock().clone()
    }

    pub fn replies(&self) -> Vec<Message> {
        self.replies.lock().clone()
    }

    /// Content of the most recent reply
    pub fn last_content(&self) -> Option<String> {
        self.replies.lock().last().map(|m| m.content.clone())
    }
}

#[async_trait::async_trait]
impl Responder for RecordingResponder {
    async fn defer(&self, visibility: Visibility) -> Result<(), PlatformError> {
        self.deferred.lock().push(visibility);
        Ok(())
    }

    async fn edit_reply(&self, message: Message) -> Result<(), PlatformError> {
        self.replies.lock().push(message);
        Ok(())
    }
}
