//! Platform collaborator contract
//!
//! The engine never talks to the remote API directly. Everything it needs is
//! expressed by three seams:
//! - [`WorkspacePlatform`]: list/create/delete of roles and channels
//! - [`Responder`]: deferred, ephemeral replies to the invoking operator
//! - [`DecisionCollector`]: button presses delivered one at a time

use crate::error::PlatformError;
use crate::interaction::{DecisionEvent, Message, Visibility};
use crate::types::{ChannelId, ChannelInfo, CreateChannel, CreateRole, RoleId, RoleInfo, UserId, WorkspaceId};
use tokio::sync::mpsc;

/// Remote resource API scoped to a workspace
///
/// Implementations are expected to be rate limited and eventually consistent;
/// every call may fail with [`PlatformError`].
#[async_trait::async_trait]
pub trait WorkspacePlatform: Send + Sync {
    /// Current role listing, default principal included
    async fn list_roles(&self, workspace: WorkspaceId) -> Result<Vec<RoleInfo>, PlatformError>;

    /// Create a role
    async fn create_role(
        &self,
        workspace: WorkspaceId,
        request: CreateRole,
    ) -> Result<RoleInfo, PlatformError>;

    /// Delete a role
    async fn delete_role(&self, workspace: WorkspaceId, role: RoleId) -> Result<(), PlatformError>;

    /// Current channel listing, categories included
    async fn list_channels(&self, workspace: WorkspaceId) -> Result<Vec<ChannelInfo>, PlatformError>;

    /// Create a channel or category
    async fn create_channel(
        &self,
        workspace: WorkspaceId,
        request: CreateChannel,
    ) -> Result<ChannelInfo, PlatformError>;

    /// Delete a channel or category
    async fn delete_channel(
        &self,
        workspace: WorkspaceId,
        channel: ChannelId,
    ) -> Result<(), PlatformError>;

    /// Post a message into a channel
    async fn send_message(&self, channel: ChannelId, message: Message) -> Result<(), PlatformError>;

    /// Grant a role to a member
    async fn add_member_role(
        &self,
        workspace: WorkspaceId,
        user: UserId,
        role: RoleId,
    ) -> Result<(), PlatformError>;
}

/// Reply channel back to the operator who issued a command
#[async_trait::async_trait]
pub trait Responder: Send + Sync {
    /// Acknowledge now, answer later
    async fn defer(&self, visibility: Visibility) -> Result<(), PlatformError>;

    /// Replace the current reply
    async fn edit_reply(&self, message: Message) -> Result<(), PlatformError>;
}

/// Source of button presses for one prompt
///
/// Yields `None` once no further events can arrive.
#[async_trait::async_trait]
pub trait DecisionCollector: Send {
    /// Next decision event, in arrival order
    async fn next_decision(&mut self) -> Option<DecisionEvent>;
}

#[async_trait::async_trait]
impl DecisionCollector for mpsc::Receiver<DecisionEvent> {
    async fn next_decision(&mut self) -> Option<DecisionEvent> {
        self.recv().await
    }
}

#[async_trait::async_trait]
impl DecisionCollector for mpsc::UnboundedReceiver<DecisionEvent> {
    async fn next_decision(&mut self) -> Option<DecisionEvent> {
        self.recv().await
    }
}
