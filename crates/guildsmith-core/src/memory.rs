//! In-memory workspace platform
//!
//! A faithful stand-in for the remote API, used by the simulation binary and
//! by tests. Supports failure injection by resource name and optional
//! per-call latency so concurrent deletion can be observed.

use crate::error::PlatformError;
use crate::interaction::Message;
use crate::platform::WorkspacePlatform;
use crate::types::{
    ChannelId, ChannelInfo, ChannelKind, CreateChannel, CreateRole, RoleId, RoleInfo, UserId,
    WorkspaceId,
};
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Mutable workspace contents
#[derive(Debug, Default)]
struct State {
    roles: Vec<RoleInfo>,
    channels: Vec<ChannelInfo>,
    messages: Vec<(ChannelId, Message)>,
    member_roles: HashMap<UserId, BTreeSet<RoleId>>,
    create_failures: HashMap<String, PlatformError>,
    delete_failures: HashMap<String, PlatformError>,
    grant_failures: HashMap<String, PlatformError>,
    role_creates: usize,
    channel_creates: usize,
    delete_calls: usize,
}

/// In-memory implementation of [`WorkspacePlatform`] for a single workspace
#[derive(Debug)]
pub struct InMemoryPlatform {
    workspace: WorkspaceId,
    next_id: AtomicU64,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    state: Mutex<State>,
}

impl InMemoryPlatform {
    /// Empty workspace holding only its default principal
    #[must_use]
    pub fn new(workspace: WorkspaceId) -> Self {
        let everyone = RoleInfo {
            id: RoleId(workspace.get()),
            name: "@everyone".to_string(),
            managed: false,
            everyone: true,
        };
        Self {
            workspace,
            next_id: AtomicU64::new(workspace.get() + 1),
            latency: None,
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            state: Mutex::new(State {
                roles: vec![everyone],
                ..State::default()
            }),
        }
    }

    /// Delay every mutating call by `latency`
    #[inline]
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Workspace served by this platform
    #[inline]
    #[must_use]
    pub fn workspace(&self) -> WorkspaceId {
        self.workspace
    }

    /// Insert a role without going through the API
    pub fn seed_role(&self, name: impl Into<String>, managed: bool) -> RoleId {
        let id = RoleId(self.allocate());
        self.state.lock().roles.push(RoleInfo {
            id,
            name: name.into(),
            managed,
            everyone: false,
        });
        id
    }

    /// Insert a channel without going through the API
    pub fn seed_channel(
        &self,
        name: impl Into<String>,
        kind: ChannelKind,
        parent: Option<ChannelId>,
    ) -> ChannelId {
        let id = ChannelId(self.allocate());
        self.state.lock().channels.push(ChannelInfo {
            id,
            name: name.into(),
            kind,
            parent,
            overwrites: Vec::new(),
        });
        id
    }

    /// Reject future creates of a resource with this name
    pub fn fail_create_of(&self, name: impl Into<String>, error: PlatformError) {
        self.state.lock().create_failures.insert(name.into(), error);
    }

    /// Reject future deletes of a resource with this name
    pub fn fail_delete_of(&self, name: impl Into<String>, error: PlatformError) {
        self.state.lock().delete_failures.insert(name.into(), error);
    }

    /// Reject future grants of the role with this name
    pub fn fail_grant_of(&self, name: impl Into<String>, error: PlatformError) {
        self.state.lock().grant_failures.insert(name.into(), error);
    }

    /// Snapshot of all roles
    #[must_use]
    pub fn roles(&self) -> Vec<RoleInfo> {
        self.state.lock().roles.clone()
    }

    /// Snapshot of all channels
    #[must_use]
    pub fn channels(&self) -> Vec<ChannelInfo> {
        self.state.lock().channels.clone()
    }

    /// Channels of one kind
    #[must_use]
    pub fn channels_of(&self, kind: ChannelKind) -> Vec<ChannelInfo> {
        self.state
            .lock()
            .channels
            .iter()
            .filter(|c| c.kind == kind)
            .cloned()
            .collect()
    }

    /// Messages posted so far, in order
    #[must_use]
    pub fn messages(&self) -> Vec<(ChannelId, Message)> {
        self.state.lock().messages.clone()
    }

    /// Roles granted to a member
    #[must_use]
    pub fn member_roles(&self, user: UserId) -> BTreeSet<RoleId> {
        self.state
            .lock()
            .member_roles
            .get(&user)
            .cloned()
            .unwrap_or_default()
    }

    /// Role by exact name
    #[must_use]
    pub fn role_named(&self, name: &str) -> Option<RoleInfo> {
        self.state.lock().roles.iter().find(|r| r.name == name).cloned()
    }

    /// Number of successful role creations
    #[must_use]
    pub fn role_creates(&self) -> usize {
        self.state.lock().role_creates
    }

    /// Number of successful channel creations
    #[must_use]
    pub fn channel_creates(&self) -> usize {
        self.state.lock().channel_creates
    }

    /// Number of delete calls received, failed ones included
    #[must_use]
    pub fn delete_calls(&self) -> usize {
        self.state.lock().delete_calls
    }

    /// Highest number of mutating calls observed in flight at once
    #[must_use]
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn allocate(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn check_workspace(&self, workspace: WorkspaceId) -> Result<(), PlatformError> {
        if workspace == self.workspace {
            Ok(())
        } else {
            Err(PlatformError::NotFound(format!("workspace {workspace}")))
        }
    }

    async fn simulate_call(&self) -> InFlight<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        InFlight(&self.in_flight)
    }
}

/// Decrements the in-flight counter when a simulated call finishes
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl WorkspacePlatform for InMemoryPlatform {
    async fn list_roles(&self, workspace: WorkspaceId) -> Result<Vec<RoleInfo>, PlatformError> {
        self.check_workspace(workspace)?;
        Ok(self.roles())
    }

    async fn create_role(
        &self,
        workspace: WorkspaceId,
        request: CreateRole,
    ) -> Result<RoleInfo, PlatformError> {
        self.check_workspace(workspace)?;
        let _call = self.simulate_call().await;

        let mut state = self.state.lock();
        if let Some(err) = state.create_failures.get(&request.name) {
            return Err(err.clone());
        }
        let role = RoleInfo {
            id: RoleId(self.allocate()),
            name: request.name,
            managed: false,
            everyone: false,
        };
        state.roles.push(role.clone());
        state.role_creates += 1;
        Ok(role)
    }

    async fn delete_role(&self, workspace: WorkspaceId, role: RoleId) -> Result<(), PlatformError> {
        self.check_workspace(workspace)?;
        let _call = self.simulate_call().await;

        let mut state = self.state.lock();
        state.delete_calls += 1;
        let idx = state
            .roles
            .iter()
            .position(|r| r.id == role)
            .ok_or_else(|| PlatformError::NotFound(format!("role {role}")))?;
        if let Some(err) = state.delete_failures.get(&state.roles[idx].name) {
            return Err(err.clone());
        }
        if state.roles[idx].is_protected() {
            return Err(PlatformError::Forbidden(format!("role {role} is protected")));
        }
        state.roles.remove(idx);
        for granted in state.member_roles.values_mut() {
            granted.remove(&role);
        }
        Ok(())
    }

    async fn list_channels(&self, workspace: WorkspaceId) -> Result<Vec<ChannelInfo>, PlatformError> {
        self.check_workspace(workspace)?;
        Ok(self.channels())
    }

    async fn create_channel(
        &self,
        workspace: WorkspaceId,
        request: CreateChannel,
    ) -> Result<ChannelInfo, PlatformError> {
        self.check_workspace(workspace)?;
        let _call = self.simulate_call().await;

        let mut state = self.state.lock();
        if let Some(err) = state.create_failures.get(&request.name) {
            return Err(err.clone());
        }
        if let Some(parent) = request.parent {
            let is_category = state
                .channels
                .iter()
                .any(|c| c.id == parent && c.kind.is_category());
            if !is_category {
                return Err(PlatformError::Rejected(format!(
                    "parent {parent} is not a category"
                )));
            }
        }
        let channel = ChannelInfo {
            id: ChannelId(self.allocate()),
            name: request.name,
            kind: request.kind,
            parent: request.parent,
            overwrites: request.overwrites,
        };
        state.channels.push(channel.clone());
        state.channel_creates += 1;
        Ok(channel)
    }

    async fn delete_channel(
        &self,
        workspace: WorkspaceId,
        channel: ChannelId,
    ) -> Result<(), PlatformError> {
        self.check_workspace(workspace)?;
        let _call = self.simulate_call().await;

        let mut state = self.state.lock();
        state.delete_calls += 1;
        let idx = state
            .channels
            .iter()
            .position(|c| c.id == channel)
            .ok_or_else(|| PlatformError::NotFound(format!("channel {channel}")))?;
        if let Some(err) = state.delete_failures.get(&state.channels[idx].name) {
            return Err(err.clone());
        }
        state.channels.remove(idx);
        // Children of a deleted category survive at the top level.
        for child in state.channels.iter_mut().filter(|c| c.parent == Some(channel)) {
            child.parent = None;
        }
        Ok(())
    }

    async fn send_message(&self, channel: ChannelId, message: Message) -> Result<(), PlatformError> {
        let mut state = self.state.lock();
        if !state.channels.iter().any(|c| c.id == channel) {
            return Err(PlatformError::NotFound(format!("channel {channel}")));
        }
        state.messages.push((channel, message));
        Ok(())
    }

    async fn add_member_role(
        &self,
        workspace: WorkspaceId,
        user: UserId,
        role: RoleId,
    ) -> Result<(), PlatformError> {
        self.check_workspace(workspace)?;
        let mut state = self.state.lock();
        let name = state
            .roles
            .iter()
            .find(|r| r.id == role)
            .map(|r| r.name.clone())
            .ok_or_else(|| PlatformError::NotFound(format!("role {role}")))?;
        if let Some(err) = state.grant_failures.get(&name) {
            return Err(err.clone());
        }
        state.member_roles.entry(user).or_default().insert(role);
        Ok(())
    }
}
