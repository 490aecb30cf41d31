//! Per-workspace mutual exclusion
//!
//! Provisioning runs and teardown executions mutate the same resources and
//! read listings they treat as authoritative, so two of them must never
//! interleave on one workspace.

use crate::types::WorkspaceId;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = DashMap<WorkspaceId, Arc<Mutex<()>>>;

/// Registry of one async lock per workspace
///
/// An entry lives only while someone holds or waits for its lock, so the
/// map never outgrows the set of workspaces with work in flight.
#[derive(Debug, Default, Clone)]
pub struct WorkspaceLocks {
    locks: Arc<LockMap>,
}

impl WorkspaceLocks {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `workspace`
    pub async fn acquire(&self, workspace: WorkspaceId) -> WorkspaceGuard {
        let lock = self.lock_for(workspace);
        let guard = match Arc::clone(&lock).try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::debug!(%workspace, "waiting for workspace lock");
                lock.lock_owned().await
            }
        };
        self.wrap(workspace, guard)
    }

    /// Exclusive access if nobody holds it right now
    #[must_use]
    pub fn try_acquire(&self, workspace: WorkspaceId) -> Option<WorkspaceGuard> {
        let lock = self.lock_for(workspace);
        let result = lock.try_lock_owned();
        match result {
            Ok(guard) => Some(self.wrap(workspace, guard)),
            Err(_) => {
                evict_idle(&self.locks, workspace);
                None
            }
        }
    }

    /// Number of workspaces with a held or awaited lock
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Check if no workspace is locked
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    fn lock_for(&self, workspace: WorkspaceId) -> Arc<Mutex<()>> {
        self.locks
            .entry(workspace)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn wrap(&self, workspace: WorkspaceId, guard: OwnedMutexGuard<()>) -> WorkspaceGuard {
        WorkspaceGuard {
            guard: Some(guard),
            workspace,
            locks: Arc::clone(&self.locks),
        }
    }
}

/// Exclusive access to one workspace; released on drop
#[derive(Debug)]
pub struct WorkspaceGuard {
    guard: Option<OwnedMutexGuard<()>>,
    workspace: WorkspaceId,
    locks: Arc<LockMap>,
}

impl WorkspaceGuard {
    /// Locked workspace
    #[inline]
    #[must_use]
    pub fn workspace(&self) -> WorkspaceId {
        self.workspace
    }
}

impl Drop for WorkspaceGuard {
    fn drop(&mut self) {
        // Release first so the map holds the last reference when idle.
        drop(self.guard.take());
        evict_idle(&self.locks, self.workspace);
    }
}

/// Drop the entry if nobody else holds a handle to the lock
///
/// Runs under the shard lock, so it cannot race with `lock_for`.
fn evict_idle(locks: &LockMap, workspace: WorkspaceId) {
    locks.remove_if(&workspace, |_, lock| Arc::strong_count(lock) == 1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_workspace_is_exclusive() {
        let locks = WorkspaceLocks::new();
        let guard = locks.acquire(WorkspaceId(1)).await;

        assert!(locks.try_acquire(WorkspaceId(1)).is_none());
        drop(guard);
        assert!(locks.try_acquire(WorkspaceId(1)).is_some());
    }

    #[tokio::test]
    async fn different_workspaces_are_independent() {
        let locks = WorkspaceLocks::new();
        let _a = locks.acquire(WorkspaceId(1)).await;
        let b = locks.try_acquire(WorkspaceId(2));

        assert!(b.is_some());
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn idle_entries_are_evicted() {
        let locks = WorkspaceLocks::new();
        let guard = locks.acquire(WorkspaceId(1)).await;
        assert_eq!(guard.workspace(), WorkspaceId(1));
        assert_eq!(locks.len(), 1);

        assert!(locks.try_acquire(WorkspaceId(1)).is_none());
        assert_eq!(locks.len(), 1);

        drop(guard);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn entry_survives_while_a_waiter_is_queued() {
        let locks = WorkspaceLocks::new();
        let guard = locks.acquire(WorkspaceId(3)).await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(WorkspaceId(3)).await;
            })
        };
        tokio::task::yield_now().await;

        drop(guard);
        assert_eq!(locks.len(), 1);

        waiter.await.unwrap();
        assert!(locks.is_empty());
    }
}
