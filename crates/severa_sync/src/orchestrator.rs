//! Cycle orchestration: gating, single-flight, and status signaling.

use crate::error::{SyncError, SyncResult};
use crate::events::{StatusFeed, SyncEvent};
use crate::pull::{PullEngine, PullSummary};
use crate::push::{PushEngine, PushSummary};
use parking_lot::Mutex;
use severa_model::RemoteId;
use severa_remote::RemoteStore;
use severa_store::{Store, StoreError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

/// Whether the engine is currently running a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// No cycle in progress.
    Idle,
    /// A cycle is in progress.
    Syncing,
}

/// Why a cycle was requested. Logged, not branched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    /// A user just signed in.
    SessionEstablished,
    /// Connectivity came back after being offline.
    ConnectivityRestored,
    /// The application asked for a fresh cycle.
    ResyncRequested,
}

impl SyncTrigger {
    fn as_str(&self) -> &'static str {
        match self {
            SyncTrigger::SessionEstablished => "session_established",
            SyncTrigger::ConnectivityRestored => "connectivity_restored",
            SyncTrigger::ResyncRequested => "resync_requested",
        }
    }
}

/// Both phases of one completed cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// What the push phase published.
    pub push: PushSummary,
    /// What the pull phase applied.
    pub pull: PullSummary,
}

/// How a requested cycle ended.
///
/// Cycles never return errors to the caller; failure is an outcome, fully
/// described here and on the status feed.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Both phases ran to completion.
    Completed(SyncReport),
    /// The engine is offline; nothing ran.
    Offline,
    /// Another cycle holds the engine; nothing ran.
    AlreadySyncing,
    /// The cycle aborted partway. Local state is consistent but stale.
    Failed {
        /// Human-readable failure description.
        message: String,
        /// Whether a retry could succeed.
        retryable: bool,
    },
}

/// Running totals across the orchestrator's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Cycles that acquired the engine and ran.
    pub started: u64,
    /// Cycles that completed both phases.
    pub completed: u64,
    /// Cycles that aborted with an error.
    pub failed: u64,
    /// Requests dropped because the engine was offline or busy.
    pub skipped: u64,
    /// Rows published across all push phases.
    pub rows_pushed: u64,
    /// Rows applied across all pull phases.
    pub rows_pulled: u64,
    /// Message of the most recent failure; cleared by the next completed
    /// cycle.
    pub last_error: Option<String>,
}

/// Drives push/pull cycles for one signed-in user.
///
/// At most one cycle runs at a time; a request that arrives while a cycle
/// is in flight is dropped, not queued; the running cycle will publish
/// whatever the request would have. Offline, every request is dropped
/// until connectivity is restored.
pub struct SyncOrchestrator<R: RemoteStore> {
    store: Arc<Store>,
    remote: R,
    online: AtomicBool,
    cycle: Mutex<()>,
    feed: StatusFeed,
    stats: Mutex<SyncStats>,
}

impl<R: RemoteStore> SyncOrchestrator<R> {
    /// Creates an orchestrator over the given store and remote, online.
    pub fn new(store: Arc<Store>, remote: R) -> Self {
        Self {
            store,
            remote,
            online: AtomicBool::new(true),
            cycle: Mutex::new(()),
            feed: StatusFeed::new(),
            stats: Mutex::new(SyncStats::default()),
        }
    }

    /// The store this orchestrator syncs.
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Flips the connectivity flag. Going online does not start a cycle;
    /// call [`SyncOrchestrator::sync`] with
    /// [`SyncTrigger::ConnectivityRestored`] when it should.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
        tracing::debug!(online, "connectivity changed");
    }

    /// Returns the current connectivity flag.
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Registers a status subscriber.
    pub fn subscribe(&self) -> Receiver<SyncEvent> {
        self.feed.subscribe()
    }

    /// Returns a snapshot of the lifetime counters.
    pub fn stats(&self) -> SyncStats {
        self.stats.lock().clone()
    }

    /// Runs one push/pull cycle, if the engine is online and idle.
    pub fn sync(&self, trigger: SyncTrigger) -> CycleOutcome {
        if !self.is_online() {
            tracing::debug!(trigger = trigger.as_str(), "sync skipped: offline");
            self.stats.lock().skipped += 1;
            return CycleOutcome::Offline;
        }
        let Some(_guard) = self.cycle.try_lock() else {
            tracing::debug!(trigger = trigger.as_str(), "sync skipped: cycle in flight");
            self.stats.lock().skipped += 1;
            return CycleOutcome::AlreadySyncing;
        };

        tracing::info!(trigger = trigger.as_str(), user = %self.store.user_id(), "sync cycle starting");
        self.stats.lock().started += 1;
        self.feed.emit(SyncEvent::StatusChanged(SyncStatus::Syncing));

        let result = self.run_cycle();
        self.feed.emit(SyncEvent::StatusChanged(SyncStatus::Idle));

        match result {
            Ok(report) => {
                let mut stats = self.stats.lock();
                stats.completed += 1;
                stats.rows_pushed += report.push.total() as u64;
                stats.rows_pulled += report.pull.total() as u64;
                stats.last_error = None;
                drop(stats);
                tracing::info!(
                    pushed = report.push.total(),
                    pulled = report.pull.total(),
                    "sync cycle complete"
                );
                self.feed.emit(SyncEvent::Completed(report));
                CycleOutcome::Completed(report)
            }
            Err(error) => {
                let message = error.to_string();
                let mut stats = self.stats.lock();
                stats.failed += 1;
                stats.last_error = Some(message.clone());
                drop(stats);
                tracing::error!(error = %message, "sync cycle failed");
                self.feed.emit(SyncEvent::Failed {
                    message: message.clone(),
                });
                CycleOutcome::Failed {
                    message,
                    retryable: error.is_retryable(),
                }
            }
        }
    }

    /// Push, then pull. The pull runs even when the push failed: the
    /// remote truth is still worth having, and the dirty rows the push
    /// left behind are never overwritten by it.
    fn run_cycle(&self) -> SyncResult<SyncReport> {
        let push_result = PushEngine::new(&self.store, &self.remote).run();
        let pull_result = PullEngine::new(&self.store, &self.remote).run();
        match (push_result, pull_result) {
            (Ok(push), Ok(pull)) => Ok(SyncReport { push, pull }),
            (Err(push_error), Ok(pull)) => {
                self.stats.lock().rows_pulled += pull.total() as u64;
                Err(push_error)
            }
            (Err(push_error), Err(pull_error)) => {
                tracing::debug!(error = %pull_error, "pull failed after push failure");
                Err(push_error)
            }
            (Ok(_), Err(pull_error)) => Err(pull_error),
        }
    }

    // --- membership actions ---
    //
    // These talk to the remote immediately (they are online-only user
    // actions, not background sync) and finish with a resync so the local
    // view reflects the change.

    /// Accepts a pending invitation and resyncs.
    pub fn accept_invitation(&self, invitation_id: RemoteId) -> SyncResult<CycleOutcome> {
        self.remote.accept_invitation(invitation_id)?;
        self.drop_local_invitation(invitation_id)?;
        Ok(self.sync(SyncTrigger::ResyncRequested))
    }

    /// Declines a pending invitation and resyncs.
    pub fn decline_invitation(&self, invitation_id: RemoteId) -> SyncResult<CycleOutcome> {
        self.remote.decline_invitation(invitation_id)?;
        self.drop_local_invitation(invitation_id)?;
        Ok(self.sync(SyncTrigger::ResyncRequested))
    }

    /// Invites a user by email to a shared pantry. Returns the backend's
    /// user-facing message.
    pub fn invite_member(&self, pantry_id: RemoteId, invitee_email: &str) -> SyncResult<String> {
        let message = self.remote.invite_member(pantry_id, invitee_email)?;
        Ok(message)
    }

    /// Removes a member from a pantry and resyncs. Returns the backend's
    /// user-facing message.
    pub fn remove_member(
        &self,
        pantry_id: RemoteId,
        member_user_id: &str,
    ) -> SyncResult<String> {
        let message = self.remote.remove_member(pantry_id, &member_user_id.to_string())?;
        self.sync(SyncTrigger::ResyncRequested);
        Ok(message)
    }

    /// Removes the answered invitation from the local view. Absent is
    /// fine; it may already have been answered from another device.
    fn drop_local_invitation(&self, invitation_id: RemoteId) -> SyncResult<()> {
        match self.store.delete_invitation(invitation_id) {
            Ok(()) | Err(StoreError::NotFound { .. }) => Ok(()),
            Err(e) => Err(SyncError::Store(e)),
        }
    }
}
