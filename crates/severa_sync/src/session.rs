//! Session lifecycle: sign-in opens a store, sign-out closes it.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::orchestrator::{CycleOutcome, SyncOrchestrator, SyncTrigger};
use severa_model::UserId;
use severa_remote::RemoteStore;
use severa_store::Store;
use std::sync::Arc;

/// One signed-in user's store and sync engine.
pub struct Session<R: RemoteStore> {
    user_id: UserId,
    store: Arc<Store>,
    orchestrator: Arc<SyncOrchestrator<R>>,
}

impl<R: RemoteStore> Session<R> {
    /// Identity of the signed-in user.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// The session's local store handle.
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// The session's sync orchestrator.
    pub fn orchestrator(&self) -> &Arc<SyncOrchestrator<R>> {
        &self.orchestrator
    }
}

/// Owns the current session, if any.
///
/// Signing in while signed in is a user switch: the previous session's
/// store is closed first, so a stale handle held anywhere errors instead
/// of reading another user's data.
#[derive(Default)]
pub struct SessionManager<R: RemoteStore> {
    current: Option<Session<R>>,
}

impl<R: RemoteStore> SessionManager<R> {
    /// Creates a manager with no session.
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Signs a user in: opens their store, wires the orchestrator to the
    /// given authenticated remote, and runs the initial cycle.
    ///
    /// The returned outcome describes that initial cycle; for a session
    /// configured offline it is [`CycleOutcome::Offline`].
    pub fn sign_in(&mut self, config: SyncConfig, remote: R) -> SyncResult<CycleOutcome> {
        self.sign_out();

        let store = Arc::new(Store::open(config.user_id.clone())?);
        let orchestrator = Arc::new(SyncOrchestrator::new(Arc::clone(&store), remote));
        orchestrator.set_online(config.assume_online);

        tracing::info!(user = %config.user_id, online = config.assume_online, "session established");
        let outcome = orchestrator.sync(SyncTrigger::SessionEstablished);

        self.current = Some(Session {
            user_id: config.user_id,
            store,
            orchestrator,
        });
        Ok(outcome)
    }

    /// Signs the current user out, closing their store.
    pub fn sign_out(&mut self) {
        if let Some(session) = self.current.take() {
            tracing::info!(user = %session.user_id, "session ended");
            session.store.close();
        }
    }

    /// The current session, if signed in.
    pub fn session(&self) -> Option<&Session<R>> {
        self.current.as_ref()
    }

    /// The current session, or [`SyncError::NoSession`].
    pub fn require_session(&self) -> SyncResult<&Session<R>> {
        self.current.as_ref().ok_or(SyncError::NoSession)
    }
}
