//! End-to-end cycles against the in-memory backend.

use severa_model::{
    now_millis, MemberStatus, MembershipRow, MembershipWithPantry, NewMembershipRow, NewPantryRow,
    NewProductRow, NewPurchaseRow, Pantry, PantryItem, PantryItemRow, PantryItemUpsert, PantryKind,
    Product, Purchase, RemoteId, UserId,
};
use severa_remote::{MockBackend, MockRemote, RemoteError, RemoteResult, RemoteStore};
use severa_store::Store;
use severa_sync::{
    CycleOutcome, SessionManager, SyncConfig, SyncError, SyncEvent, SyncOrchestrator, SyncStatus,
    SyncTrigger,
};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use uuid::Uuid;

fn new_user(backend: &MockBackend, tag: &str) -> String {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let user_id = Uuid::new_v4().to_string();
    backend.register_user(user_id.clone(), format!("{tag}@example.com"));
    user_id
}

fn orchestrator(backend: &MockBackend, user_id: &str) -> Arc<SyncOrchestrator<MockRemote>> {
    let store = Arc::new(Store::open(user_id).unwrap());
    Arc::new(SyncOrchestrator::new(store, backend.connect(user_id)))
}

fn completed(outcome: CycleOutcome) -> severa_sync::SyncReport {
    match outcome {
        CycleOutcome::Completed(report) => report,
        other => panic!("expected completed cycle, got {other:?}"),
    }
}

#[test]
fn offline_work_lands_remotely_after_reconnect() {
    let backend = MockBackend::new();
    let owner = new_user(&backend, "owner");
    let sync = orchestrator(&backend, &owner);
    let store = sync.store();

    sync.set_online(false);
    let pantry_id = store
        .add_pantry(Pantry::new("Cocina", PantryKind::Shared, owner.clone()))
        .unwrap();
    store
        .add_pantry_item(PantryItem::new(pantry_id, "Arroz", 2.0))
        .unwrap();
    store
        .add_pantry_item(PantryItem::new(pantry_id, "Frijoles", 1.0))
        .unwrap();

    assert_eq!(
        sync.sync(SyncTrigger::ResyncRequested),
        CycleOutcome::Offline
    );
    assert_eq!(backend.pantry_count(), 0);

    sync.set_online(true);
    let report = completed(sync.sync(SyncTrigger::ConnectivityRestored));
    assert_eq!(report.push.pantries, 1);
    assert_eq!(report.push.items, 2);

    // Remote side: pantry, owner membership, both items.
    let remote_pantry = store.pantry(pantry_id).unwrap().unwrap().remote_id.unwrap();
    assert_eq!(backend.pantry_count(), 1);
    assert_eq!(
        backend.member_status(remote_pantry, &owner),
        Some(MemberStatus::Accepted)
    );
    assert_eq!(backend.item_count(remote_pantry), 2);

    // Local side: everything clean, and the pull adopted the remote item
    // keys onto the rows that were just pushed.
    assert!(store.unsynced_pantries().unwrap().is_empty());
    assert!(store.unsynced_pantry_items().unwrap().is_empty());
    let items = store.items_for_pantry(pantry_id).unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| i.remote_id.is_some()));
}

#[test]
fn repeated_cycles_do_not_duplicate_rows() {
    let backend = MockBackend::new();
    let owner = new_user(&backend, "owner");
    let sync = orchestrator(&backend, &owner);
    let store = sync.store();

    let pantry_id = store
        .add_pantry(Pantry::new("Cocina", PantryKind::Personal, owner.clone()))
        .unwrap();
    store
        .add_pantry_item(PantryItem::new(pantry_id, "Arroz", 2.0))
        .unwrap();

    completed(sync.sync(SyncTrigger::ResyncRequested));
    let remote_pantry = store.pantry(pantry_id).unwrap().unwrap().remote_id.unwrap();

    for _ in 0..3 {
        let report = completed(sync.sync(SyncTrigger::ResyncRequested));
        assert_eq!(report.push.total(), 0);
    }
    assert_eq!(backend.pantry_count(), 1);
    assert_eq!(backend.item_count(remote_pantry), 1);
    assert_eq!(store.pantries().unwrap().len(), 1);
    assert_eq!(store.items_for_pantry(pantry_id).unwrap().len(), 1);
}

#[test]
fn purchase_pushes_once_with_all_products() {
    let backend = MockBackend::new();
    let owner = new_user(&backend, "owner");
    let sync = orchestrator(&backend, &owner);

    sync.store()
        .add_purchase_with_products(
            Purchase::new(125.50, chrono::Utc::now()),
            vec![
                Product::new(0, "Leche", 25.0, 2.0),
                Product::new(0, "Pan", 37.75, 2.0),
            ],
        )
        .unwrap();

    let report = completed(sync.sync(SyncTrigger::ResyncRequested));
    assert_eq!(report.push.purchases, 1);
    assert_eq!(backend.purchase_count(&owner), 1);

    completed(sync.sync(SyncTrigger::ResyncRequested));
    assert_eq!(backend.purchase_count(&owner), 1);
    assert!(sync.store().unsynced_purchases().unwrap().is_empty());
}

#[test]
fn failed_push_keeps_partial_progress_and_retries_cleanly() {
    let backend = MockBackend::new();
    let owner = new_user(&backend, "owner");
    let sync = orchestrator(&backend, &owner);
    let store = sync.store();

    let pantry_id = store
        .add_pantry(Pantry::new("Cocina", PantryKind::Personal, owner.clone()))
        .unwrap();
    completed(sync.sync(SyncTrigger::ResyncRequested));
    let remote_pantry = store.pantry(pantry_id).unwrap().unwrap().remote_id.unwrap();

    let first = store
        .add_pantry_item(PantryItem::new(pantry_id, "Arroz", 2.0))
        .unwrap();
    let second = store
        .add_pantry_item(PantryItem::new(pantry_id, "Frijoles", 1.0))
        .unwrap();

    // First item upsert succeeds, second fails mid-push.
    backend.fail_after(1, 1);
    let outcome = sync.sync(SyncTrigger::ResyncRequested);
    assert!(matches!(
        outcome,
        CycleOutcome::Failed {
            retryable: true,
            ..
        }
    ));

    // The row that made it over stays marked; the other stays dirty.
    assert!(store.pantry_items().unwrap().iter().any(|i| i.id == first && i.synced));
    assert!(store.pantry_items().unwrap().iter().any(|i| i.id == second && !i.synced));
    assert_eq!(backend.item_count(remote_pantry), 1);

    // The retry resumes from where the failure stopped.
    let report = completed(sync.sync(SyncTrigger::ResyncRequested));
    assert_eq!(report.push.items, 1);
    assert_eq!(backend.item_count(remote_pantry), 2);
    assert_eq!(store.items_for_pantry(pantry_id).unwrap().len(), 2);
}

#[test]
fn membership_failure_does_not_duplicate_the_pantry_on_retry() {
    let backend = MockBackend::new();
    let owner = new_user(&backend, "owner");
    let sync = orchestrator(&backend, &owner);
    let store = sync.store();

    let pantry_id = store
        .add_pantry(Pantry::new("Cocina", PantryKind::Shared, owner.clone()))
        .unwrap();

    // Pantry insert succeeds, the owner membership insert fails. The
    // remote key must already be written back by then, or the retry would
    // re-insert the pantry.
    backend.fail_after(1, 1);
    let outcome = sync.sync(SyncTrigger::ResyncRequested);
    assert!(matches!(outcome, CycleOutcome::Failed { .. }));

    let pantry = store.pantry(pantry_id).unwrap().unwrap();
    assert!(pantry.synced);
    assert!(pantry.remote_id.is_some());
    assert_eq!(backend.pantry_count(), 1);

    sync.sync(SyncTrigger::ResyncRequested);
    assert_eq!(backend.pantry_count(), 1);
}

#[test]
fn failed_pull_leaves_local_tables_untouched() {
    let backend = MockBackend::new();
    let owner = new_user(&backend, "owner");

    // Seed the remote from a first device.
    let device_a = orchestrator(&backend, &owner);
    let pantry_id = device_a
        .store()
        .add_pantry(Pantry::new("Cocina", PantryKind::Shared, owner.clone()))
        .unwrap();
    device_a
        .store()
        .add_pantry_item(PantryItem::new(pantry_id, "Arroz", 2.0))
        .unwrap();
    completed(device_a.sync(SyncTrigger::ResyncRequested));

    // Fresh device: nothing to push, so the pull's third fetch (items)
    // hits the injected fault.
    let device_b = orchestrator(&backend, &owner);
    backend.fail_after(2, 1);
    let outcome = device_b.sync(SyncTrigger::SessionEstablished);
    assert!(matches!(outcome, CycleOutcome::Failed { .. }));

    assert!(device_b.store().pantries().unwrap().is_empty());
    assert!(device_b.store().members().unwrap().is_empty());
    assert!(device_b.store().invitations().unwrap().is_empty());

    // Once the fault clears, the same cycle lands everything.
    let report = completed(device_b.sync(SyncTrigger::ResyncRequested));
    assert_eq!(report.pull.pantries, 1);
    assert_eq!(report.pull.items, 1);
    assert_eq!(device_b.store().pantries().unwrap().len(), 1);
}

#[test]
fn pull_still_runs_when_push_fails() {
    let backend = MockBackend::new();
    let owner = new_user(&backend, "owner");

    // Device A seeds the remote with a shared pantry.
    let device_a = orchestrator(&backend, &owner);
    device_a
        .store()
        .add_pantry(Pantry::new("Cocina", PantryKind::Shared, owner.clone()))
        .unwrap();
    completed(device_a.sync(SyncTrigger::ResyncRequested));

    // Device B has a dirty pantry whose insert fails; the cycle should
    // still bring down device A's pantry.
    let device_b = orchestrator(&backend, &owner);
    let dirty = device_b
        .store()
        .add_pantry(Pantry::new("Garaje", PantryKind::Personal, owner.clone()))
        .unwrap();
    backend.fail_next(1);
    let outcome = device_b.sync(SyncTrigger::SessionEstablished);
    assert!(matches!(outcome, CycleOutcome::Failed { .. }));

    let pantries = device_b.store().pantries().unwrap();
    assert_eq!(pantries.len(), 2);
    assert!(pantries.iter().any(|p| p.name == "Cocina" && p.synced));
    assert!(!device_b.store().pantry(dirty).unwrap().unwrap().synced);
    assert_eq!(backend.pantry_count(), 1);
}

#[test]
fn two_devices_converge_on_the_last_write() {
    let backend = MockBackend::new();
    let owner = new_user(&backend, "owner");

    let device_a = orchestrator(&backend, &owner);
    let a_pantry = device_a
        .store()
        .add_pantry(Pantry::new("Cocina", PantryKind::Shared, owner.clone()))
        .unwrap();
    device_a
        .store()
        .add_pantry_item(PantryItem::new(a_pantry, "Arroz", 2.0))
        .unwrap();
    completed(device_a.sync(SyncTrigger::ResyncRequested));

    let device_b = orchestrator(&backend, &owner);
    completed(device_b.sync(SyncTrigger::SessionEstablished));
    let b_pantry = device_b.store().pantries().unwrap()[0].id;

    // Edit on device B: mark dirty, bump the clock, push.
    let mut item = device_b.store().items_for_pantry(b_pantry).unwrap().remove(0);
    item.quantity = 7.0;
    item.synced = false;
    item.last_modified = now_millis();
    device_b.store().update_pantry_item(item).unwrap();
    completed(device_b.sync(SyncTrigger::ResyncRequested));

    // Device A pulls the winning write.
    completed(device_a.sync(SyncTrigger::ResyncRequested));

    let remote_pantry = device_a.store().pantries().unwrap()[0].remote_id.unwrap();
    assert_eq!(backend.item(remote_pantry, "Arroz").unwrap().quantity, 7.0);
    assert_eq!(
        device_a.store().items_for_pantry(a_pantry).unwrap()[0].quantity,
        7.0
    );
    assert_eq!(
        device_b.store().items_for_pantry(b_pantry).unwrap()[0].quantity,
        7.0
    );
}

#[test]
fn dirty_local_edit_survives_a_pull() {
    let backend = MockBackend::new();
    let owner = new_user(&backend, "owner");
    let sync = orchestrator(&backend, &owner);
    let store = sync.store();

    let pantry_id = store
        .add_pantry(Pantry::new("Cocina", PantryKind::Personal, owner.clone()))
        .unwrap();
    store
        .add_pantry_item(PantryItem::new(pantry_id, "Arroz", 2.0))
        .unwrap();
    completed(sync.sync(SyncTrigger::ResyncRequested));

    // Go offline and edit; the push phase is gated off, so only the next
    // online cycle may touch the row.
    let mut item = store.items_for_pantry(pantry_id).unwrap().remove(0);
    item.quantity = 9.0;
    item.synced = false;
    item.last_modified = now_millis();
    store.update_pantry_item(item).unwrap();

    // A concurrent pull (simulated by running the cycle) pushes the dirty
    // row first, so the local edit is what both sides converge on.
    completed(sync.sync(SyncTrigger::ResyncRequested));
    let remote_pantry = store.pantry(pantry_id).unwrap().unwrap().remote_id.unwrap();
    assert_eq!(backend.item(remote_pantry, "Arroz").unwrap().quantity, 9.0);
    assert_eq!(store.items_for_pantry(pantry_id).unwrap()[0].quantity, 9.0);
}

#[test]
fn invitation_round_trip_shares_the_pantry() {
    let backend = MockBackend::new();
    let owner = new_user(&backend, "owner");
    let friend = new_user(&backend, "friend");

    let owner_sync = orchestrator(&backend, &owner);
    let pantry_id = owner_sync
        .store()
        .add_pantry(Pantry::new("Cocina", PantryKind::Shared, owner.clone()))
        .unwrap();
    owner_sync
        .store()
        .add_pantry_item(PantryItem::new(pantry_id, "Arroz", 2.0))
        .unwrap();
    completed(owner_sync.sync(SyncTrigger::ResyncRequested));
    let remote_pantry = owner_sync
        .store()
        .pantry(pantry_id)
        .unwrap()
        .unwrap()
        .remote_id
        .unwrap();

    let message = owner_sync
        .invite_member(remote_pantry, "friend@example.com")
        .unwrap();
    assert_eq!(message, "¡Invitación enviada con éxito!");

    // The invitee sees the invitation, not the pantry.
    let friend_sync = orchestrator(&backend, &friend);
    completed(friend_sync.sync(SyncTrigger::SessionEstablished));
    let invitations = friend_sync.store().invitations().unwrap();
    assert_eq!(invitations.len(), 1);
    assert_eq!(invitations[0].pantry_name, "Cocina");
    assert!(friend_sync.store().pantries().unwrap().is_empty());

    // Accepting pulls the pantry, its items, and the full roster.
    let outcome = friend_sync.accept_invitation(invitations[0].id).unwrap();
    completed(outcome);
    assert!(friend_sync.store().invitations().unwrap().is_empty());
    let pantries = friend_sync.store().pantries().unwrap();
    assert_eq!(pantries.len(), 1);
    assert_eq!(pantries[0].name, "Cocina");
    assert_eq!(
        friend_sync.store().items_for_pantry(pantries[0].id).unwrap().len(),
        1
    );
    assert_eq!(
        backend.member_status(remote_pantry, &friend),
        Some(MemberStatus::Accepted)
    );

    // The owner's next cycle sees the new roster.
    completed(owner_sync.sync(SyncTrigger::ResyncRequested));
    let roster = owner_sync.store().members().unwrap();
    assert_eq!(roster.len(), 2);
    assert!(roster
        .iter()
        .any(|m| m.user_id == friend && m.email.as_deref() == Some("friend@example.com")));
}

#[test]
fn declined_invitation_disappears_on_both_sides() {
    let backend = MockBackend::new();
    let owner = new_user(&backend, "owner");
    let friend = new_user(&backend, "friend");

    let owner_sync = orchestrator(&backend, &owner);
    let pantry_id = owner_sync
        .store()
        .add_pantry(Pantry::new("Cocina", PantryKind::Shared, owner.clone()))
        .unwrap();
    completed(owner_sync.sync(SyncTrigger::ResyncRequested));
    let remote_pantry = owner_sync
        .store()
        .pantry(pantry_id)
        .unwrap()
        .unwrap()
        .remote_id
        .unwrap();
    owner_sync
        .invite_member(remote_pantry, "friend@example.com")
        .unwrap();

    let friend_sync = orchestrator(&backend, &friend);
    completed(friend_sync.sync(SyncTrigger::SessionEstablished));
    let invitation_id = friend_sync.store().invitations().unwrap()[0].id;

    completed(friend_sync.decline_invitation(invitation_id).unwrap());
    assert!(friend_sync.store().invitations().unwrap().is_empty());
    assert!(friend_sync.store().pantries().unwrap().is_empty());
    assert!(!backend.has_member(remote_pantry, &friend));
}

#[test]
fn invite_and_remove_surface_backend_messages() {
    let backend = MockBackend::new();
    let owner = new_user(&backend, "owner");
    let friend = new_user(&backend, "friend");

    let owner_sync = orchestrator(&backend, &owner);
    let pantry_id = owner_sync
        .store()
        .add_pantry(Pantry::new("Cocina", PantryKind::Shared, owner.clone()))
        .unwrap();
    completed(owner_sync.sync(SyncTrigger::ResyncRequested));
    let remote_pantry = owner_sync
        .store()
        .pantry(pantry_id)
        .unwrap()
        .unwrap()
        .remote_id
        .unwrap();

    let err = owner_sync
        .invite_member(remote_pantry, "nadie@example.com")
        .unwrap_err();
    assert!(matches!(err, SyncError::Remote(RemoteError::UserNotFound)));
    assert_eq!(
        err.to_string(),
        "remote error: Usuario no encontrado."
    );

    owner_sync
        .invite_member(remote_pantry, "friend@example.com")
        .unwrap();
    let err = owner_sync
        .invite_member(remote_pantry, "friend@example.com")
        .unwrap_err();
    assert!(matches!(err, SyncError::Remote(RemoteError::AlreadyMember)));

    let err = owner_sync.remove_member(remote_pantry, &owner).unwrap_err();
    assert!(matches!(
        err,
        SyncError::Remote(RemoteError::CannotRemoveOwner)
    ));

    let message = owner_sync.remove_member(remote_pantry, &friend).unwrap();
    assert_eq!(message, "Miembro eliminado con éxito.");
    assert!(!backend.has_member(remote_pantry, &friend));
}

#[test]
fn status_feed_reports_the_cycle_lifecycle() {
    let backend = MockBackend::new();
    let owner = new_user(&backend, "owner");
    let sync = orchestrator(&backend, &owner);
    let events = sync.subscribe();

    completed(sync.sync(SyncTrigger::ResyncRequested));
    assert_eq!(
        events.try_recv().unwrap(),
        SyncEvent::StatusChanged(SyncStatus::Syncing)
    );
    assert_eq!(
        events.try_recv().unwrap(),
        SyncEvent::StatusChanged(SyncStatus::Idle)
    );
    assert!(matches!(events.try_recv().unwrap(), SyncEvent::Completed(_)));

    backend.fail_next(1);
    sync.sync(SyncTrigger::ResyncRequested);
    assert_eq!(
        events.try_recv().unwrap(),
        SyncEvent::StatusChanged(SyncStatus::Syncing)
    );
    assert_eq!(
        events.try_recv().unwrap(),
        SyncEvent::StatusChanged(SyncStatus::Idle)
    );
    assert!(matches!(events.try_recv().unwrap(), SyncEvent::Failed { .. }));

    let stats = sync.stats();
    assert_eq!(stats.started, 2);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.failed, 1);
    assert!(stats.last_error.is_some());
}

#[test]
fn session_switch_closes_the_previous_store() {
    let backend = MockBackend::new();
    let alice = new_user(&backend, "alice");
    let bruno = new_user(&backend, "bruno");

    let mut sessions = SessionManager::new();
    sessions
        .sign_in(SyncConfig::new(alice.clone()), backend.connect(&alice))
        .unwrap();
    let alice_store = Arc::clone(sessions.require_session().unwrap().store());
    alice_store
        .add_pantry(Pantry::new("Cocina", PantryKind::Personal, alice.clone()))
        .unwrap();

    sessions
        .sign_in(SyncConfig::new(bruno.clone()), backend.connect(&bruno))
        .unwrap();

    // The stale handle errors instead of serving another user's data.
    assert!(!alice_store.is_open());
    assert!(alice_store.pantries().is_err());

    let session = sessions.require_session().unwrap();
    assert_eq!(session.user_id(), &bruno);
    assert!(session.store().pantries().unwrap().is_empty());

    sessions.sign_out();
    assert!(matches!(
        sessions.require_session(),
        Err(SyncError::NoSession)
    ));
}

#[test]
fn offline_sign_in_runs_no_cycle() {
    let backend = MockBackend::new();
    let owner = new_user(&backend, "owner");

    let mut sessions = SessionManager::new();
    let outcome = sessions
        .sign_in(
            SyncConfig::new(owner.clone()).offline(),
            backend.connect(&owner),
        )
        .unwrap();
    assert_eq!(outcome, CycleOutcome::Offline);

    let engine = Arc::clone(sessions.require_session().unwrap().orchestrator());
    engine.set_online(true);
    completed(engine.sync(SyncTrigger::ConnectivityRestored));
}

/// Delegating remote that parks inside the first fetch until released, so
/// a second sync request can race the one in flight.
struct GatedRemote {
    inner: MockRemote,
    entered: Sender<()>,
    release: std::sync::Mutex<Receiver<()>>,
}

impl RemoteStore for GatedRemote {
    fn insert_pantry(&self, pantry: &NewPantryRow) -> RemoteResult<RemoteId> {
        self.inner.insert_pantry(pantry)
    }
    fn insert_membership(&self, membership: &NewMembershipRow) -> RemoteResult<()> {
        self.inner.insert_membership(membership)
    }
    fn upsert_pantry_item(&self, item: &PantryItemUpsert) -> RemoteResult<()> {
        self.inner.upsert_pantry_item(item)
    }
    fn insert_purchase(
        &self,
        purchase: &NewPurchaseRow,
        products: &[NewProductRow],
    ) -> RemoteResult<RemoteId> {
        self.inner.insert_purchase(purchase, products)
    }
    fn fetch_memberships(&self) -> RemoteResult<Vec<MembershipWithPantry>> {
        let _ = self.entered.send(());
        let _ = self.release.lock().unwrap().recv();
        self.inner.fetch_memberships()
    }
    fn fetch_pantry_members(&self, pantry_id: RemoteId) -> RemoteResult<Vec<MembershipRow>> {
        self.inner.fetch_pantry_members(pantry_id)
    }
    fn fetch_pantry_items(&self, pantry_id: RemoteId) -> RemoteResult<Vec<PantryItemRow>> {
        self.inner.fetch_pantry_items(pantry_id)
    }
    fn accept_invitation(&self, membership_id: RemoteId) -> RemoteResult<()> {
        self.inner.accept_invitation(membership_id)
    }
    fn decline_invitation(&self, membership_id: RemoteId) -> RemoteResult<()> {
        self.inner.decline_invitation(membership_id)
    }
    fn invite_member(&self, pantry_id: RemoteId, invitee_email: &str) -> RemoteResult<String> {
        self.inner.invite_member(pantry_id, invitee_email)
    }
    fn remove_member(&self, pantry_id: RemoteId, user_id: &UserId) -> RemoteResult<String> {
        self.inner.remove_member(pantry_id, user_id)
    }
}

#[test]
fn concurrent_sync_requests_are_single_flight() {
    let backend = MockBackend::new();
    let owner = new_user(&backend, "owner");

    let (entered_tx, entered_rx) = channel();
    let (release_tx, release_rx) = channel();
    let remote = GatedRemote {
        inner: backend.connect(&owner),
        entered: entered_tx,
        release: std::sync::Mutex::new(release_rx),
    };

    let store = Arc::new(Store::open(&*owner).unwrap());
    let sync = Arc::new(SyncOrchestrator::new(store, remote));

    let background = {
        let sync = Arc::clone(&sync);
        std::thread::spawn(move || sync.sync(SyncTrigger::ResyncRequested))
    };

    // Wait until the background cycle is parked mid-pull, then race it.
    entered_rx.recv().unwrap();
    assert_eq!(
        sync.sync(SyncTrigger::ResyncRequested),
        CycleOutcome::AlreadySyncing
    );

    release_tx.send(()).unwrap();
    let outcome = background.join().unwrap();
    assert!(matches!(outcome, CycleOutcome::Completed(_)));
    assert_eq!(sync.stats().skipped, 1);
}
