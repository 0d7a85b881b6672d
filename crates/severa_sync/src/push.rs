//! Push phase: publish dirty local rows to the remote.
//!
//! Tables push in fixed dependency order (pantries, then items, then
//! purchases) so a child row never reaches the remote before the parent
//! it references. The phase fails fast: an error aborts the cycle, and
//! rows already published stay marked synced so the retry resumes where
//! this one stopped instead of re-sending.

use crate::error::SyncResult;
use severa_model::{
    item_to_remote, pantry_to_remote, product_to_remote, purchase_to_remote, MemberStatus,
    NewMembershipRow, NewProductRow,
};
use severa_remote::RemoteStore;
use severa_store::Store;

/// What one push phase published.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushSummary {
    /// Pantries inserted remotely.
    pub pantries: usize,
    /// Items upserted remotely.
    pub items: usize,
    /// Items skipped because their pantry has no remote key yet.
    pub items_skipped: usize,
    /// Purchases inserted remotely.
    pub purchases: usize,
}

impl PushSummary {
    /// Total rows published.
    pub fn total(&self) -> usize {
        self.pantries + self.items + self.purchases
    }
}

/// Runs the push phase against one store/remote pair.
pub struct PushEngine<'a, R: RemoteStore> {
    store: &'a Store,
    remote: &'a R,
}

impl<'a, R: RemoteStore> PushEngine<'a, R> {
    /// Creates a push engine over the given store and remote.
    pub fn new(store: &'a Store, remote: &'a R) -> Self {
        Self { store, remote }
    }

    /// Publishes every dirty row, in dependency order.
    pub fn run(&self) -> SyncResult<PushSummary> {
        let mut summary = PushSummary::default();
        self.push_pantries(&mut summary)?;
        self.push_items(&mut summary)?;
        self.push_purchases(&mut summary)?;
        tracing::debug!(
            pantries = summary.pantries,
            items = summary.items,
            skipped = summary.items_skipped,
            purchases = summary.purchases,
            "push phase complete"
        );
        Ok(summary)
    }

    /// Inserts each unsynced pantry remotely, records the assigned remote
    /// key, then inserts the owner's accepted membership row.
    ///
    /// The write-back happens before the membership insert: once the
    /// pantry row exists remotely the local row must stop being dirty, or
    /// a failure on the membership call would re-insert the pantry on the
    /// next cycle.
    fn push_pantries(&self, summary: &mut PushSummary) -> SyncResult<()> {
        for pantry in self.store.unsynced_pantries()? {
            let remote_id = self.remote.insert_pantry(&pantry_to_remote(&pantry))?;
            self.store.set_pantry_remote(pantry.id, remote_id)?;
            self.remote.insert_membership(&NewMembershipRow {
                pantry_id: remote_id,
                user_id: pantry.owner_id.clone(),
                status: MemberStatus::Accepted,
            })?;
            summary.pantries += 1;
        }
        Ok(())
    }

    /// Upserts each unsynced item under its pantry's remote key.
    ///
    /// An item whose pantry has no remote key yet is skipped, not failed:
    /// it stays dirty and goes out on a later cycle once the pantry lands.
    fn push_items(&self, summary: &mut PushSummary) -> SyncResult<()> {
        for item in self.store.unsynced_pantry_items()? {
            let parent = self.store.pantry(item.pantry_id)?;
            let Some(pantry_remote_id) = parent.and_then(|p| p.remote_id) else {
                tracing::warn!(
                    item = %item.name,
                    pantry = item.pantry_id,
                    "skipping item push: pantry not yet on the remote"
                );
                summary.items_skipped += 1;
                continue;
            };
            self.remote
                .upsert_pantry_item(&item_to_remote(&item, pantry_remote_id)?)?;
            self.store.mark_item_synced(item.id)?;
            summary.items += 1;
        }
        Ok(())
    }

    /// Inserts each unsynced purchase with its line items in one
    /// transactional remote call.
    fn push_purchases(&self, summary: &mut PushSummary) -> SyncResult<()> {
        let user_id = self.store.user_id().clone();
        for purchase in self.store.unsynced_purchases()? {
            let products: Vec<NewProductRow> = self
                .store
                .products_for_purchase(purchase.id)?
                .iter()
                .map(product_to_remote)
                .collect();
            self.remote
                .insert_purchase(&purchase_to_remote(&purchase, &user_id)?, &products)?;
            self.store.mark_purchase_synced(purchase.id)?;
            summary.purchases += 1;
        }
        Ok(())
    }
}
