//! Transactional write surface.

use crate::error::{StoreError, StoreResult};
use crate::store::{next_key, Tables};
use severa_model::{
    LocalId, Pantry, PantryInvitation, PantryItem, PantryMember, Product, Purchase, RemoteId,
};
use std::collections::BTreeSet;

/// Write handle inside [`crate::Store::transaction`].
///
/// Everything done through a `Txn` lands atomically when the closure
/// returns `Ok`, and not at all otherwise.
pub struct Txn<'a> {
    tables: &'a mut Tables,
}

impl<'a> Txn<'a> {
    pub(crate) fn new(tables: &'a mut Tables) -> Self {
        Self { tables }
    }

    /// Inserts a purchase, assigning its local key.
    pub fn add_purchase(&mut self, mut purchase: Purchase) -> LocalId {
        let id = next_key(&self.tables.purchases);
        purchase.id = id;
        self.tables.purchases.insert(id, purchase);
        id
    }

    /// Inserts a product, assigning its local key.
    pub fn add_product(&mut self, mut product: Product) -> LocalId {
        let id = next_key(&self.tables.products);
        product.id = id;
        self.tables.products.insert(id, product);
        id
    }

    /// Bulk-upserts pantries by remote identity.
    ///
    /// Incoming rows overwrite the matching local row (keeping its local
    /// key) or are inserted fresh. Local pantries without a remote key
    /// (created offline and not yet pushed) are never touched, so an
    /// in-flight creation cannot be clobbered by a pull.
    pub fn upsert_pantries_by_remote(&mut self, pantries: Vec<Pantry>) -> StoreResult<()> {
        for incoming in pantries {
            let remote_id = incoming.remote_id.ok_or(StoreError::MissingRemoteKey {
                table: "pantries",
            })?;
            let existing = self
                .tables
                .pantries
                .values()
                .find(|p| p.remote_id == Some(remote_id))
                .map(|p| p.id);
            match existing {
                Some(local_id) => {
                    let slot = self
                        .tables
                        .pantries
                        .get_mut(&local_id)
                        .ok_or(StoreError::NotFound {
                            table: "pantries",
                            id: local_id,
                        })?;
                    *slot = Pantry {
                        id: local_id,
                        ..incoming
                    };
                }
                None => {
                    let id = next_key(&self.tables.pantries);
                    self.tables.pantries.insert(id, Pantry { id, ..incoming });
                }
            }
        }
        Ok(())
    }

    /// Returns the local key of the pantry with the given remote key, if
    /// present. Visible mid-transaction, so rows upserted earlier in the
    /// same closure resolve.
    pub fn pantry_local_id(&self, remote_id: RemoteId) -> Option<LocalId> {
        self.tables
            .pantries
            .values()
            .find(|p| p.remote_id == Some(remote_id))
            .map(|p| p.id)
    }

    /// Bulk-upserts pantry items pulled from the remote.
    ///
    /// Matching is by remote key first, then by the `(pantry, name)` merge
    /// identity: a just-pushed item has `synced == true` but no remote key
    /// yet, and must adopt the remote row instead of duplicating it.
    /// Locally dirty items (`synced == false`) are never overwritten; their
    /// edits are still waiting to be pushed.
    pub fn upsert_items_by_remote(&mut self, items: Vec<PantryItem>) -> StoreResult<()> {
        for incoming in items {
            let remote_id = incoming.remote_id.ok_or(StoreError::MissingRemoteKey {
                table: "pantry_items",
            })?;
            let existing = self
                .tables
                .pantry_items
                .values()
                .find(|i| i.remote_id == Some(remote_id))
                .or_else(|| {
                    self.tables
                        .pantry_items
                        .values()
                        .find(|i| i.pantry_id == incoming.pantry_id && i.name == incoming.name)
                })
                .map(|i| (i.id, i.synced));
            match existing {
                Some((_, false)) => {} // dirty local edit wins until pushed
                Some((local_id, true)) => {
                    let slot = self
                        .tables
                        .pantry_items
                        .get_mut(&local_id)
                        .ok_or(StoreError::NotFound {
                            table: "pantry_items",
                            id: local_id,
                        })?;
                    *slot = PantryItem {
                        id: local_id,
                        ..incoming
                    };
                }
                None => {
                    let id = next_key(&self.tables.pantry_items);
                    self.tables
                        .pantry_items
                        .insert(id, PantryItem { id, ..incoming });
                }
            }
        }
        Ok(())
    }

    /// Clears the membership table and replaces it with the given rows.
    ///
    /// Memberships are fully owned by the remote truth: a full replace is
    /// self-healing against remote deletions, which an upsert cannot
    /// express. Enforces the `(pantry_id, user_id)` unique index.
    pub fn replace_members(&mut self, members: Vec<PantryMember>) -> StoreResult<()> {
        let mut seen = BTreeSet::new();
        self.tables.members.clear();
        for mut member in members {
            if !seen.insert((member.pantry_id, member.user_id.clone())) {
                return Err(StoreError::DuplicateMember {
                    pantry_id: member.pantry_id,
                    user_id: member.user_id,
                });
            }
            let id = next_key(&self.tables.members);
            member.id = id;
            self.tables.members.insert(id, member);
        }
        Ok(())
    }

    /// Clears the invitation table and replaces it with the given rows.
    pub fn replace_invitations(&mut self, invitations: Vec<PantryInvitation>) {
        self.tables.invitations.clear();
        for invitation in invitations {
            self.tables.invitations.insert(invitation.id, invitation);
        }
    }
}
