//! The store handle and its tables.

use crate::error::{StoreError, StoreResult};
use crate::txn::Txn;
use parking_lot::RwLock;
use severa_model::{
    Category, LocalId, Pantry, PantryInvitation, PantryItem, PantryMember, Product, Purchase,
    RemoteId, UserId,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// All seven tables of one user's data.
///
/// Cloneable so a transaction can stage against a copy and commit by swap.
#[derive(Debug, Clone, Default)]
pub(crate) struct Tables {
    pub(crate) purchases: BTreeMap<LocalId, Purchase>,
    pub(crate) products: BTreeMap<LocalId, Product>,
    pub(crate) categories: BTreeMap<LocalId, Category>,
    pub(crate) pantries: BTreeMap<LocalId, Pantry>,
    pub(crate) pantry_items: BTreeMap<LocalId, PantryItem>,
    pub(crate) members: BTreeMap<LocalId, PantryMember>,
    pub(crate) invitations: BTreeMap<RemoteId, PantryInvitation>,
}

/// Next auto-key for a table (keys start at 1, Dexie-style).
pub(crate) fn next_key<T>(table: &BTreeMap<LocalId, T>) -> LocalId {
    table.keys().next_back().map_or(1, |k| k + 1)
}

/// A handle over one user's local tables.
///
/// The store is exclusively owned by the session that opened it, keyed by
/// user identity. All readers and the sync engines share the same handle;
/// multi-table mutation is serialized through [`Store::transaction`].
///
/// # Example
///
/// ```
/// use severa_store::Store;
/// use severa_model::{Pantry, PantryKind};
///
/// let store = Store::open("user-1").unwrap();
/// let id = store
///     .add_pantry(Pantry::new("Cocina", PantryKind::Personal, "user-1"))
///     .unwrap();
/// assert_eq!(store.unsynced_pantries().unwrap().len(), 1);
/// store.close();
/// ```
pub struct Store {
    user_id: UserId,
    inner: RwLock<Tables>,
    open: AtomicBool,
}

impl Store {
    /// Opens the store for the given user identity.
    pub fn open(user_id: impl Into<UserId>) -> StoreResult<Self> {
        let user_id = user_id.into();
        if user_id.is_empty() {
            return Err(StoreError::EmptyUserId);
        }
        tracing::debug!(user = %user_id, "opening local store");
        Ok(Self {
            user_id,
            inner: RwLock::new(Tables::default()),
            open: AtomicBool::new(true),
        })
    }

    /// Returns the identity this store belongs to.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Closes the handle; every later operation fails with `Closed`.
    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    /// Returns true if the handle is still open.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(StoreError::Closed)
        }
    }

    /// Runs `f` against a staged copy of the tables and commits atomically.
    ///
    /// If `f` returns an error nothing is applied; every table is left
    /// exactly as it was before the call.
    pub fn transaction<F>(&self, f: F) -> StoreResult<()>
    where
        F: FnOnce(&mut Txn<'_>) -> StoreResult<()>,
    {
        self.ensure_open()?;
        let mut guard = self.inner.write();
        let mut staged = guard.clone();
        let mut txn = Txn::new(&mut staged);
        f(&mut txn)?;
        *guard = staged;
        Ok(())
    }

    // --- purchases / products ---

    /// Inserts a purchase, assigning its local key.
    pub fn add_purchase(&self, mut purchase: Purchase) -> StoreResult<LocalId> {
        self.ensure_open()?;
        let mut tables = self.inner.write();
        let id = next_key(&tables.purchases);
        purchase.id = id;
        tables.purchases.insert(id, purchase);
        Ok(id)
    }

    /// Inserts a purchase together with its line items, atomically.
    ///
    /// This is the purchase-entry flow: the products are re-keyed under the
    /// freshly assigned purchase key.
    pub fn add_purchase_with_products(
        &self,
        purchase: Purchase,
        products: Vec<Product>,
    ) -> StoreResult<LocalId> {
        let mut assigned = 0;
        self.transaction(|txn| {
            assigned = txn.add_purchase(purchase.clone());
            for mut product in products.clone() {
                product.purchase_id = assigned;
                txn.add_product(product);
            }
            Ok(())
        })?;
        Ok(assigned)
    }

    /// Returns all purchases with `synced == false`, in key order.
    pub fn unsynced_purchases(&self) -> StoreResult<Vec<Purchase>> {
        self.ensure_open()?;
        Ok(self
            .inner
            .read()
            .purchases
            .values()
            .filter(|p| !p.synced)
            .cloned()
            .collect())
    }

    /// Returns all purchases.
    pub fn purchases(&self) -> StoreResult<Vec<Purchase>> {
        self.ensure_open()?;
        Ok(self.inner.read().purchases.values().cloned().collect())
    }

    /// Marks a purchase as published to the remote.
    pub fn mark_purchase_synced(&self, id: LocalId) -> StoreResult<()> {
        self.ensure_open()?;
        let mut tables = self.inner.write();
        let purchase = tables
            .purchases
            .get_mut(&id)
            .ok_or(StoreError::NotFound {
                table: "purchases",
                id,
            })?;
        purchase.synced = true;
        Ok(())
    }

    /// Returns the line items of one purchase, in key order.
    pub fn products_for_purchase(&self, purchase_id: LocalId) -> StoreResult<Vec<Product>> {
        self.ensure_open()?;
        Ok(self
            .inner
            .read()
            .products
            .values()
            .filter(|p| p.purchase_id == purchase_id)
            .cloned()
            .collect())
    }

    // --- categories ---

    /// Inserts a category, assigning its local key.
    pub fn add_category(&self, mut category: Category) -> StoreResult<LocalId> {
        self.ensure_open()?;
        let mut tables = self.inner.write();
        let id = next_key(&tables.categories);
        category.id = id;
        tables.categories.insert(id, category);
        Ok(id)
    }

    /// Returns all categories.
    pub fn categories(&self) -> StoreResult<Vec<Category>> {
        self.ensure_open()?;
        Ok(self.inner.read().categories.values().cloned().collect())
    }

    /// Returns all categories with `synced == false`, in key order.
    pub fn unsynced_categories(&self) -> StoreResult<Vec<Category>> {
        self.ensure_open()?;
        Ok(self
            .inner
            .read()
            .categories
            .values()
            .filter(|c| !c.synced)
            .cloned()
            .collect())
    }

    /// Marks a category as published to the remote.
    pub fn mark_category_synced(&self, id: LocalId) -> StoreResult<()> {
        self.ensure_open()?;
        let mut tables = self.inner.write();
        let category = tables
            .categories
            .get_mut(&id)
            .ok_or(StoreError::NotFound {
                table: "categories",
                id,
            })?;
        category.synced = true;
        Ok(())
    }

    // --- pantries ---

    /// Inserts a pantry, assigning its local key.
    pub fn add_pantry(&self, mut pantry: Pantry) -> StoreResult<LocalId> {
        self.ensure_open()?;
        if let Some(remote_id) = pantry.remote_id {
            self.check_unique_pantry_remote(remote_id)?;
        }
        let mut tables = self.inner.write();
        let id = next_key(&tables.pantries);
        pantry.id = id;
        tables.pantries.insert(id, pantry);
        Ok(id)
    }

    /// Returns one pantry by local key.
    pub fn pantry(&self, id: LocalId) -> StoreResult<Option<Pantry>> {
        self.ensure_open()?;
        Ok(self.inner.read().pantries.get(&id).cloned())
    }

    /// Returns one pantry by remote key.
    pub fn pantry_by_remote(&self, remote_id: RemoteId) -> StoreResult<Option<Pantry>> {
        self.ensure_open()?;
        Ok(self
            .inner
            .read()
            .pantries
            .values()
            .find(|p| p.remote_id == Some(remote_id))
            .cloned())
    }

    /// Returns all pantries, in key order.
    pub fn pantries(&self) -> StoreResult<Vec<Pantry>> {
        self.ensure_open()?;
        Ok(self.inner.read().pantries.values().cloned().collect())
    }

    /// Returns all pantries with `synced == false`, in key order.
    pub fn unsynced_pantries(&self) -> StoreResult<Vec<Pantry>> {
        self.ensure_open()?;
        Ok(self
            .inner
            .read()
            .pantries
            .values()
            .filter(|p| !p.synced)
            .cloned()
            .collect())
    }

    /// Records the remote key assigned to a pantry and marks it synced.
    ///
    /// Exactly one remote insert performs this transition.
    pub fn set_pantry_remote(&self, id: LocalId, remote_id: RemoteId) -> StoreResult<()> {
        self.ensure_open()?;
        self.check_unique_pantry_remote(remote_id)?;
        let mut tables = self.inner.write();
        let pantry = tables.pantries.get_mut(&id).ok_or(StoreError::NotFound {
            table: "pantries",
            id,
        })?;
        pantry.remote_id = Some(remote_id);
        pantry.synced = true;
        Ok(())
    }

    fn check_unique_pantry_remote(&self, remote_id: RemoteId) -> StoreResult<()> {
        if self
            .inner
            .read()
            .pantries
            .values()
            .any(|p| p.remote_id == Some(remote_id))
        {
            return Err(StoreError::DuplicateRemoteKey {
                table: "pantries",
                remote_id,
            });
        }
        Ok(())
    }

    // --- pantry items ---

    /// Inserts a pantry item, assigning its local key.
    pub fn add_pantry_item(&self, mut item: PantryItem) -> StoreResult<LocalId> {
        self.ensure_open()?;
        let mut tables = self.inner.write();
        let id = next_key(&tables.pantry_items);
        item.id = id;
        tables.pantry_items.insert(id, item);
        Ok(id)
    }

    /// Returns the items of one pantry, in key order.
    pub fn items_for_pantry(&self, pantry_id: LocalId) -> StoreResult<Vec<PantryItem>> {
        self.ensure_open()?;
        Ok(self
            .inner
            .read()
            .pantry_items
            .values()
            .filter(|i| i.pantry_id == pantry_id)
            .cloned()
            .collect())
    }

    /// Returns all items with `synced == false`, in key order.
    pub fn unsynced_pantry_items(&self) -> StoreResult<Vec<PantryItem>> {
        self.ensure_open()?;
        Ok(self
            .inner
            .read()
            .pantry_items
            .values()
            .filter(|i| !i.synced)
            .cloned()
            .collect())
    }

    /// Returns all pantry items.
    pub fn pantry_items(&self) -> StoreResult<Vec<PantryItem>> {
        self.ensure_open()?;
        Ok(self.inner.read().pantry_items.values().cloned().collect())
    }

    /// Marks a pantry item as published to the remote.
    pub fn mark_item_synced(&self, id: LocalId) -> StoreResult<()> {
        self.ensure_open()?;
        let mut tables = self.inner.write();
        let item = tables
            .pantry_items
            .get_mut(&id)
            .ok_or(StoreError::NotFound {
                table: "pantry_items",
                id,
            })?;
        item.synced = true;
        Ok(())
    }

    /// Replaces a pantry item in place (edit flow: the caller is expected
    /// to have cleared `synced` and bumped `last_modified`).
    pub fn update_pantry_item(&self, item: PantryItem) -> StoreResult<()> {
        self.ensure_open()?;
        let mut tables = self.inner.write();
        let id = item.id;
        match tables.pantry_items.get_mut(&id) {
            Some(slot) => {
                *slot = item;
                Ok(())
            }
            None => Err(StoreError::NotFound {
                table: "pantry_items",
                id,
            }),
        }
    }

    /// Deletes a pantry item.
    pub fn delete_pantry_item(&self, id: LocalId) -> StoreResult<()> {
        self.ensure_open()?;
        let mut tables = self.inner.write();
        tables
            .pantry_items
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound {
                table: "pantry_items",
                id,
            })
    }

    // --- members / invitations ---

    /// Returns all membership rows.
    pub fn members(&self) -> StoreResult<Vec<PantryMember>> {
        self.ensure_open()?;
        Ok(self.inner.read().members.values().cloned().collect())
    }

    /// Returns all pending invitations.
    pub fn invitations(&self) -> StoreResult<Vec<PantryInvitation>> {
        self.ensure_open()?;
        Ok(self.inner.read().invitations.values().cloned().collect())
    }

    /// Deletes one invitation (after the user answered it).
    pub fn delete_invitation(&self, id: RemoteId) -> StoreResult<()> {
        self.ensure_open()?;
        let mut tables = self.inner.write();
        tables
            .invitations
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound {
                table: "pantry_invitations",
                id: id as u64,
            })
    }
}
