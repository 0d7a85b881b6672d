//! In-memory multi-tenant backend for tests.

use crate::error::{RemoteError, RemoteResult};
use crate::RemoteStore;
use parking_lot::RwLock;
use severa_model::{
    millis_to_iso, now_millis, MemberStatus, MembershipRow, MembershipWithPantry, NewMembershipRow,
    NewPantryRow, NewProductRow, NewPurchaseRow, PantryItemRow, PantryItemUpsert, PantryRow,
    ProductRow, PurchaseRow, RemoteId, UserId,
};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct MemberRec {
    id: RemoteId,
    pantry_id: RemoteId,
    user_id: UserId,
    status: MemberStatus,
}

#[derive(Debug, Default)]
struct State {
    /// Registered accounts: user id to email.
    users: BTreeMap<UserId, String>,
    pantries: BTreeMap<RemoteId, PantryRow>,
    members: BTreeMap<RemoteId, MemberRec>,
    items: BTreeMap<RemoteId, PantryItemRow>,
    purchases: BTreeMap<RemoteId, PurchaseRow>,
    products: BTreeMap<RemoteId, ProductRow>,
    next_id: RemoteId,
    /// Fault injection: allow this many calls, then fail the next ones.
    allow_calls: u32,
    fail_calls: u32,
}

impl State {
    fn assign_id(&mut self) -> RemoteId {
        self.next_id += 1;
        self.next_id
    }

    fn member_for(&self, pantry_id: RemoteId, user_id: &str) -> Option<&MemberRec> {
        self.members
            .values()
            .find(|m| m.pantry_id == pantry_id && m.user_id == user_id)
    }

    fn can_write_pantry(&self, pantry_id: RemoteId, user_id: &str) -> bool {
        self.pantries
            .get(&pantry_id)
            .is_some_and(|p| p.owner_id == user_id)
            || self
                .member_for(pantry_id, user_id)
                .is_some_and(|m| m.status == MemberStatus::Accepted)
    }
}

/// A shared in-memory backend with row-level authorization.
///
/// Plays the role of the real multi-tenant server in tests: register
/// accounts, connect per-user sessions, inject transport faults, and
/// inspect the resulting rows.
///
/// # Example
///
/// ```
/// use severa_remote::{MockBackend, RemoteStore};
/// use severa_model::{NewPantryRow, PantryKind};
///
/// let backend = MockBackend::new();
/// backend.register_user("owner-1", "owner@example.com");
/// let remote = backend.connect("owner-1");
///
/// let id = remote
///     .insert_pantry(&NewPantryRow {
///         name: "Cocina".into(),
///         pantry_type: PantryKind::Shared,
///         owner_id: "owner-1".into(),
///     })
///     .unwrap();
/// assert!(backend.pantry(id).is_some());
/// ```
#[derive(Debug, Default, Clone)]
pub struct MockBackend {
    state: Arc<RwLock<State>>,
}

impl MockBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account so email lookup and rosters can find it.
    pub fn register_user(&self, user_id: impl Into<UserId>, email: impl Into<String>) {
        self.state.write().users.insert(user_id.into(), email.into());
    }

    /// Opens an authenticated session for `user_id`.
    pub fn connect(&self, user_id: impl Into<UserId>) -> MockRemote {
        MockRemote {
            state: Arc::clone(&self.state),
            user: user_id.into(),
        }
    }

    /// Fails the next `count` remote calls with a retryable transport error.
    pub fn fail_next(&self, count: u32) {
        self.fail_after(0, count);
    }

    /// Allows `allow` calls to succeed, then fails the following `count`.
    pub fn fail_after(&self, allow: u32, count: u32) {
        let mut state = self.state.write();
        state.allow_calls = allow;
        state.fail_calls = count;
    }

    // --- inspection for tests ---

    /// Returns one pantry row.
    pub fn pantry(&self, id: RemoteId) -> Option<PantryRow> {
        self.state.read().pantries.get(&id).cloned()
    }

    /// Returns the number of pantry rows.
    pub fn pantry_count(&self) -> usize {
        self.state.read().pantries.len()
    }

    /// Returns true if a membership row exists for `(pantry_id, user_id)`.
    pub fn has_member(&self, pantry_id: RemoteId, user_id: &str) -> bool {
        self.state.read().member_for(pantry_id, user_id).is_some()
    }

    /// Returns the status of a member, if the row exists.
    pub fn member_status(&self, pantry_id: RemoteId, user_id: &str) -> Option<MemberStatus> {
        self.state
            .read()
            .member_for(pantry_id, user_id)
            .map(|m| m.status)
    }

    /// Returns one item row by its merge identity.
    pub fn item(&self, pantry_id: RemoteId, name: &str) -> Option<PantryItemRow> {
        self.state
            .read()
            .items
            .values()
            .find(|i| i.pantry_id == pantry_id && i.name == name)
            .cloned()
    }

    /// Returns the number of item rows in one pantry.
    pub fn item_count(&self, pantry_id: RemoteId) -> usize {
        self.state
            .read()
            .items
            .values()
            .filter(|i| i.pantry_id == pantry_id)
            .count()
    }

    /// Returns the number of purchase rows for one user.
    pub fn purchase_count(&self, user_id: &str) -> usize {
        self.state
            .read()
            .purchases
            .values()
            .filter(|p| p.user_id == user_id)
            .count()
    }

    /// Returns the product rows of one purchase.
    pub fn products_for(&self, purchase_id: RemoteId) -> Vec<ProductRow> {
        self.state
            .read()
            .products
            .values()
            .filter(|p| p.purchase_id == purchase_id)
            .cloned()
            .collect()
    }
}

/// One authenticated session against a [`MockBackend`].
pub struct MockRemote {
    state: Arc<RwLock<State>>,
    user: UserId,
}

impl MockRemote {
    fn check_fault(&self) -> RemoteResult<()> {
        let mut state = self.state.write();
        if state.allow_calls > 0 {
            state.allow_calls -= 1;
            return Ok(());
        }
        if state.fail_calls > 0 {
            state.fail_calls -= 1;
            return Err(RemoteError::transport_retryable("injected transport failure"));
        }
        Ok(())
    }

    fn created_now() -> RemoteResult<String> {
        millis_to_iso(now_millis()).map_err(|e| RemoteError::Server(e.to_string()))
    }
}

impl RemoteStore for MockRemote {
    fn insert_pantry(&self, pantry: &NewPantryRow) -> RemoteResult<RemoteId> {
        self.check_fault()?;
        if pantry.owner_id != self.user {
            return Err(RemoteError::Unauthorized(
                "owner_id must match the authenticated user".into(),
            ));
        }
        let created_at = Self::created_now()?;
        let mut state = self.state.write();
        let id = state.assign_id();
        state.pantries.insert(
            id,
            PantryRow {
                id,
                name: pantry.name.clone(),
                pantry_type: pantry.pantry_type,
                owner_id: pantry.owner_id.clone(),
                created_at,
            },
        );
        Ok(id)
    }

    fn insert_membership(&self, membership: &NewMembershipRow) -> RemoteResult<()> {
        self.check_fault()?;
        let mut state = self.state.write();
        if !state.pantries.contains_key(&membership.pantry_id) {
            return Err(RemoteError::NotFound(format!(
                "pantry {}",
                membership.pantry_id
            )));
        }
        if state
            .member_for(membership.pantry_id, &membership.user_id)
            .is_some()
        {
            return Err(RemoteError::Conflict(format!(
                "membership ({}, {})",
                membership.pantry_id, membership.user_id
            )));
        }
        let id = state.assign_id();
        state.members.insert(
            id,
            MemberRec {
                id,
                pantry_id: membership.pantry_id,
                user_id: membership.user_id.clone(),
                status: membership.status,
            },
        );
        Ok(())
    }

    fn upsert_pantry_item(&self, item: &PantryItemUpsert) -> RemoteResult<()> {
        self.check_fault()?;
        let mut state = self.state.write();
        if !state.can_write_pantry(item.pantry_id, &self.user) {
            return Err(RemoteError::Unauthorized(format!(
                "no accepted membership for pantry {}",
                item.pantry_id
            )));
        }
        let existing = state
            .items
            .values()
            .find(|i| i.pantry_id == item.pantry_id && i.name == item.name)
            .map(|i| i.id);
        let id = match existing {
            Some(id) => id,
            None => state.assign_id(),
        };
        // Last writer wins on the (pantry_id, name) conflict target.
        state.items.insert(
            id,
            PantryItemRow {
                id,
                pantry_id: item.pantry_id,
                name: item.name.clone(),
                description: item.description.clone(),
                quantity: item.quantity,
                running_low: item.running_low,
                category_id: item.category_id,
                last_modified: item.last_modified.clone(),
            },
        );
        Ok(())
    }

    fn insert_purchase(
        &self,
        purchase: &NewPurchaseRow,
        products: &[NewProductRow],
    ) -> RemoteResult<RemoteId> {
        self.check_fault()?;
        if purchase.user_id != self.user {
            return Err(RemoteError::Unauthorized(
                "user_id must match the authenticated user".into(),
            ));
        }
        let mut state = self.state.write();
        let purchase_id = state.assign_id();
        state.purchases.insert(
            purchase_id,
            PurchaseRow {
                id: purchase_id,
                total_amount: purchase.total_amount,
                date: purchase.date.clone(),
                last_modified: purchase.last_modified.clone(),
                user_id: purchase.user_id.clone(),
            },
        );
        for product in products {
            let id = state.assign_id();
            state.products.insert(
                id,
                ProductRow {
                    id,
                    purchase_id,
                    name: product.name.clone(),
                    price: product.price,
                    quantity: product.quantity,
                    user_id: self.user.clone(),
                },
            );
        }
        Ok(purchase_id)
    }

    fn fetch_memberships(&self) -> RemoteResult<Vec<MembershipWithPantry>> {
        self.check_fault()?;
        let state = self.state.read();
        Ok(state
            .members
            .values()
            .filter(|m| m.user_id == self.user)
            .map(|m| MembershipWithPantry {
                id: m.id,
                status: m.status,
                pantry: state.pantries.get(&m.pantry_id).cloned(),
            })
            .collect())
    }

    fn fetch_pantry_members(&self, pantry_id: RemoteId) -> RemoteResult<Vec<MembershipRow>> {
        self.check_fault()?;
        let state = self.state.read();
        if state.member_for(pantry_id, &self.user).is_none()
            && !state
                .pantries
                .get(&pantry_id)
                .is_some_and(|p| p.owner_id == self.user)
        {
            return Err(RemoteError::Unauthorized(format!(
                "no membership for pantry {pantry_id}"
            )));
        }
        Ok(state
            .members
            .values()
            .filter(|m| m.pantry_id == pantry_id)
            .map(|m| MembershipRow {
                id: m.id,
                pantry_id: m.pantry_id,
                user_id: m.user_id.clone(),
                status: m.status,
                email: state.users.get(&m.user_id).cloned(),
            })
            .collect())
    }

    fn fetch_pantry_items(&self, pantry_id: RemoteId) -> RemoteResult<Vec<PantryItemRow>> {
        self.check_fault()?;
        let state = self.state.read();
        if !state.can_write_pantry(pantry_id, &self.user) {
            return Err(RemoteError::Unauthorized(format!(
                "no accepted membership for pantry {pantry_id}"
            )));
        }
        Ok(state
            .items
            .values()
            .filter(|i| i.pantry_id == pantry_id)
            .cloned()
            .collect())
    }

    fn accept_invitation(&self, membership_id: RemoteId) -> RemoteResult<()> {
        self.check_fault()?;
        let mut state = self.state.write();
        let member = state
            .members
            .get_mut(&membership_id)
            .ok_or_else(|| RemoteError::NotFound(format!("membership {membership_id}")))?;
        if member.user_id != self.user {
            return Err(RemoteError::Unauthorized(
                "invitation addressed to another user".into(),
            ));
        }
        member.status = MemberStatus::Accepted;
        Ok(())
    }

    fn decline_invitation(&self, membership_id: RemoteId) -> RemoteResult<()> {
        self.check_fault()?;
        let mut state = self.state.write();
        let addressed_to_caller = state
            .members
            .get(&membership_id)
            .map(|m| m.user_id == self.user)
            .ok_or_else(|| RemoteError::NotFound(format!("membership {membership_id}")))?;
        if !addressed_to_caller {
            return Err(RemoteError::Unauthorized(
                "invitation addressed to another user".into(),
            ));
        }
        state.members.remove(&membership_id);
        Ok(())
    }

    fn invite_member(&self, pantry_id: RemoteId, invitee_email: &str) -> RemoteResult<String> {
        self.check_fault()?;
        let mut state = self.state.write();
        if !state.pantries.contains_key(&pantry_id) {
            return Err(RemoteError::NotFound(format!("pantry {pantry_id}")));
        }
        let invitee = state
            .users
            .iter()
            .find(|(_, email)| email.as_str() == invitee_email)
            .map(|(id, _)| id.clone())
            .ok_or(RemoteError::UserNotFound)?;
        if state.member_for(pantry_id, &invitee).is_some() {
            return Err(RemoteError::AlreadyMember);
        }
        let id = state.assign_id();
        state.members.insert(
            id,
            MemberRec {
                id,
                pantry_id,
                user_id: invitee,
                status: MemberStatus::Pending,
            },
        );
        Ok("¡Invitación enviada con éxito!".to_string())
    }

    fn remove_member(&self, pantry_id: RemoteId, user_id: &UserId) -> RemoteResult<String> {
        self.check_fault()?;
        let mut state = self.state.write();
        let owner_id = state
            .pantries
            .get(&pantry_id)
            .map(|p| p.owner_id.clone())
            .ok_or_else(|| RemoteError::NotFound(format!("pantry {pantry_id}")))?;
        if owner_id != self.user {
            return Err(RemoteError::NotPantryOwner);
        }
        if &owner_id == user_id {
            return Err(RemoteError::CannotRemoveOwner);
        }
        let target = state.member_for(pantry_id, user_id).map(|m| m.id);
        if let Some(id) = target {
            state.members.remove(&id);
        }
        Ok("Miembro eliminado con éxito.".to_string())
    }
}
