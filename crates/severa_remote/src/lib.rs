//! # Severa Remote
//!
//! The remote backend boundary: an authenticated, row-level-authorized
//! multi-tenant store reached over HTTPS.
//!
//! This crate provides:
//! - [`RemoteStore`], the typed trait the sync engines talk to
//! - [`MockBackend`], an in-memory multi-tenant backend for tests
//! - [`RestRemote`], the blocking HTTP implementation
//!
//! Implementations carry the caller's identity (they are connected,
//! authenticated sessions), so trait methods take no user parameter. The
//! two privileged procedures, `invite_member` and `remove_member`, run
//! with elevated trust on the backend and perform cross-user writes the
//! row-level rules would otherwise forbid.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod mock;
mod rest;

pub use error::{RemoteError, RemoteResult};
pub use mock::{MockBackend, MockRemote};
pub use rest::{RestConfig, RestRemote};

use severa_model::{
    MembershipRow, MembershipWithPantry, NewMembershipRow, NewPantryRow, NewProductRow,
    NewPurchaseRow, PantryItemRow, PantryItemUpsert, RemoteId, UserId,
};

/// The remote multi-tenant backend, seen from one authenticated session.
///
/// Every call can fail with a transport error; callers own retry policy.
/// Row-level authorization is enforced behind this boundary: reads return
/// only rows visible to the session's user, and writes outside the user's
/// rows are rejected.
pub trait RemoteStore: Send + Sync {
    /// Inserts a pantry and returns the remote key the backend assigned.
    fn insert_pantry(&self, pantry: &NewPantryRow) -> RemoteResult<RemoteId>;

    /// Inserts a membership row.
    fn insert_membership(&self, membership: &NewMembershipRow) -> RemoteResult<()>;

    /// Upserts a pantry item, keyed on `(pantry_id, name)`.
    ///
    /// Re-sending an already-pushed item overwrites the remote fields
    /// instead of duplicating the row; concurrent writers resolve by last
    /// writer wins.
    fn upsert_pantry_item(&self, item: &PantryItemUpsert) -> RemoteResult<()>;

    /// Inserts a purchase together with its line items in one transactional
    /// call, returning the remote purchase key.
    ///
    /// Atomicity here is load-bearing: a partial insert would strand a
    /// purchase with no products remotely while the local row stays dirty,
    /// duplicating the purchase on the next push.
    fn insert_purchase(
        &self,
        purchase: &NewPurchaseRow,
        products: &[NewProductRow],
    ) -> RemoteResult<RemoteId>;

    /// Fetches the caller's full visible state in one aggregate query:
    /// every membership row of the user with the pantry it references
    /// joined in.
    fn fetch_memberships(&self) -> RemoteResult<Vec<MembershipWithPantry>>;

    /// Fetches the complete member roster of one pantry, with member
    /// emails joined in.
    fn fetch_pantry_members(&self, pantry_id: RemoteId) -> RemoteResult<Vec<MembershipRow>>;

    /// Fetches every item of one pantry.
    fn fetch_pantry_items(&self, pantry_id: RemoteId) -> RemoteResult<Vec<PantryItemRow>>;

    /// Accepts a pending invitation addressed to the caller.
    fn accept_invitation(&self, membership_id: RemoteId) -> RemoteResult<()>;

    /// Declines a pending invitation addressed to the caller, deleting it.
    fn decline_invitation(&self, membership_id: RemoteId) -> RemoteResult<()>;

    /// Privileged: invites a user by email to a pantry.
    ///
    /// Looks up the invitee account, rejects existing members and pending
    /// invitations, and inserts a pending membership. Returns the backend's
    /// success message.
    fn invite_member(&self, pantry_id: RemoteId, invitee_email: &str) -> RemoteResult<String>;

    /// Privileged: removes a member from a pantry.
    ///
    /// The caller must be the pantry owner, and the owner can never be
    /// removed. Returns the backend's success message.
    fn remove_member(&self, pantry_id: RemoteId, user_id: &UserId) -> RemoteResult<String>;
}
