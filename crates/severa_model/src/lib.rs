//! # Severa Model
//!
//! Typed table records and row mapping for the Severa sync engine.
//!
//! This crate provides:
//! - Local records for the seven per-user tables
//! - Remote row shapes matching the backend's column names
//! - Explicit mapping functions between local and remote shapes
//!
//! This is a pure data crate with no I/O operations. The local store and
//! both sync engines build on these types, so schema drift between the
//! local and remote representations is caught at compile time.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod local;
mod map;
mod remote;

pub use local::{
    now_millis, Category, LocalId, MemberStatus, Pantry, PantryInvitation, PantryItem, PantryKind,
    PantryMember, Product, Purchase, RemoteId, UserId,
};
pub use map::{
    invitation_from_membership, iso_to_millis, item_from_remote, item_to_remote,
    member_from_remote, millis_to_iso, pantry_from_remote, pantry_to_remote, product_to_remote,
    purchase_to_remote, MapError, INVITER_PLACEHOLDER,
};
pub use remote::{
    MembershipRow, MembershipWithPantry, NewMembershipRow, NewPantryRow, NewProductRow,
    NewPurchaseRow, PantryItemRow, PantryItemUpsert, PantryRow, ProductRow, PurchaseRow,
};
