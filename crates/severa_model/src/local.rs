//! Local table records.
//!
//! These are the shapes persisted in the per-user local store. Rows that
//! participate in push carry a `synced` flag and a `last_modified` timestamp
//! (client clock, epoch milliseconds). Rows fully owned by the remote
//! (members, invitations) carry neither.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Auto-assigned local table key.
pub type LocalId = u64;

/// Row key assigned by the remote backend.
pub type RemoteId = i64;

/// Identity of an authenticated user.
pub type UserId = String;

/// Current client-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Whether a pantry is private to its owner or shared with other users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PantryKind {
    /// Visible only to the owner.
    Personal,
    /// Shared with invited members.
    Shared,
}

/// Status of a pantry membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    /// Invitation sent, not yet answered.
    Pending,
    /// Member accepted the invitation (owners are always accepted).
    Accepted,
    /// Member declined the invitation.
    Declined,
}

/// A recorded purchase.
///
/// `synced` flips to true only after a successful remote insert; the
/// purchase and its products are locally authoritative until then.
#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    /// Local auto-key.
    pub id: LocalId,
    /// Total amount of the purchase.
    pub total_amount: f64,
    /// When the purchase happened.
    pub date: DateTime<Utc>,
    /// Whether the row has been published to the remote.
    pub synced: bool,
    /// Last local modification, epoch milliseconds.
    pub last_modified: i64,
}

impl Purchase {
    /// Creates a new unsynced purchase with the given date.
    pub fn new(total_amount: f64, date: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            total_amount,
            date,
            synced: false,
            last_modified: now_millis(),
        }
    }
}

/// A line item belonging to exactly one purchase.
///
/// Products have no sync flag of their own; their lifecycle is tied to the
/// parent purchase's sync.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Local auto-key.
    pub id: LocalId,
    /// Local key of the parent purchase.
    pub purchase_id: LocalId,
    /// Product name.
    pub name: String,
    /// Unit price.
    pub price: f64,
    /// Quantity purchased.
    pub quantity: f64,
}

impl Product {
    /// Creates a new product for the given purchase.
    pub fn new(purchase_id: LocalId, name: impl Into<String>, price: f64, quantity: f64) -> Self {
        Self {
            id: 0,
            purchase_id,
            name: name.into(),
            price,
            quantity,
        }
    }
}

/// A user-defined category, global per user (not per pantry).
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    /// Local auto-key.
    pub id: LocalId,
    /// Category name.
    pub name: String,
    /// Whether the row has been published to the remote.
    pub synced: bool,
    /// Last local modification, epoch milliseconds.
    pub last_modified: i64,
}

impl Category {
    /// Creates a new unsynced category.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            synced: false,
            last_modified: now_millis(),
        }
    }
}

/// A named inventory container, personal or shared.
///
/// Invariant: a pantry with `synced == false` has no remote key. Exactly one
/// remote insert transitions it to `synced == true` with `remote_id` set.
#[derive(Debug, Clone, PartialEq)]
pub struct Pantry {
    /// Local auto-key.
    pub id: LocalId,
    /// Key assigned by the remote backend, present once synced.
    pub remote_id: Option<RemoteId>,
    /// Display name.
    pub name: String,
    /// Personal or shared.
    pub kind: PantryKind,
    /// Identity of the owning user.
    pub owner_id: UserId,
    /// Whether the row has been published to the remote.
    pub synced: bool,
    /// Last local modification, epoch milliseconds.
    pub last_modified: i64,
}

impl Pantry {
    /// Creates a new unsynced pantry owned by `owner_id`.
    pub fn new(name: impl Into<String>, kind: PantryKind, owner_id: impl Into<UserId>) -> Self {
        Self {
            id: 0,
            remote_id: None,
            name: name.into(),
            kind,
            owner_id: owner_id.into(),
            synced: false,
            last_modified: now_millis(),
        }
    }
}

/// An item stored in a pantry.
///
/// For merge purposes item identity is name-scoped within a pantry: the
/// remote upsert key is `(pantry remote key, name)`. Renaming an item
/// therefore produces a new remote row rather than renaming the existing one.
#[derive(Debug, Clone, PartialEq)]
pub struct PantryItem {
    /// Local auto-key.
    pub id: LocalId,
    /// Key of the corresponding remote row, present once pulled.
    pub remote_id: Option<RemoteId>,
    /// Local key of the containing pantry.
    pub pantry_id: LocalId,
    /// Item name (merge identity within the pantry).
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Quantity on hand.
    pub quantity: f64,
    /// Optional local category reference.
    pub category_id: Option<LocalId>,
    /// Whether the item is flagged as running low.
    pub running_low: bool,
    /// Whether the row has been published to the remote.
    pub synced: bool,
    /// Last local modification, epoch milliseconds.
    pub last_modified: i64,
}

impl PantryItem {
    /// Creates a new unsynced item in the given local pantry.
    pub fn new(pantry_id: LocalId, name: impl Into<String>, quantity: f64) -> Self {
        Self {
            id: 0,
            remote_id: None,
            pantry_id,
            name: name.into(),
            description: None,
            quantity,
            category_id: None,
            running_low: false,
            synced: false,
            last_modified: now_millis(),
        }
    }
}

/// A pantry membership, fully owned by the remote truth.
///
/// Invariant: unique on `(pantry_id, user_id)`. The email is denormalized
/// for display of the member roster.
#[derive(Debug, Clone, PartialEq)]
pub struct PantryMember {
    /// Local auto-key.
    pub id: LocalId,
    /// Remote key of the membership row.
    pub remote_id: RemoteId,
    /// Remote key of the pantry.
    pub pantry_id: RemoteId,
    /// Identity of the member.
    pub user_id: UserId,
    /// Membership status.
    pub status: MemberStatus,
    /// Member email for display, when the roster join provided one.
    pub email: Option<String>,
}

/// A local-only projection of a pending membership, shown to the invitee.
#[derive(Debug, Clone, PartialEq)]
pub struct PantryInvitation {
    /// Remote key of the underlying membership row.
    pub id: RemoteId,
    /// Remote key of the pantry the invitation is for.
    pub pantry_id: RemoteId,
    /// Display name of the pantry.
    pub pantry_name: String,
    /// Display name for the inviter.
    pub owner_email: String,
}
