//! Remote row shapes.
//!
//! Structs in this module match the backend's column names exactly and are
//! the only shapes that cross the wire. Timestamps travel as ISO-8601
//! strings; the local epoch-millis representation never leaves the device.

use crate::local::{MemberStatus, PantryKind, RemoteId, UserId};
use serde::{Deserialize, Serialize};

/// Insert shape for a pantry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPantryRow {
    /// Display name.
    pub name: String,
    /// Personal or shared.
    pub pantry_type: PantryKind,
    /// Identity of the owning user.
    pub owner_id: UserId,
}

/// A pantry row as stored remotely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PantryRow {
    /// Remote key.
    pub id: RemoteId,
    /// Display name.
    pub name: String,
    /// Personal or shared.
    pub pantry_type: PantryKind,
    /// Identity of the owning user.
    pub owner_id: UserId,
    /// Row creation time, ISO-8601.
    pub created_at: String,
}

/// Insert shape for a membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMembershipRow {
    /// Remote key of the pantry.
    pub pantry_id: RemoteId,
    /// Identity of the member.
    pub user_id: UserId,
    /// Initial status.
    pub status: MemberStatus,
}

/// A membership row with the member's email joined in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipRow {
    /// Remote key of the membership row.
    pub id: RemoteId,
    /// Remote key of the pantry.
    pub pantry_id: RemoteId,
    /// Identity of the member.
    pub user_id: UserId,
    /// Membership status.
    pub status: MemberStatus,
    /// Member email from the users join, when available.
    pub email: Option<String>,
}

/// One row of the aggregate visible-state query: a membership of the
/// authenticated user together with the pantry it references.
///
/// The pantry join can be empty when row-level authorization filters the
/// pantry out; consumers must tolerate that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipWithPantry {
    /// Remote key of the membership row.
    pub id: RemoteId,
    /// Membership status.
    pub status: MemberStatus,
    /// The joined pantry, if visible.
    #[serde(rename = "pantries")]
    pub pantry: Option<PantryRow>,
}

/// Upsert shape for a pantry item.
///
/// The remote conflict target is `(pantry_id, name)`; re-sending the same
/// item overwrites the remote fields instead of duplicating the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PantryItemUpsert {
    /// Remote key of the containing pantry.
    pub pantry_id: RemoteId,
    /// Item name (conflict key together with `pantry_id`).
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Quantity on hand.
    pub quantity: f64,
    /// Whether the item is flagged as running low.
    pub running_low: bool,
    /// Optional category reference.
    pub category_id: Option<RemoteId>,
    /// Last modification time, ISO-8601.
    pub last_modified: String,
}

/// A pantry item row as stored remotely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PantryItemRow {
    /// Remote key.
    pub id: RemoteId,
    /// Remote key of the containing pantry.
    pub pantry_id: RemoteId,
    /// Item name.
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Quantity on hand.
    pub quantity: f64,
    /// Whether the item is flagged as running low.
    pub running_low: bool,
    /// Optional category reference.
    pub category_id: Option<RemoteId>,
    /// Last modification time, ISO-8601.
    pub last_modified: String,
}

/// Insert shape for a purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPurchaseRow {
    /// Total amount of the purchase.
    pub total_amount: f64,
    /// Purchase date, ISO-8601.
    pub date: String,
    /// Last modification time, ISO-8601.
    pub last_modified: String,
    /// Identity of the purchasing user.
    pub user_id: UserId,
}

/// A purchase row as stored remotely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRow {
    /// Remote key.
    pub id: RemoteId,
    /// Total amount of the purchase.
    pub total_amount: f64,
    /// Purchase date, ISO-8601.
    pub date: String,
    /// Last modification time, ISO-8601.
    pub last_modified: String,
    /// Identity of the purchasing user.
    pub user_id: UserId,
}

/// Insert shape for a purchase line item.
///
/// The purchase key is assigned server-side: products are only ever
/// inserted together with their purchase in one transactional call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProductRow {
    /// Product name.
    pub name: String,
    /// Unit price.
    pub price: f64,
    /// Quantity purchased.
    pub quantity: f64,
}

/// A product row as stored remotely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRow {
    /// Remote key.
    pub id: RemoteId,
    /// Remote key of the parent purchase.
    pub purchase_id: RemoteId,
    /// Product name.
    pub name: String,
    /// Unit price.
    pub price: f64,
    /// Quantity purchased.
    pub quantity: f64,
    /// Identity of the purchasing user.
    pub user_id: UserId,
}
