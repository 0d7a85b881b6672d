//! Mapping between local records and remote rows.
//!
//! All shape conversion at the push/pull boundary goes through these
//! functions; the engines never build a remote row field by field.

use crate::local::{
    LocalId, MemberStatus, Pantry, PantryInvitation, PantryItem, PantryMember, Product, Purchase,
    RemoteId, UserId,
};
use crate::remote::{
    MembershipRow, MembershipWithPantry, NewPantryRow, NewProductRow, NewPurchaseRow,
    PantryItemRow, PantryItemUpsert, PantryRow,
};
use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

/// Display name used for the inviter when the aggregate query does not
/// join the owner's email.
pub const INVITER_PLACEHOLDER: &str = "Un usuario";

/// Errors from local/remote shape mapping.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// An epoch-millisecond value is outside the representable range.
    #[error("invalid epoch milliseconds: {0}")]
    InvalidMillis(i64),

    /// A remote timestamp string could not be parsed.
    #[error("unparseable timestamp: {0}")]
    InvalidIso(String),
}

/// Converts epoch milliseconds to an ISO-8601 string.
pub fn millis_to_iso(millis: i64) -> Result<String, MapError> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .ok_or(MapError::InvalidMillis(millis))
}

/// Parses an ISO-8601 string into epoch milliseconds.
pub fn iso_to_millis(iso: &str) -> Result<i64, MapError> {
    DateTime::parse_from_rfc3339(iso)
        .map(|dt| dt.timestamp_millis())
        .map_err(|_| MapError::InvalidIso(iso.to_string()))
}

/// Builds the remote insert shape for a locally-created pantry.
pub fn pantry_to_remote(pantry: &Pantry) -> NewPantryRow {
    NewPantryRow {
        name: pantry.name.clone(),
        pantry_type: pantry.kind,
        owner_id: pantry.owner_id.clone(),
    }
}

/// Builds a local pantry record from a remote row.
///
/// The result is marked synced with its remote key set; the local key is
/// left at zero for the store's upsert to assign or retain.
pub fn pantry_from_remote(row: &PantryRow) -> Result<Pantry, MapError> {
    Ok(Pantry {
        id: 0,
        remote_id: Some(row.id),
        name: row.name.clone(),
        kind: row.pantry_type,
        owner_id: row.owner_id.clone(),
        synced: true,
        last_modified: iso_to_millis(&row.created_at)?,
    })
}

/// Builds the remote upsert shape for a pantry item, keyed under its
/// parent pantry's remote key.
pub fn item_to_remote(
    item: &PantryItem,
    pantry_remote_id: RemoteId,
) -> Result<PantryItemUpsert, MapError> {
    Ok(PantryItemUpsert {
        pantry_id: pantry_remote_id,
        name: item.name.clone(),
        description: item.description.clone(),
        quantity: item.quantity,
        running_low: item.running_low,
        category_id: item.category_id.map(|id| id as RemoteId),
        last_modified: millis_to_iso(item.last_modified)?,
    })
}

/// Builds a local item record from a remote row, re-homed under the given
/// local pantry key.
pub fn item_from_remote(row: &PantryItemRow, local_pantry_id: LocalId) -> Result<PantryItem, MapError> {
    Ok(PantryItem {
        id: 0,
        remote_id: Some(row.id),
        pantry_id: local_pantry_id,
        name: row.name.clone(),
        description: row.description.clone(),
        quantity: row.quantity,
        category_id: row.category_id.map(|id| id as LocalId),
        running_low: row.running_low,
        synced: true,
        last_modified: iso_to_millis(&row.last_modified)?,
    })
}

/// Builds a local member record from a remote roster row.
pub fn member_from_remote(row: &MembershipRow) -> PantryMember {
    PantryMember {
        id: 0,
        remote_id: row.id,
        pantry_id: row.pantry_id,
        user_id: row.user_id.clone(),
        status: row.status,
        email: row.email.clone(),
    }
}

/// Projects a pending membership into a local invitation, if the pantry
/// join is present.
pub fn invitation_from_membership(row: &MembershipWithPantry) -> Option<PantryInvitation> {
    if row.status != MemberStatus::Pending {
        return None;
    }
    let pantry = row.pantry.as_ref()?;
    Some(PantryInvitation {
        id: row.id,
        pantry_id: pantry.id,
        pantry_name: pantry.name.clone(),
        owner_email: INVITER_PLACEHOLDER.to_string(),
    })
}

/// Builds the remote insert shape for a purchase, tagged with the acting
/// user's identity.
pub fn purchase_to_remote(purchase: &Purchase, user_id: &UserId) -> Result<NewPurchaseRow, MapError> {
    Ok(NewPurchaseRow {
        total_amount: purchase.total_amount,
        date: purchase.date.to_rfc3339_opts(SecondsFormat::Millis, true),
        last_modified: millis_to_iso(purchase.last_modified)?,
        user_id: user_id.clone(),
    })
}

/// Builds the remote insert shape for a purchase line item.
pub fn product_to_remote(product: &Product) -> NewProductRow {
    NewProductRow {
        name: product.name.clone(),
        price: product.price,
        quantity: product.quantity,
    }
}
