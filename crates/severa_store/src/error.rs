//! Error types for store operations.

use severa_model::{RemoteId, UserId};
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store handle has been closed.
    #[error("store is closed")]
    Closed,

    /// A store was opened without a user identity.
    #[error("a user id is required to open a store")]
    EmptyUserId,

    /// A row lookup by local key found nothing.
    #[error("no row with key {id} in table {table}")]
    NotFound {
        /// Table name.
        table: &'static str,
        /// Local key that was looked up.
        id: u64,
    },

    /// A write would duplicate a unique remote key.
    #[error("remote key {remote_id} already present in table {table}")]
    DuplicateRemoteKey {
        /// Table name.
        table: &'static str,
        /// The conflicting remote key.
        remote_id: RemoteId,
    },

    /// A write would duplicate the `(pantry_id, user_id)` membership index.
    #[error("duplicate membership for pantry {pantry_id} and user {user_id}")]
    DuplicateMember {
        /// Remote key of the pantry.
        pantry_id: RemoteId,
        /// Identity of the member.
        user_id: UserId,
    },

    /// A bulk upsert row is missing the remote key it must be matched on.
    #[error("row in table {table} has no remote key to upsert on")]
    MissingRemoteKey {
        /// Table name.
        table: &'static str,
    },
}
