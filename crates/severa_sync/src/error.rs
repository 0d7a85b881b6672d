//! Error types for sync cycles.

use severa_model::MapError;
use severa_remote::RemoteError;
use severa_store::StoreError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can abort a sync cycle.
///
/// Cycle errors never escape the orchestrator: they are logged, reported
/// through the status feed, and the cycle ends with the store in a
/// consistent (if stale) state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    /// The local store rejected an operation.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The remote backend rejected an operation.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Local and remote shapes failed to map.
    #[error("mapping error: {0}")]
    Map(#[from] MapError),

    /// No session is signed in.
    #[error("no active session")]
    NoSession,
}

impl SyncError {
    /// Returns true if retrying the cycle could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Remote(e) => e.is_retryable(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryability_follows_the_remote() {
        let transient: SyncError = RemoteError::transport_retryable("reset").into();
        assert!(transient.is_retryable());

        let store: SyncError = StoreError::Closed.into();
        assert!(!store.is_retryable());
        assert!(!SyncError::NoSession.is_retryable());
    }
}
