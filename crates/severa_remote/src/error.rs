//! Error types for remote operations.

use thiserror::Error;

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors that can occur talking to the remote backend.
///
/// The privileged-procedure variants carry the backend's user-facing
/// messages verbatim; the UI shows `Display` output directly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Network or transport failure.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the operation can be retried.
        retryable: bool,
    },

    /// The backend rejected the request.
    #[error("server error: {0}")]
    Server(String),

    /// The response could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Row-level authorization rejected the operation.
    #[error("not authorized: {0}")]
    Unauthorized(String),

    /// A referenced row does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A write violated a unique constraint.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Invitee email has no matching account.
    #[error("Usuario no encontrado.")]
    UserNotFound,

    /// Invitee is already a member or has a pending invitation.
    #[error("Este usuario ya es miembro o tiene una invitación pendiente.")]
    AlreadyMember,

    /// Only the pantry owner may remove members.
    #[error("Solo el dueño de la alacena puede eliminar miembros.")]
    NotPantryOwner,

    /// The pantry owner cannot be removed.
    #[error("No puedes eliminar al dueño de la alacena.")]
    CannotRemoveOwner,
}

impl RemoteError {
    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if retrying the call could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteError::Transport { retryable, .. } => *retryable,
            RemoteError::Server(_) => true,
            _ => false,
        }
    }

    /// Returns true if this error came from an explicit user action
    /// (invite/remove/authorization) rather than background sync plumbing.
    pub fn is_action_error(&self) -> bool {
        matches!(
            self,
            RemoteError::UserNotFound
                | RemoteError::AlreadyMember
                | RemoteError::NotPantryOwner
                | RemoteError::CannotRemoveOwner
                | RemoteError::Unauthorized(_)
        )
    }
}
