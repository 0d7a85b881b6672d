//! Session configuration.

use severa_model::UserId;

/// Settings for one signed-in session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Identity of the authenticated user.
    pub user_id: UserId,
    /// Initial connectivity assumption. When false, sign-in opens the
    /// store but runs no initial cycle; every sync request reports
    /// offline until connectivity is flipped on.
    pub assume_online: bool,
    /// Base URL of the remote backend, for callers wiring up the REST
    /// transport. Sessions against a test backend leave it unset.
    pub server_url: Option<String>,
}

impl SyncConfig {
    /// Creates a config for the given user, assumed online.
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            assume_online: true,
            server_url: None,
        }
    }

    /// Starts the session offline.
    pub fn offline(mut self) -> Self {
        self.assume_online = false;
        self
    }

    /// Sets the remote backend's base URL.
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }
}
