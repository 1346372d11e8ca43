//! Authenticated session handle.
//!
//! A session is the switch between anonymous (cart lives only locally) and
//! authenticated (cart mirrored to the backend) operation. The cart store
//! acts remote-first only once a session is attached, so cart sync naturally
//! waits for auth hydration.

use lubro_core::UserId;
use secrecy::{ExposeSecret, SecretString};

/// An authenticated user session.
#[derive(Clone)]
pub struct Session {
    user_id: UserId,
    token: SecretString,
}

impl Session {
    /// Create a session from a user id and its bearer token.
    #[must_use]
    pub fn new(user_id: UserId, token: SecretString) -> Self {
        Self { user_id, token }
    }

    /// The authenticated user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Expose the bearer token for request signing.
    #[must_use]
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
