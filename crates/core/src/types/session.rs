//! Session-related types.

use serde::{Deserialize, Serialize};

use super::UserId;

/// The authenticated user's identity for the lifetime of a session.
///
/// Created on successful sign-in and destroyed on sign-out; all entry store
/// activity is bounded by one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    /// Backend-issued user id.
    pub user_id: UserId,
    /// Whether this is a guest (anonymous) session.
    pub is_anonymous: bool,
}

impl UserSession {
    /// Create a session for a registered user.
    #[must_use]
    pub const fn registered(user_id: UserId) -> Self {
        Self {
            user_id,
            is_anonymous: false,
        }
    }

    /// Create a session for an anonymous guest.
    #[must_use]
    pub const fn anonymous(user_id: UserId) -> Self {
        Self {
            user_id,
            is_anonymous: true,
        }
    }
}
