//! Session-related types.
//!
//! Types stored in the session for authentication state. The session only
//! identifies the user; every core call still takes the explicit `UserId`.

use serde::{Deserialize, Serialize};

use shoplane_core::UserId;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's display name.
    pub name: String,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
