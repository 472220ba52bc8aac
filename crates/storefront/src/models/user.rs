//! User account model.

use chrono::{DateTime, Utc};

use shoplane_core::{Email, Phone, UserId};

/// A registered storefront account.
///
/// The password hash is deliberately not part of this model; repositories
/// return it separately only where verification needs it.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub phone: Phone,
    /// Saved shipping address, offered as the default at checkout.
    pub address: Option<String>,
    /// Reference to an uploaded profile picture.
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
