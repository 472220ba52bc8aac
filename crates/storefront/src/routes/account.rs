//! Account routes.
//!
//! Profile read and update for the logged-in user. Password changes are
//! not part of the profile surface.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::User;
use crate::services::AccountService;
use crate::state::AppState;

/// User profile as returned to clients. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id.into(),
            name: user.name,
            email: user.email.to_string(),
            phone: user.phone.to_string(),
            address: user.address,
            profile_picture: user.profile_picture,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Request to update the profile.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

/// Get the current user's profile.
///
/// GET /account
///
/// # Errors
///
/// Returns 401 when not logged in, 404 if the account was deleted.
#[tracing::instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<UserView>> {
    let accounts = AccountService::new(state.pool());
    let user = accounts.find_by_id(current.id).await?;
    Ok(Json(UserView::from(user)))
}

/// Update the current user's profile.
///
/// PUT /account
///
/// # Errors
///
/// Returns 400 for invalid fields, 409 if the new email or phone is taken.
#[tracing::instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserView>> {
    let accounts = AccountService::new(state.pool());
    let user = accounts
        .update_profile(
            current.id,
            &req.name,
            &req.email,
            &req.phone,
            req.address.as_deref(),
            req.profile_picture.as_deref(),
        )
        .await?;
    Ok(Json(UserView::from(user)))
}
