//! Auth routes.
//!
//! Registration, login, and logout. A successful register or login writes
//! the user into the session; logout flushes the whole session.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::error::Result;
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::AccountService;
use crate::state::AppState;

use super::account::UserView;

/// Request to create an account.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

/// Request to login with an email-or-phone identifier.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

/// Response after register or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserView,
}

/// Create an account and log the new user in.
///
/// POST /auth/register
///
/// # Errors
///
/// Returns 400 for invalid fields, 409 for a taken email or phone.
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>> {
    let accounts = AccountService::new(state.pool());
    let user = accounts
        .register(&req.name, &req.email, &req.phone, &req.password)
        .await?;

    start_session(&session, &user).await?;
    Ok(Json(AuthResponse {
        user: UserView::from(user),
    }))
}

/// Login by email or phone.
///
/// POST /auth/login
///
/// # Errors
///
/// Returns 401 on any credential mismatch, without saying which part was
/// wrong.
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let accounts = AccountService::new(state.pool());
    let user = accounts
        .login(&req.identifier, &req.password)
        .await?
        .ok_or(crate::error::AppError::Unauthorized)?;

    start_session(&session, &user).await?;
    Ok(Json(AuthResponse {
        user: UserView::from(user),
    }))
}

/// Logout the current user.
///
/// POST /auth/logout
///
/// Succeeds whether or not anyone was logged in.
///
/// # Errors
///
/// Returns 500 if the session store fails.
#[tracing::instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Json<serde_json::Value>> {
    clear_current_user(&session).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// Rotate the session and store the user's identity.
async fn start_session(session: &Session, user: &User) -> Result<()> {
    // Fresh session ID on privilege change.
    session.cycle_id().await?;
    set_current_user(
        session,
        &CurrentUser {
            id: user.id,
            name: user.name.clone(),
        },
    )
    .await?;
    Ok(())
}
