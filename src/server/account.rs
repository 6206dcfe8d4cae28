use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};

use super::{ApiResult, AppState, CurrentUser};
use crate::models::{NewUser, PublicUser};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: PublicUser,
    pub token: String,
}

/// Self-service registration. Always creates a plain employee; elevated
/// roles are granted by an admin afterwards.
pub(super) async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<NewUser>,
) -> ApiResult<(StatusCode, Json<PublicUser>)> {
    if payload.role.take().is_some() {
        tracing::debug!(username = %payload.username, "Ignoring requested role on self-registration");
    }
    let user = state.accounts.create_account(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub(super) async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = state
        .accounts
        .login(&payload.username, &payload.password)
        .await?;
    let token = state.tokens.issue(&user.id);
    Ok(Json(LoginResponse { user, token }))
}

pub(super) async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> StatusCode {
    state.tokens.revoke(&current.token);
    tracing::info!(username = %current.user.username, "User logged out");
    StatusCode::NO_CONTENT
}

pub(super) async fn current_user(Extension(current): Extension<CurrentUser>) -> Json<PublicUser> {
    Json(current.user)
}
