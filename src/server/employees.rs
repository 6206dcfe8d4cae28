use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiResult, AppState, CurrentUser};
use crate::directory::DirectoryFilter;
use crate::models::{Department, PublicUser, Role, User};

/// Editable employee fields. `role` may only be set by an admin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<Department>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl EmployeeUpdate {
    fn apply(self, user: &mut User) -> Result<(), String> {
        if let Some(full_name) = self.full_name {
            if full_name.trim().chars().count() < 2 {
                return Err("Full name is required".to_string());
            }
            user.full_name = full_name;
        }
        if let Some(email) = self.email {
            if !email.contains('@') {
                return Err(format!("Invalid email address '{}'", email));
            }
            user.email = email;
        }
        if let Some(department) = self.department {
            user.department = department;
        }
        if let Some(title) = self.title {
            user.title = title;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        Ok(())
    }
}

async fn load_active(state: &AppState, id: &str) -> ApiResult<User> {
    match state.db.users().get_by_id(id).await? {
        Some(user) if user.is_active() => Ok(user),
        _ => Err(ApiError::NotFound("Employee")),
    }
}

pub(super) async fn list(
    State(state): State<AppState>,
    Query(filter): Query<DirectoryFilter>,
) -> ApiResult<Json<Vec<PublicUser>>> {
    let users: Vec<PublicUser> = state
        .db
        .users()
        .list_active()
        .await?
        .iter()
        .map(User::to_public)
        .collect();
    Ok(Json(filter.apply(&users)))
}

pub(super) async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PublicUser>> {
    Ok(Json(load_active(&state, &id).await?.to_public()))
}

/// Employees edit their own profile; admins edit anyone and set roles.
pub(super) async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(update): Json<EmployeeUpdate>,
) -> ApiResult<Json<PublicUser>> {
    let is_self = current.user.id == id;
    if !is_self {
        current.require_admin()?;
    }
    if let Some(role) = update.role {
        current.require_admin()?;
        if is_self && role != current.user.role {
            return Err(ApiError::Forbidden(
                "Admins cannot change their own role".to_string(),
            ));
        }
    }

    let mut user = load_active(&state, &id).await?;
    update.apply(&mut user).map_err(ApiError::BadRequest)?;

    if !state.db.users().update(&user).await? {
        return Err(ApiError::NotFound("Employee"));
    }

    tracing::info!(employee = %user.username, by = %current.user.username, "Employee updated");
    Ok(Json(user.to_public()))
}

/// Soft-deletes an employee and revokes their sessions.
pub(super) async fn deactivate(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    current.require_admin()?;
    if current.user.id == id {
        return Err(ApiError::Forbidden(
            "Admins cannot deactivate themselves".to_string(),
        ));
    }

    if !state.db.users().deactivate(&id, Utc::now()).await? {
        return Err(ApiError::NotFound("Employee"));
    }
    let revoked = state.tokens.revoke_user(&id);
    state.hub.remove(&id).await;

    tracing::info!(employee = %id, revoked, by = %current.user.username, "Employee deactivated");
    Ok(StatusCode::NO_CONTENT)
}
