use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;

use super::{ApiError, ApiResult, AppState, CurrentUser};
use crate::notifications::NotificationSnapshot;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct MarkedRead {
    updated: usize,
}

/// Parses a notification id from the path into a JSON-bodied error on failure.
fn parse_id(raw: &str) -> ApiResult<u64> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid notification id '{}'", raw)))
}

pub(super) async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Json<NotificationSnapshot> {
    Json(state.hub.snapshot(&current.user.id).await)
}

/// Marks one notification read. Unknown ids are still a success.
pub(super) async fn read(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<NotificationSnapshot>> {
    let id = parse_id(&id)?;
    let snapshot = state
        .hub
        .with_registry(&current.user.id, |registry| {
            registry.mark_as_read(id);
            registry.snapshot()
        })
        .await;
    Ok(Json(snapshot))
}

pub(super) async fn read_all(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Json<MarkedRead> {
    let updated = state
        .hub
        .with_registry(&current.user.id, |registry| registry.mark_all_as_read())
        .await;
    Json(MarkedRead { updated })
}

pub(super) async fn clear(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    state
        .hub
        .with_registry(&current.user.id, |registry| registry.clear_notification(id))
        .await;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn clear_all(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> StatusCode {
    state
        .hub
        .with_registry(&current.user.id, |registry| registry.clear_all_notifications())
        .await;
    StatusCode::NO_CONTENT
}
