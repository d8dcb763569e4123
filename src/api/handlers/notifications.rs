use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::{ApiError, ApiResult};
use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::api::middleware::{AdminUser, AuthUser};
use crate::api::state::AppState;
use crate::domain::notification::{BroadcastDraft, DevicePlatform, Notification};
use crate::domain::pagination::{Page, PageQuery};

const MAX_DEVICE_TOKEN_LEN: usize = 512;

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub unread: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub marked: u64,
}

#[derive(Debug, Deserialize)]
pub struct DeviceRequest {
    pub token: String,
    pub platform: DevicePlatform,
}

/// GET /api/notifications
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    AppQuery(page): AppQuery<PageQuery>,
) -> ApiResult<Json<Page<Notification>>> {
    Ok(Json(
        state
            .notification_repo
            .list_for_user(auth.id(), page.into())
            .await?,
    ))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<UnreadCount>> {
    let unread = state.notification_repo.unread_count(auth.id()).await?;
    Ok(Json(UnreadCount { unread }))
}

/// POST /api/notifications/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.notification_repo.mark_read(auth.id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<MarkedRead>> {
    let marked = state.notification_repo.mark_all_read(auth.id()).await?;
    Ok(Json(MarkedRead { marked }))
}

/// POST /api/devices
pub async fn register_device(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(req): AppJson<DeviceRequest>,
) -> ApiResult<StatusCode> {
    let token = req.token.trim();
    if token.is_empty() || token.len() > MAX_DEVICE_TOKEN_LEN {
        return Err(ApiError::bad_request("Invalid device token"));
    }
    state
        .notification_repo
        .upsert_device(auth.id(), token, req.platform)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/devices/:token
pub async fn remove_device(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(token): AppPath<String>,
) -> ApiResult<StatusCode> {
    state
        .notification_repo
        .remove_device(auth.id(), &token)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/admin/notifications
pub async fn broadcast(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppJson(draft): AppJson<BroadcastDraft>,
) -> ApiResult<(StatusCode, Json<Notification>)> {
    let notification = state.notifications.broadcast(draft).await?;
    Ok((StatusCode::CREATED, Json(notification)))
}
