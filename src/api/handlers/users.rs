use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::{ApiError, ApiResult};
use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::api::middleware::{AdminUser, AuthUser};
use crate::api::state::AppState;
use crate::domain::notification::NotificationKind;
use crate::domain::pagination::{Page, PageQuery};
use crate::domain::repositories::{ProfileUpdate, PublicProfile, User, UserSummary};
use crate::domain::user::Role;
use crate::domain::wardrobe::TaxonomyKind;

/// Account as shown to its owner and to admins
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub is_premium: bool,
    pub job_id: Option<Uuid>,
    pub style_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.as_str().to_string(),
            display_name: user.display_name.clone(),
            bio: user.bio.clone(),
            avatar_url: user.avatar_url.clone(),
            role: user.role,
            is_premium: user.is_premium,
            job_id: user.job_id,
            style_ids: user.style_ids.clone(),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    pub search: Option<String>,
}

/// PUT /api/users/me
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(update): AppJson<ProfileUpdate>,
) -> ApiResult<Json<UserResponse>> {
    let update = update.normalize()?;
    if let Some(job_id) = update.job_id {
        if state.taxonomy.count_existing(TaxonomyKind::Job, &[job_id]).await? != 1 {
            return Err(ApiError::bad_request("Unknown job"));
        }
    }
    if !update.style_ids.is_empty()
        && state
            .taxonomy
            .count_existing(TaxonomyKind::Style, &update.style_ids)
            .await?
            != update.style_ids.len() as i64
    {
        return Err(ApiError::bad_request("Unknown style"));
    }

    let user = state.users.update_profile(auth.id(), &update).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// GET /api/users/:id
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<Json<PublicProfile>> {
    let profile = state
        .users
        .public_profile(id, auth.id())
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(profile))
}

/// POST /api/users/:id/follow
pub async fn follow(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<StatusCode> {
    if id == auth.id() {
        return Err(ApiError::bad_request("You cannot follow yourself"));
    }
    if state.users.find_by_id(id).await?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    if state.follows.follow(auth.id(), id).await? {
        state
            .notifications
            .notify_quietly(
                id,
                NotificationKind::Follow,
                "New follower",
                format!("{} started following you", auth.0.display_name),
                Some(auth.id()),
            )
            .await;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/users/:id/follow
pub async fn unfollow(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.follows.unfollow(auth.id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/users/:id/followers
pub async fn followers(
    State(state): State<AppState>,
    _auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppQuery(page): AppQuery<PageQuery>,
) -> ApiResult<Json<Page<UserSummary>>> {
    Ok(Json(state.follows.followers(id, page.into()).await?))
}

/// GET /api/users/:id/following
pub async fn following(
    State(state): State<AppState>,
    _auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppQuery(page): AppQuery<PageQuery>,
) -> ApiResult<Json<Page<UserSummary>>> {
    Ok(Json(state.follows.following(id, page.into()).await?))
}

/// GET /api/admin/users?search=
pub async fn admin_list(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppQuery(page): AppQuery<PageQuery>,
    AppQuery(query): AppQuery<UserSearchQuery>,
) -> ApiResult<Json<Page<UserResponse>>> {
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let users = state.users.search(search, page.into()).await?;
    Ok(Json(users.map(|u| UserResponse::from(&u))))
}
