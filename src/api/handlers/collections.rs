use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use uuid::Uuid;

use crate::api::errors::{ApiError, ApiResult};
use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::api::middleware::AuthUser;
use crate::api::state::AppState;
use crate::domain::notification::NotificationKind;
use crate::domain::pagination::{Page, PageQuery};
use crate::domain::social::{Collection, CollectionDraft, CollectionView, EngagementTarget};

/// Loads a collection the caller may see
pub(crate) async fn visible_collection(
    state: &AppState,
    auth: &AuthUser,
    id: Uuid,
) -> ApiResult<Collection> {
    state
        .collections
        .find_by_id(id)
        .await?
        .filter(|c| c.visible_to(auth.id(), auth.is_admin()))
        .ok_or_else(|| ApiError::not_found("Collection not found"))
}

async fn owned_collection(state: &AppState, auth: &AuthUser, id: Uuid) -> ApiResult<Collection> {
    let collection = visible_collection(state, auth, id).await?;
    if collection.user_id != auth.id() {
        return Err(ApiError::forbidden("You can only change your own collections"));
    }
    Ok(collection)
}

async fn check_outfits(state: &AppState, user_id: Uuid, ids: &[Uuid]) -> ApiResult<()> {
    if state.outfits.count_owned(user_id, ids).await? != ids.len() as i64 {
        return Err(ApiError::bad_request("Collection outfits must be your own"));
    }
    Ok(())
}

async fn view_of(state: &AppState, auth: &AuthUser, id: Uuid) -> ApiResult<CollectionView> {
    state
        .collections
        .view(id, auth.id())
        .await?
        .ok_or_else(|| ApiError::not_found("Collection not found"))
}

/// POST /api/collections
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(draft): AppJson<CollectionDraft>,
) -> ApiResult<(StatusCode, Json<CollectionView>)> {
    let draft = draft.normalize()?;
    check_outfits(&state, auth.id(), &draft.outfit_ids).await?;

    let collection = draft.into_collection(auth.id(), Utc::now());
    state.collections.create(&collection).await?;
    Ok((StatusCode::CREATED, Json(view_of(&state, &auth, collection.id).await?)))
}

/// GET /api/collections
pub async fn list_published(
    State(state): State<AppState>,
    auth: AuthUser,
    AppQuery(page): AppQuery<PageQuery>,
) -> ApiResult<Json<Page<CollectionView>>> {
    Ok(Json(
        state
            .collections
            .list_published(auth.id(), page.into())
            .await?,
    ))
}

/// GET /api/collections/mine
pub async fn list_mine(
    State(state): State<AppState>,
    auth: AuthUser,
    AppQuery(page): AppQuery<PageQuery>,
) -> ApiResult<Json<Page<CollectionView>>> {
    Ok(Json(
        state
            .collections
            .list_by_owner(auth.id(), page.into())
            .await?,
    ))
}

/// GET /api/collections/:id
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<Json<CollectionView>> {
    visible_collection(&state, &auth, id).await?;
    Ok(Json(view_of(&state, &auth, id).await?))
}

/// PUT /api/collections/:id
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(draft): AppJson<CollectionDraft>,
) -> ApiResult<Json<CollectionView>> {
    let mut collection = owned_collection(&state, &auth, id).await?;
    let draft = draft.normalize()?;
    check_outfits(&state, auth.id(), &draft.outfit_ids).await?;

    collection.title = draft.title;
    collection.description = draft.description;
    collection.outfit_ids = draft.outfit_ids;
    collection.updated_at = Utc::now();
    state.collections.update(&collection).await?;

    Ok(Json(view_of(&state, &auth, id).await?))
}

/// DELETE /api/collections/:id
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<StatusCode> {
    let collection = visible_collection(&state, &auth, id).await?;
    if collection.user_id != auth.id() && !auth.is_admin() {
        return Err(ApiError::forbidden("You can only delete your own collections"));
    }
    state.collections.delete(&collection).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/collections/:id/publish
pub async fn publish(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<Json<CollectionView>> {
    let mut collection = owned_collection(&state, &auth, id).await?;
    collection.publish(Utc::now());
    state.collections.update(&collection).await?;
    Ok(Json(view_of(&state, &auth, id).await?))
}

/// POST /api/collections/:id/unpublish
pub async fn unpublish(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<Json<CollectionView>> {
    let mut collection = owned_collection(&state, &auth, id).await?;
    collection.unpublish(Utc::now());
    state.collections.update(&collection).await?;
    Ok(Json(view_of(&state, &auth, id).await?))
}

/// POST /api/collections/:id/like
pub async fn like(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<StatusCode> {
    let collection = visible_collection(&state, &auth, id).await?;
    let created = state
        .engagement
        .like(auth.id(), EngagementTarget::Collection, id)
        .await?;
    if created && collection.user_id != auth.id() {
        state
            .notifications
            .notify_quietly(
                collection.user_id,
                NotificationKind::Like,
                "New like",
                format!("{} liked your collection \"{}\"", auth.0.display_name, collection.title),
                Some(collection.id),
            )
            .await;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/collections/:id/like
pub async fn unlike(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .engagement
        .unlike(auth.id(), EngagementTarget::Collection, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/collections/:id/save
pub async fn save(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<StatusCode> {
    visible_collection(&state, &auth, id).await?;
    state
        .engagement
        .save(auth.id(), EngagementTarget::Collection, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/collections/:id/save
pub async fn unsave(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .engagement
        .unsave(auth.id(), EngagementTarget::Collection, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
