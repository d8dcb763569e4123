use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use uuid::Uuid;

use crate::api::errors::{ApiError, ApiResult};
use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::api::middleware::AuthUser;
use crate::api::state::AppState;
use crate::domain::pagination::{Page, PageQuery};
use crate::domain::wardrobe::{Item, ItemDraft, ItemFilter, TaxonomyKind};

/// Checks that every referenced taxonomy entry exists
async fn check_references(state: &AppState, draft: &ItemDraft) -> ApiResult<()> {
    let checks = [
        (TaxonomyKind::Category, std::slice::from_ref(&draft.category_id)),
        (TaxonomyKind::Occasion, draft.occasion_ids.as_slice()),
        (TaxonomyKind::Style, draft.style_ids.as_slice()),
    ];
    for (kind, ids) in checks {
        if ids.is_empty() {
            continue;
        }
        if state.taxonomy.count_existing(kind, ids).await? != ids.len() as i64 {
            return Err(ApiError::bad_request(format!("Unknown {}", kind.label().to_lowercase())));
        }
    }
    Ok(())
}

/// POST /api/items
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(draft): AppJson<ItemDraft>,
) -> ApiResult<(StatusCode, Json<Item>)> {
    let draft = draft.normalize()?;
    check_references(&state, &draft).await?;

    let item = draft.into_item(auth.id(), Utc::now());
    state.items.create(&item).await?;
    tracing::debug!(item_id = %item.id, user_id = %auth.id(), "item created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /api/items
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    AppQuery(page): AppQuery<PageQuery>,
    AppQuery(filter): AppQuery<ItemFilter>,
) -> ApiResult<Json<Page<Item>>> {
    Ok(Json(state.items.list(auth.id(), &filter, page.into()).await?))
}

/// GET /api/items/:id
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<Json<Item>> {
    let item = state
        .items
        .find_by_id(auth.id(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Item not found"))?;
    Ok(Json(item))
}

/// PUT /api/items/:id
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(draft): AppJson<ItemDraft>,
) -> ApiResult<Json<Item>> {
    let mut item = state
        .items
        .find_by_id(auth.id(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Item not found"))?;
    let draft = draft.normalize()?;
    check_references(&state, &draft).await?;

    item.name = draft.name;
    item.category_id = draft.category_id;
    item.color = draft.color;
    item.brand = draft.brand;
    item.material = draft.material;
    item.image_url = draft.image_url;
    item.seasons = draft.seasons;
    item.occasion_ids = draft.occasion_ids;
    item.style_ids = draft.style_ids;
    item.is_favorite = draft.is_favorite.unwrap_or(item.is_favorite);
    item.updated_at = Utc::now();

    state.items.update(&item).await?;
    Ok(Json(item))
}

/// DELETE /api/items/:id
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.items.delete(auth.id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
