use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::{ApiError, ApiResult};
use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::api::middleware::AuthUser;
use crate::api::state::AppState;
use crate::domain::pagination::{Page, PageQuery};
use crate::domain::subscription::Feature;
use crate::domain::wardrobe::{suggest_outfit, Item, Outfit, OutfitDraft, SuggestionRequest};

#[derive(Debug, Deserialize)]
pub struct OutfitListQuery {
    pub is_favorite: Option<bool>,
}

/// Outfit with its items resolved
#[derive(Debug, Serialize)]
pub struct OutfitDetail {
    #[serde(flatten)]
    pub outfit: Outfit,
    pub items: Vec<Item>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    pub items: Vec<Item>,
    pub remaining_credits: i32,
}

async fn owned_items(state: &AppState, user_id: Uuid, ids: &[Uuid]) -> ApiResult<Vec<Item>> {
    let items = state.items.find_many(user_id, ids).await?;
    if items.len() != ids.len() {
        return Err(ApiError::bad_request("Outfit items must be items in your wardrobe"));
    }
    Ok(items)
}

/// POST /api/outfits
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(draft): AppJson<OutfitDraft>,
) -> ApiResult<(StatusCode, Json<OutfitDetail>)> {
    let draft = draft.normalize()?;
    let items = owned_items(&state, auth.id(), &draft.item_ids).await?;

    let outfit = draft.into_outfit(auth.id(), Utc::now());
    state.outfits.create(&outfit).await?;
    Ok((StatusCode::CREATED, Json(OutfitDetail { outfit, items })))
}

/// GET /api/outfits
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    AppQuery(page): AppQuery<PageQuery>,
    AppQuery(query): AppQuery<OutfitListQuery>,
) -> ApiResult<Json<Page<Outfit>>> {
    Ok(Json(
        state
            .outfits
            .list(auth.id(), query.is_favorite, page.into())
            .await?,
    ))
}

/// GET /api/outfits/:id
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<Json<OutfitDetail>> {
    let outfit = state
        .outfits
        .find_by_id(auth.id(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Outfit not found"))?;
    let items = state.items.find_many(auth.id(), &outfit.item_ids).await?;
    Ok(Json(OutfitDetail { outfit, items }))
}

/// PUT /api/outfits/:id
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(draft): AppJson<OutfitDraft>,
) -> ApiResult<Json<OutfitDetail>> {
    let mut outfit = state
        .outfits
        .find_by_id(auth.id(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Outfit not found"))?;
    let draft = draft.normalize()?;
    let items = owned_items(&state, auth.id(), &draft.item_ids).await?;

    outfit.name = draft.name;
    outfit.description = draft.description;
    outfit.item_ids = draft.item_ids;
    outfit.is_favorite = draft.is_favorite.unwrap_or(outfit.is_favorite);
    outfit.updated_at = Utc::now();

    state.outfits.update(&outfit).await?;
    Ok(Json(OutfitDetail { outfit, items }))
}

/// DELETE /api/outfits/:id
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.outfits.delete(auth.id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/outfits/suggestions
///
/// Spends one AI suggestion credit, but only when there is something to suggest.
pub async fn suggest(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(request): AppJson<SuggestionRequest>,
) -> ApiResult<Json<SuggestionResponse>> {
    let wardrobe = state.items.list_all(auth.id()).await?;
    let items = suggest_outfit(&wardrobe, request, &auth.0.style_ids);
    if items.is_empty() {
        return Err(ApiError::bad_request(
            "No items in your wardrobe match this request",
        ));
    }

    let remaining_credits = state
        .subscription_repo
        .consume(auth.id(), Feature::AiSuggestions)
        .await?;
    Ok(Json(SuggestionResponse {
        items,
        remaining_credits,
    }))
}
