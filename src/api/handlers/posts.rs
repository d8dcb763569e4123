use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use uuid::Uuid;

use crate::api::errors::{ApiError, ApiResult};
use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::api::middleware::AuthUser;
use crate::api::state::AppState;
use crate::domain::notification::NotificationKind;
use crate::domain::pagination::{Page, PageQuery};
use crate::domain::social::{extract_hashtags, normalize_hashtag, EngagementTarget, Post, PostDraft, PostView};

/// Loads a post the caller may see: live, and not hidden unless the caller is an admin
pub(crate) async fn visible_post(state: &AppState, auth: &AuthUser, id: Uuid) -> ApiResult<Post> {
    state
        .posts
        .find_by_id(id)
        .await?
        .filter(|p| !p.is_hidden || auth.is_admin())
        .ok_or_else(|| ApiError::not_found("Post not found"))
}

async fn check_outfit(state: &AppState, user_id: Uuid, outfit_id: Option<Uuid>) -> ApiResult<()> {
    if let Some(outfit_id) = outfit_id {
        if state.outfits.find_by_id(user_id, outfit_id).await?.is_none() {
            return Err(ApiError::bad_request("Outfit must be one of your own"));
        }
    }
    Ok(())
}

async fn view_of(state: &AppState, auth: &AuthUser, id: Uuid) -> ApiResult<PostView> {
    state
        .posts
        .view(id, auth.id())
        .await?
        .filter(|v| !v.post.is_hidden || auth.is_admin())
        .ok_or_else(|| ApiError::not_found("Post not found"))
}

/// POST /api/posts
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(draft): AppJson<PostDraft>,
) -> ApiResult<(StatusCode, Json<PostView>)> {
    let draft = draft.normalize()?;
    check_outfit(&state, auth.id(), draft.outfit_id).await?;

    let post = draft.into_post(auth.id(), Utc::now());
    state.posts.create(&post).await?;
    tracing::debug!(post_id = %post.id, hashtags = post.hashtags.len(), "post created");

    Ok((StatusCode::CREATED, Json(view_of(&state, &auth, post.id).await?)))
}

/// GET /api/posts/feed
pub async fn feed(
    State(state): State<AppState>,
    auth: AuthUser,
    AppQuery(page): AppQuery<PageQuery>,
) -> ApiResult<Json<Page<PostView>>> {
    Ok(Json(state.posts.feed(auth.id(), page.into()).await?))
}

/// GET /api/users/:id/posts
pub async fn by_author(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(author): AppPath<Uuid>,
    AppQuery(page): AppQuery<PageQuery>,
) -> ApiResult<Json<Page<PostView>>> {
    Ok(Json(
        state
            .posts
            .list_by_author(author, auth.id(), page.into())
            .await?,
    ))
}

/// GET /api/posts/hashtag/:tag
pub async fn by_hashtag(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(tag): AppPath<String>,
    AppQuery(page): AppQuery<PageQuery>,
) -> ApiResult<Json<Page<PostView>>> {
    let tag = normalize_hashtag(&tag).ok_or_else(|| ApiError::bad_request("Invalid hashtag"))?;
    Ok(Json(
        state
            .posts
            .list_by_hashtag(&tag, auth.id(), page.into())
            .await?,
    ))
}

/// GET /api/posts/saved
pub async fn saved(
    State(state): State<AppState>,
    auth: AuthUser,
    AppQuery(page): AppQuery<PageQuery>,
) -> ApiResult<Json<Page<PostView>>> {
    Ok(Json(state.posts.list_saved(auth.id(), page.into()).await?))
}

/// GET /api/posts/:id
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<Json<PostView>> {
    Ok(Json(view_of(&state, &auth, id).await?))
}

/// PUT /api/posts/:id
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(draft): AppJson<PostDraft>,
) -> ApiResult<Json<PostView>> {
    let mut post = visible_post(&state, &auth, id).await?;
    if post.user_id != auth.id() {
        return Err(ApiError::forbidden("You can only edit your own posts"));
    }
    let draft = draft.normalize()?;
    check_outfit(&state, auth.id(), draft.outfit_id).await?;

    post.hashtags = extract_hashtags(&draft.body);
    post.body = draft.body;
    post.image_urls = draft.image_urls;
    post.outfit_id = draft.outfit_id;
    post.updated_at = Utc::now();
    state.posts.update(&post).await?;

    Ok(Json(view_of(&state, &auth, id).await?))
}

/// DELETE /api/posts/:id
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<StatusCode> {
    let post = visible_post(&state, &auth, id).await?;
    if post.user_id != auth.id() && !auth.is_admin() {
        return Err(ApiError::forbidden("You can only delete your own posts"));
    }
    state.posts.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/posts/:id/like
pub async fn like(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<StatusCode> {
    let post = visible_post(&state, &auth, id).await?;
    let created = state
        .engagement
        .like(auth.id(), EngagementTarget::Post, id)
        .await?;
    if created && post.user_id != auth.id() {
        state
            .notifications
            .notify_quietly(
                post.user_id,
                NotificationKind::Like,
                "New like",
                format!("{} liked your post", auth.0.display_name),
                Some(post.id),
            )
            .await;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/posts/:id/like
pub async fn unlike(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .engagement
        .unlike(auth.id(), EngagementTarget::Post, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/posts/:id/save
pub async fn save(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<StatusCode> {
    visible_post(&state, &auth, id).await?;
    state
        .engagement
        .save(auth.id(), EngagementTarget::Post, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/posts/:id/save
pub async fn unsave(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .engagement
        .unsave(auth.id(), EngagementTarget::Post, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
