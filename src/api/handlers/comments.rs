use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use uuid::Uuid;

use crate::api::errors::{ApiError, ApiResult};
use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::api::handlers::collections::visible_collection;
use crate::api::handlers::posts::visible_post;
use crate::api::middleware::AuthUser;
use crate::api::state::AppState;
use crate::domain::notification::NotificationKind;
use crate::domain::pagination::{Page, PageQuery};
use crate::domain::social::{Comment, CommentDraft, CommentView, EngagementTarget};

/// Owner of the commented content, after checking the caller can see it
async fn target_owner(
    state: &AppState,
    auth: &AuthUser,
    target: EngagementTarget,
    id: Uuid,
) -> ApiResult<Uuid> {
    Ok(match target {
        EngagementTarget::Post => visible_post(state, auth, id).await?.user_id,
        EngagementTarget::Collection => visible_collection(state, auth, id).await?.user_id,
    })
}

async fn list_for(
    state: AppState,
    auth: AuthUser,
    target: EngagementTarget,
    id: Uuid,
    page: PageQuery,
) -> ApiResult<Json<Page<CommentView>>> {
    target_owner(&state, &auth, target, id).await?;
    Ok(Json(state.comments.list(target, id, page.into()).await?))
}

async fn create_for(
    state: AppState,
    auth: AuthUser,
    target: EngagementTarget,
    id: Uuid,
    draft: CommentDraft,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let owner = target_owner(&state, &auth, target, id).await?;
    let draft = draft.normalize()?;

    let parent = match draft.parent_id {
        Some(parent_id) => Some(
            state
                .comments
                .find_by_id(parent_id)
                .await?
                .ok_or_else(|| ApiError::not_found("Parent comment not found"))?,
        ),
        None => None,
    };
    let comment = draft.into_comment(auth.id(), target, id, parent.as_ref(), Utc::now())?;
    state.comments.create(&comment).await?;

    if owner != auth.id() {
        state
            .notifications
            .notify_quietly(
                owner,
                NotificationKind::Comment,
                "New comment",
                format!("{} commented on your {}", auth.0.display_name, target),
                Some(id),
            )
            .await;
    }
    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /api/posts/:id/comments
pub async fn list_post_comments(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppQuery(page): AppQuery<PageQuery>,
) -> ApiResult<Json<Page<CommentView>>> {
    list_for(state, auth, EngagementTarget::Post, id, page).await
}

/// POST /api/posts/:id/comments
pub async fn create_post_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(draft): AppJson<CommentDraft>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    create_for(state, auth, EngagementTarget::Post, id, draft).await
}

/// GET /api/collections/:id/comments
pub async fn list_collection_comments(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppQuery(page): AppQuery<PageQuery>,
) -> ApiResult<Json<Page<CommentView>>> {
    list_for(state, auth, EngagementTarget::Collection, id, page).await
}

/// POST /api/collections/:id/comments
pub async fn create_collection_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(draft): AppJson<CommentDraft>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    create_for(state, auth, EngagementTarget::Collection, id, draft).await
}

/// DELETE /api/comments/:id
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<StatusCode> {
    let comment = state
        .comments
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;
    if comment.user_id != auth.id() && !auth.is_admin() {
        return Err(ApiError::forbidden("You can only delete your own comments"));
    }
    state.comments.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
