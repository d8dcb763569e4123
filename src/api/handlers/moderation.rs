use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::errors::{ApiError, ApiResult};
use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::api::middleware::{AdminUser, AuthUser};
use crate::api::state::AppState;
use crate::domain::moderation::{
    Report, ReportDraft, ReportStatus, ReportTarget, ResolveReport, Suspension,
};
use crate::domain::pagination::{Page, PageQuery};

#[derive(Debug, Deserialize)]
pub struct ReportListQuery {
    pub status: Option<ReportStatus>,
}

/// POST /api/reports
pub async fn create_report(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(draft): AppJson<ReportDraft>,
) -> ApiResult<(StatusCode, Json<Report>)> {
    let report = state.moderation.report(auth.id(), draft, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// GET /api/admin/reports?status=
pub async fn list_reports(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppQuery(page): AppQuery<PageQuery>,
    AppQuery(query): AppQuery<ReportListQuery>,
) -> ApiResult<Json<Page<Report>>> {
    Ok(Json(
        state
            .moderation_repo
            .list_reports(query.status, page.into())
            .await?,
    ))
}

/// POST /api/admin/reports/:id/resolve
pub async fn resolve_report(
    State(state): State<AppState>,
    admin: AdminUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<ResolveReport>,
) -> ApiResult<Json<Report>> {
    let report = state
        .moderation
        .resolve(admin.id(), id, req, Utc::now())
        .await?;
    Ok(Json(report))
}

/// POST /api/admin/content/:target/:id/unhide
pub async fn unhide(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppPath((target, id)): AppPath<(String, Uuid)>,
) -> ApiResult<StatusCode> {
    let target: ReportTarget = target.parse().map_err(ApiError::bad_request)?;
    state.moderation.unhide(target, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/admin/suspensions
pub async fn list_suspensions(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppQuery(page): AppQuery<PageQuery>,
) -> ApiResult<Json<Page<Suspension>>> {
    Ok(Json(
        state
            .moderation_repo
            .list_active_suspensions(Utc::now(), page.into())
            .await?,
    ))
}

/// DELETE /api/admin/suspensions/:id
pub async fn lift_suspension(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.moderation.lift_suspension(id, Utc::now()).await?;
    Ok(StatusCode::NO_CONTENT)
}
