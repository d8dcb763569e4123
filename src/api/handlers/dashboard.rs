use axum::{extract::State, Json};
use chrono::{Datelike, Utc};
use serde::Deserialize;

use crate::api::errors::{ApiError, ApiResult};
use crate::api::extract::AppQuery;
use crate::api::middleware::AdminUser;
use crate::api::state::AppState;
use crate::domain::dashboard::{
    fill_months, top_posts_limit, MonthlyRevenue, Overview, PlanShare, TopPost,
};

#[derive(Debug, Deserialize)]
pub struct RevenueQuery {
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct TopPostsQuery {
    pub limit: Option<i64>,
}

/// GET /api/admin/dashboard/overview
pub async fn overview(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<Overview>> {
    Ok(Json(state.dashboard.overview(Utc::now()).await?))
}

/// GET /api/admin/dashboard/revenue?year=
pub async fn revenue(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppQuery(query): AppQuery<RevenueQuery>,
) -> ApiResult<Json<Vec<MonthlyRevenue>>> {
    let year = query.year.unwrap_or_else(|| Utc::now().year());
    if !(2000..=9999).contains(&year) {
        return Err(ApiError::bad_request("Year is out of range"));
    }
    let rows = state.dashboard.revenue_by_month(year).await?;
    Ok(Json(fill_months(rows)))
}

/// GET /api/admin/dashboard/plans
pub async fn plans(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<PlanShare>>> {
    Ok(Json(state.dashboard.plan_distribution().await?))
}

/// GET /api/admin/dashboard/top-posts?limit=
pub async fn top_posts(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppQuery(query): AppQuery<TopPostsQuery>,
) -> ApiResult<Json<Vec<TopPost>>> {
    let limit = top_posts_limit(query.limit);
    Ok(Json(state.dashboard.top_posts(limit).await?))
}
