use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::{ApiError, ApiResult};
use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::api::middleware::{AdminUser, AuthUser};
use crate::api::state::AppState;
use crate::domain::pagination::{Page, PageQuery};
use crate::domain::subscription::{BenefitLimit, Payment, Plan, PlanDraft};
use crate::services::SubscriptionOverview;

pub const SIGNATURE_HEADER: &str = "x-signature";

/// Plan as listed to clients
#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub duration_days: i32,
    pub benefits: Vec<BenefitLimit>,
    pub is_default: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Plan> for PlanResponse {
    fn from(plan: Plan) -> Self {
        Self {
            id: plan.id,
            name: plan.name,
            description: plan.description,
            price: plan.price,
            duration_days: plan.duration_days,
            benefits: plan.benefits,
            is_default: plan.is_default,
            is_active: plan.is_active,
            created_at: plan.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    pub plan_id: Uuid,
}

/// GET /api/plans
pub async fn list_plans(State(state): State<AppState>) -> ApiResult<Json<Vec<PlanResponse>>> {
    let plans = state.plans.list_active().await?;
    Ok(Json(plans.into_iter().map(PlanResponse::from).collect()))
}

/// GET /api/subscriptions/me
pub async fn my_subscription(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<SubscriptionOverview>> {
    Ok(Json(state.subscriptions.my_subscription(auth.id()).await?))
}

/// POST /api/subscriptions/purchase
pub async fn purchase(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(req): AppJson<PurchaseRequest>,
) -> ApiResult<(StatusCode, Json<Payment>)> {
    let payment = state
        .subscriptions
        .purchase(auth.id(), req.plan_id, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// GET /api/payments
pub async fn list_payments(
    State(state): State<AppState>,
    auth: AuthUser,
    AppQuery(page): AppQuery<PageQuery>,
) -> ApiResult<Json<Page<Payment>>> {
    Ok(Json(
        state.payments.list_for_user(auth.id(), page.into()).await?,
    ))
}

/// POST /api/payments/:id/cancel
pub async fn cancel_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<Json<Payment>> {
    Ok(Json(state.subscriptions.cancel_payment(auth.id(), id).await?))
}

/// POST /api/payments/webhook
///
/// Takes the raw body; the signature covers the exact bytes sent.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    state
        .subscriptions
        .handle_webhook(&body, signature, Utc::now())
        .await?;
    Ok(StatusCode::OK)
}

/// POST /api/admin/plans
pub async fn create_plan(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppJson(draft): AppJson<PlanDraft>,
) -> ApiResult<(StatusCode, Json<PlanResponse>)> {
    draft.validate()?;
    let plan = draft.into_plan(Utc::now());
    state.plans.create(&plan).await?;
    tracing::info!(plan_id = %plan.id, name = %plan.name, "plan created");
    Ok((StatusCode::CREATED, Json(PlanResponse::from(plan))))
}

/// PUT /api/admin/plans/:id
pub async fn update_plan(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(draft): AppJson<PlanDraft>,
) -> ApiResult<Json<PlanResponse>> {
    let current = state
        .plans
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Plan not found"))?;
    draft.validate()?;
    if current.is_default && (draft.price != Decimal::ZERO || !draft.is_active) {
        return Err(ApiError::bad_request(
            "The default plan must stay free and active",
        ));
    }

    let plan = Plan {
        id: current.id,
        is_default: current.is_default,
        created_at: current.created_at,
        ..draft.into_plan(Utc::now())
    };
    state.plans.update(&plan).await?;
    Ok(Json(PlanResponse::from(plan)))
}

/// DELETE /api/admin/plans/:id
pub async fn delete_plan(
    State(state): State<AppState>,
    _admin: AdminUser,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.plans.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
