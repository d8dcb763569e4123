// Subscription ledger helpers shared by every adapter that spends or
// returns credits. All of them run on a connection that is inside an open
// transaction; the active subscription row stays locked until it commits.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::domain::errors::{AppError, AppResult};
use crate::domain::subscription::{
    Activation, BenefitLedger, BenefitLimit, Feature, Plan, SubscriptionStatus, UserSubscription,
};

pub(crate) const PLAN_COLUMNS: &str = "id, name, description, price, duration_days, benefits, \
     is_default, is_active, created_at, updated_at";

pub(crate) const SUBSCRIPTION_COLUMNS: &str =
    "id, user_id, plan_id, status, start_date, end_date, benefit_usage";

#[derive(sqlx::FromRow)]
pub(crate) struct PlanRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    price: Decimal,
    duration_days: i32,
    benefits: Json<Vec<BenefitLimit>>,
    is_default: bool,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PlanRow> for Plan {
    fn from(r: PlanRow) -> Self {
        Plan {
            id: r.id,
            name: r.name,
            description: r.description,
            price: r.price,
            duration_days: r.duration_days,
            benefits: r.benefits.0,
            is_default: r.is_default,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct SubscriptionRow {
    id: Uuid,
    user_id: Uuid,
    plan_id: Uuid,
    status: SubscriptionStatus,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    benefit_usage: Json<BenefitLedger>,
}

impl From<SubscriptionRow> for UserSubscription {
    fn from(r: SubscriptionRow) -> Self {
        UserSubscription {
            id: r.id,
            user_id: r.user_id,
            plan_id: r.plan_id,
            status: r.status,
            start_date: r.start_date,
            end_date: r.end_date,
            benefit_usage: r.benefit_usage.0,
        }
    }
}

/// Plan by id, including soft-deleted plans that subscriptions still point at
pub(crate) async fn load_plan(conn: &mut PgConnection, id: Uuid) -> AppResult<Plan> {
    let sql = format!("SELECT {} FROM plans WHERE id = $1", PLAN_COLUMNS);
    sqlx::query_as::<_, PlanRow>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .map(Plan::from)
        .ok_or_else(|| AppError::not_found("Plan not found"))
}

pub(crate) async fn default_plan(conn: &mut PgConnection) -> AppResult<Plan> {
    let sql = format!(
        "SELECT {} FROM plans WHERE is_default AND NOT is_deleted LIMIT 1",
        PLAN_COLUMNS
    );
    sqlx::query_as::<_, PlanRow>(&sql)
        .fetch_optional(&mut *conn)
        .await?
        .map(Plan::from)
        .ok_or_else(|| AppError::internal("No default plan configured"))
}

async fn select_active_for_update(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> AppResult<Option<UserSubscription>> {
    let sql = format!(
        "SELECT {} FROM user_subscriptions \
         WHERE user_id = $1 AND status = 'active' AND NOT is_deleted FOR UPDATE",
        SUBSCRIPTION_COLUMNS
    );
    Ok(sqlx::query_as::<_, SubscriptionRow>(&sql)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?
        .map(UserSubscription::from))
}

pub(crate) async fn insert_subscription(
    conn: &mut PgConnection,
    sub: &UserSubscription,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO user_subscriptions (
            id, user_id, plan_id, status, start_date, end_date, benefit_usage
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (user_id) WHERE status = 'active' DO NOTHING
        "#,
    )
    .bind(sub.id)
    .bind(sub.user_id)
    .bind(sub.plan_id)
    .bind(sub.status)
    .bind(sub.start_date)
    .bind(sub.end_date)
    .bind(Json(sub.benefit_usage.clone()))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Locks the user's active subscription, putting them on the default plan
/// first when they have none
pub(crate) async fn lock_active(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> AppResult<(UserSubscription, Plan)> {
    if let Some(sub) = select_active_for_update(conn, user_id).await? {
        let plan = load_plan(conn, sub.plan_id).await?;
        return Ok((sub, plan));
    }

    let plan = default_plan(conn).await?;
    let sub = UserSubscription::start(
        user_id,
        &plan,
        BenefitLedger::from_limits(&plan.benefits),
        Utc::now(),
    );
    insert_subscription(conn, &sub).await?;
    tracing::debug!(%user_id, plan = %plan.name, "provisioned default subscription");

    // A concurrent request may have provisioned first; take whichever row won
    let sub = select_active_for_update(conn, user_id)
        .await?
        .ok_or_else(|| AppError::internal("Active subscription vanished during provisioning"))?;
    Ok((sub, plan))
}

pub(crate) async fn save_ledger(
    conn: &mut PgConnection,
    subscription_id: Uuid,
    ledger: &BenefitLedger,
) -> AppResult<()> {
    sqlx::query(
        "UPDATE user_subscriptions SET benefit_usage = $2, updated_at = NOW() WHERE id = $1",
    )
    .bind(subscription_id)
    .bind(Json(ledger.clone()))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Spends one credit of `feature`, returning what remains
pub(crate) async fn consume_credit(
    conn: &mut PgConnection,
    user_id: Uuid,
    feature: Feature,
) -> AppResult<i32> {
    let (mut sub, _) = lock_active(conn, user_id).await?;
    let remaining = sub.benefit_usage.consume(feature)?;
    save_ledger(conn, sub.id, &sub.benefit_usage).await?;
    tracing::debug!(%user_id, %feature, remaining, "credit consumed");
    Ok(remaining)
}

/// Returns one persistent credit of `feature`; a no-op at the plan limit
pub(crate) async fn release_credit(
    conn: &mut PgConnection,
    user_id: Uuid,
    feature: Feature,
) -> AppResult<()> {
    let (mut sub, plan) = lock_active(conn, user_id).await?;
    if let Some(credit) = sub.benefit_usage.release(feature, &plan.benefits) {
        save_ledger(conn, sub.id, &sub.benefit_usage).await?;
        tracing::debug!(%user_id, %feature, credit, "credit released");
    }
    Ok(())
}

pub(crate) async fn set_status(
    conn: &mut PgConnection,
    subscription_id: Uuid,
    status: SubscriptionStatus,
) -> AppResult<()> {
    sqlx::query("UPDATE user_subscriptions SET status = $2, updated_at = NOW() WHERE id = $1")
        .bind(subscription_id)
        .bind(status)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub(crate) async fn apply_activation(
    conn: &mut PgConnection,
    activation: &Activation,
) -> AppResult<()> {
    match activation {
        Activation::Extend {
            subscription_id,
            end_date,
        } => {
            sqlx::query(
                "UPDATE user_subscriptions SET end_date = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(*subscription_id)
            .bind(*end_date)
            .execute(&mut *conn)
            .await?;
        }
        Activation::Replace { close, open } => {
            if let Some(id) = close {
                set_status(conn, *id, SubscriptionStatus::Cancelled).await?;
            }
            insert_subscription(conn, open).await?;
        }
    }
    Ok(())
}

pub(crate) async fn set_premium(
    conn: &mut PgConnection,
    user_id: Uuid,
    is_premium: bool,
) -> AppResult<()> {
    sqlx::query("UPDATE users SET is_premium = $2, updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .bind(is_premium)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
