use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::ledger::{self, SubscriptionRow, SUBSCRIPTION_COLUMNS};
use crate::domain::errors::AppResult;
use crate::domain::repositories::subscription_repository::SubscriptionRepository;
use crate::domain::subscription::{Feature, Plan, SubscriptionStatus, UserSubscription};

/// PostgreSQL implementation of SubscriptionRepository
///
/// Ledger changes go through the helpers in `ledger`, each inside its own
/// transaction.
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn current(&self, user_id: Uuid) -> AppResult<(UserSubscription, Plan)> {
        let mut tx = self.pool.begin().await?;
        let current = ledger::lock_active(&mut tx, user_id).await?;
        tx.commit().await?;
        Ok(current)
    }

    async fn consume(&self, user_id: Uuid, feature: Feature) -> AppResult<i32> {
        let mut tx = self.pool.begin().await?;
        let remaining = ledger::consume_credit(&mut tx, user_id, feature).await?;
        tx.commit().await?;
        Ok(remaining)
    }

    async fn release(&self, user_id: Uuid, feature: Feature) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        ledger::release_credit(&mut tx, user_id, feature).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn lapsed(&self, now: DateTime<Utc>, limit: i64) -> AppResult<Vec<UserSubscription>> {
        let sql = format!(
            "SELECT {} FROM user_subscriptions \
             WHERE status = 'active' AND NOT is_deleted AND end_date IS NOT NULL AND end_date <= $1 \
             ORDER BY end_date LIMIT $2",
            SUBSCRIPTION_COLUMNS
        );
        let rows = sqlx::query_as::<_, SubscriptionRow>(&sql)
            .bind(now)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(UserSubscription::from).collect())
    }

    async fn expire(&self, subscription_id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "SELECT {} FROM user_subscriptions WHERE id = $1 FOR UPDATE",
            SUBSCRIPTION_COLUMNS
        );
        let sub = match sqlx::query_as::<_, SubscriptionRow>(&sql)
            .bind(subscription_id)
            .fetch_optional(&mut *tx)
            .await?
            .map(UserSubscription::from)
        {
            Some(sub) if sub.is_lapsed(now) => sub,
            // Renewed or already handled by someone else
            _ => return Ok(false),
        };

        let plan = ledger::load_plan(&mut tx, sub.plan_id).await?;
        let fallback = ledger::default_plan(&mut tx).await?;

        ledger::set_status(&mut tx, sub.id, SubscriptionStatus::Expired).await?;
        let next = UserSubscription::start(
            sub.user_id,
            &fallback,
            sub.benefit_usage.rebase(&plan.benefits, &fallback.benefits),
            now,
        );
        ledger::insert_subscription(&mut tx, &next).await?;
        ledger::set_premium(&mut tx, sub.user_id, false).await?;

        tx.commit().await?;
        Ok(true)
    }
}
