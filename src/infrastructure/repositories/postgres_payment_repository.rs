use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::ledger;
use crate::domain::errors::{AppError, AppResult};
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::repositories::payment_repository::PaymentRepository;
use crate::domain::subscription::{plan_activation, Payment, PaymentStatus, SettlementOutcome};

const PAYMENT_COLUMNS: &str = "id, user_id, plan_id, order_code, amount, status, checkout_url, \
     expires_at, paid_at, created_at";

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    user_id: Uuid,
    plan_id: Uuid,
    order_code: i64,
    amount: Decimal,
    status: PaymentStatus,
    checkout_url: String,
    expires_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<PaymentRow> for Payment {
    fn from(r: PaymentRow) -> Self {
        Payment {
            id: r.id,
            user_id: r.user_id,
            plan_id: r.plan_id,
            order_code: r.order_code,
            amount: r.amount,
            status: r.status,
            checkout_url: r.checkout_url,
            expires_at: r.expires_at,
            paid_at: r.paid_at,
            created_at: r.created_at,
        }
    }
}

/// PostgreSQL implementation of PaymentRepository
pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn create(&self, payment: &Payment) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, user_id, plan_id, order_code, amount, status, checkout_url, expires_at,
                paid_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            "#,
        )
        .bind(payment.id)
        .bind(payment.user_id)
        .bind(payment.plan_id)
        .bind(payment.order_code)
        .bind(payment.amount)
        .bind(payment.status)
        .bind(&payment.checkout_url)
        .bind(payment.expires_at)
        .bind(payment.paid_at)
        .bind(payment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Payment>> {
        let sql = format!("SELECT {} FROM payments WHERE id = $1", PAYMENT_COLUMNS);
        Ok(sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Payment::from))
    }

    async fn find_by_order_code(&self, order_code: i64) -> AppResult<Option<Payment>> {
        let sql = format!("SELECT {} FROM payments WHERE order_code = $1", PAYMENT_COLUMNS);
        Ok(sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(order_code)
            .fetch_optional(&self.pool)
            .await?
            .map(Payment::from))
    }

    async fn find_open(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Payment>> {
        let sql = format!(
            "SELECT {} FROM payments \
             WHERE user_id = $1 AND plan_id = $2 AND status = 'pending' AND expires_at > $3 \
             ORDER BY created_at DESC LIMIT 1",
            PAYMENT_COLUMNS
        );
        Ok(sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(user_id)
            .bind(plan_id)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?
            .map(Payment::from))
    }

    async fn list_for_user(&self, user_id: Uuid, page: PageRequest) -> AppResult<Page<Payment>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT {} FROM payments WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
            PAYMENT_COLUMNS
        );
        let rows = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(user_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(
            rows.into_iter().map(Payment::from).collect(),
            total,
            page,
        ))
    }

    async fn list_pending(&self, limit: i64) -> AppResult<Vec<Payment>> {
        let sql = format!(
            "SELECT {} FROM payments WHERE status = 'pending' ORDER BY created_at LIMIT $1",
            PAYMENT_COLUMNS
        );
        let rows = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Payment::from).collect())
    }

    async fn mark(&self, id: Uuid, status: PaymentStatus) -> AppResult<bool> {
        if !PaymentStatus::Pending.can_transition_to(status) {
            return Ok(false);
        }
        let result = sqlx::query(
            "UPDATE payments SET status = $2, updated_at = NOW() WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .bind(status)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn settle(&self, order_code: i64, now: DateTime<Utc>) -> AppResult<SettlementOutcome> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "SELECT {} FROM payments WHERE order_code = $1 FOR UPDATE",
            PAYMENT_COLUMNS
        );
        let payment = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(order_code)
            .fetch_optional(&mut *tx)
            .await?
            .map(Payment::from)
            .ok_or_else(|| AppError::not_found("Payment not found"))?;

        match payment.status {
            PaymentStatus::Paid => return Ok(SettlementOutcome::AlreadySettled),
            PaymentStatus::Cancelled => {
                return Err(AppError::bad_request("Payment was cancelled"));
            }
            // Money that arrives after the link ran out is still honoured
            PaymentStatus::Pending | PaymentStatus::Expired => {}
        }

        let (current, current_plan) = ledger::lock_active(&mut tx, payment.user_id).await?;
        let target = ledger::load_plan(&mut tx, payment.plan_id).await?;
        let activation = plan_activation(
            payment.user_id,
            Some((&current, &current_plan)),
            &target,
            now,
        );
        ledger::apply_activation(&mut tx, &activation).await?;
        ledger::set_premium(&mut tx, payment.user_id, true).await?;

        sqlx::query(
            "UPDATE payments SET status = 'paid', paid_at = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(payment.id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(SettlementOutcome::Activated {
            user_id: payment.user_id,
            plan_id: payment.plan_id,
        })
    }
}
