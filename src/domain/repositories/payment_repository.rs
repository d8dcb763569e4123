use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::AppResult;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::subscription::{Payment, PaymentStatus, SettlementOutcome};

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create(&self, payment: &Payment) -> AppResult<()>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Payment>>;

    async fn find_by_order_code(&self, order_code: i64) -> AppResult<Option<Payment>>;

    /// Pending payment for the plan whose link has not run out yet
    async fn find_open(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Payment>>;

    async fn list_for_user(&self, user_id: Uuid, page: PageRequest) -> AppResult<Page<Payment>>;

    /// Oldest pending payments first
    async fn list_pending(&self, limit: i64) -> AppResult<Vec<Payment>>;

    /// Moves a pending payment to `status`; false when it was not pending anymore
    async fn mark(&self, id: Uuid, status: PaymentStatus) -> AppResult<bool>;

    /// Marks the payment paid and activates its plan in one transaction
    async fn settle(&self, order_code: i64, now: DateTime<Utc>) -> AppResult<SettlementOutcome>;
}
