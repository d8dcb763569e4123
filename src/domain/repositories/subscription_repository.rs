use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::AppResult;
use crate::domain::subscription::{Feature, Plan, UserSubscription};

/// Subscriptions and their benefit ledger
///
/// Every method that changes the ledger locks the active subscription row
/// for the duration of its transaction. A user with no active subscription
/// is put on the default plan first.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// The active subscription with its plan
    async fn current(&self, user_id: Uuid) -> AppResult<(UserSubscription, Plan)>;

    /// Spends one credit and returns what remains
    async fn consume(&self, user_id: Uuid, feature: Feature) -> AppResult<i32>;

    /// Gives one persistent credit back
    async fn release(&self, user_id: Uuid, feature: Feature) -> AppResult<()>;

    /// Active subscriptions whose end date is at or before `now`
    async fn lapsed(&self, now: DateTime<Utc>, limit: i64) -> AppResult<Vec<UserSubscription>>;

    /// Expires a lapsed subscription and moves the user to the default plan
    ///
    /// Returns false when the row was no longer active or no longer lapsed.
    async fn expire(&self, subscription_id: Uuid, now: DateTime<Utc>) -> AppResult<bool>;
}
