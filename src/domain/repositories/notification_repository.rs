use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::AppResult;
use crate::domain::notification::{DevicePlatform, Notification};
use crate::domain::pagination::{Page, PageRequest};

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert(&self, notification: &Notification) -> AppResult<()>;

    /// Personal and system notifications for a user, newest first,
    /// with read state resolved for that user
    async fn list_for_user(&self, user_id: Uuid, page: PageRequest) -> AppResult<Page<Notification>>;

    async fn unread_count(&self, user_id: Uuid) -> AppResult<i64>;

    /// NotFound when the notification is not visible to the user
    async fn mark_read(&self, user_id: Uuid, id: Uuid) -> AppResult<()>;

    /// Returns how many notifications changed state
    async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64>;

    /// Registers a token; a token already known for another user moves to this one
    async fn upsert_device(&self, user_id: Uuid, token: &str, platform: DevicePlatform) -> AppResult<()>;

    async fn remove_device(&self, user_id: Uuid, token: &str) -> AppResult<()>;

    async fn device_tokens(&self, user_id: Uuid) -> AppResult<Vec<String>>;
}
