use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::AppResult;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::repositories::user_repository::UserSummary;

#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Returns true when the follow did not exist before
    async fn follow(&self, follower: Uuid, followee: Uuid) -> AppResult<bool>;

    async fn unfollow(&self, follower: Uuid, followee: Uuid) -> AppResult<()>;

    async fn followers(&self, user_id: Uuid, page: PageRequest) -> AppResult<Page<UserSummary>>;

    async fn following(&self, user_id: Uuid, page: PageRequest) -> AppResult<Page<UserSummary>>;
}
