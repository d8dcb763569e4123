use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::AppResult;
use crate::domain::social::engagement::EngagementTarget;

/// Likes and saves on posts and collections
///
/// All operations are idempotent.
#[async_trait]
pub trait EngagementRepository: Send + Sync {
    /// Returns true when the like did not exist before
    async fn like(&self, user_id: Uuid, target: EngagementTarget, target_id: Uuid) -> AppResult<bool>;

    async fn unlike(&self, user_id: Uuid, target: EngagementTarget, target_id: Uuid) -> AppResult<()>;

    /// Returns true when the save did not exist before
    async fn save(&self, user_id: Uuid, target: EngagementTarget, target_id: Uuid) -> AppResult<bool>;

    async fn unsave(&self, user_id: Uuid, target: EngagementTarget, target_id: Uuid) -> AppResult<()>;
}
