use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::AppResult;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::social::comment::{Comment, CommentView};
use crate::domain::social::engagement::EngagementTarget;

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: &Comment) -> AppResult<()>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Comment>>;

    /// Visible comments on a target, oldest first
    async fn list(
        &self,
        target: EngagementTarget,
        target_id: Uuid,
        page: PageRequest,
    ) -> AppResult<Page<CommentView>>;

    /// Soft delete the comment and its replies
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}
