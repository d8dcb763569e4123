use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::AppResult;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::social::post::{Post, PostView};

/// Repository trait for posts
///
/// Listing methods never return hidden or deleted posts.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: &Post) -> AppResult<()>;

    /// Live post including hidden ones
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Post>>;

    /// Live post with engagement as seen by `viewer`, including hidden ones
    async fn view(&self, id: Uuid, viewer: Uuid) -> AppResult<Option<PostView>>;

    /// Posts by the viewer and the users they follow, newest first
    async fn feed(&self, viewer: Uuid, page: PageRequest) -> AppResult<Page<PostView>>;

    async fn list_by_author(
        &self,
        author: Uuid,
        viewer: Uuid,
        page: PageRequest,
    ) -> AppResult<Page<PostView>>;

    async fn list_by_hashtag(
        &self,
        hashtag: &str,
        viewer: Uuid,
        page: PageRequest,
    ) -> AppResult<Page<PostView>>;

    /// Posts the viewer saved, most recently saved first
    async fn list_saved(&self, viewer: Uuid, page: PageRequest) -> AppResult<Page<PostView>>;

    async fn update(&self, post: &Post) -> AppResult<()>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}
