use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::AppResult;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::social::collection::{Collection, CollectionView};

#[async_trait]
pub trait CollectionRepository: Send + Sync {
    /// Insert a collection, spending one `collections` credit in the same transaction
    async fn create(&self, collection: &Collection) -> AppResult<()>;

    /// Live collection including hidden and unpublished ones
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Collection>>;

    async fn view(&self, id: Uuid, viewer: Uuid) -> AppResult<Option<CollectionView>>;

    /// Published, visible collections, most recently published first
    async fn list_published(&self, viewer: Uuid, page: PageRequest)
        -> AppResult<Page<CollectionView>>;

    /// All of the owner's visible collections, drafts included
    async fn list_by_owner(&self, owner: Uuid, page: PageRequest)
        -> AppResult<Page<CollectionView>>;

    async fn update(&self, collection: &Collection) -> AppResult<()>;

    /// Soft delete, releasing the `collections` credit
    async fn delete(&self, collection: &Collection) -> AppResult<()>;
}
