use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::AppResult;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::wardrobe::item::{Item, ItemFilter};

/// Repository trait for wardrobe items
///
/// Every lookup is scoped to the owner; other users' items behave as absent.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Insert an item, spending one `wardrobe_items` credit in the same transaction
    async fn create(&self, item: &Item) -> AppResult<()>;

    async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<Item>>;

    async fn list(
        &self,
        user_id: Uuid,
        filter: &ItemFilter,
        page: PageRequest,
    ) -> AppResult<Page<Item>>;

    /// Whole wardrobe, newest first
    async fn list_all(&self, user_id: Uuid) -> AppResult<Vec<Item>>;

    async fn find_many(&self, user_id: Uuid, ids: &[Uuid]) -> AppResult<Vec<Item>>;

    async fn update(&self, item: &Item) -> AppResult<()>;

    /// Soft delete, releasing the credit and removing the item from outfits
    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()>;
}
