use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::AppResult;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::wardrobe::outfit::Outfit;

#[async_trait]
pub trait OutfitRepository: Send + Sync {
    async fn create(&self, outfit: &Outfit) -> AppResult<()>;

    async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<Outfit>>;

    async fn list(
        &self,
        user_id: Uuid,
        is_favorite: Option<bool>,
        page: PageRequest,
    ) -> AppResult<Page<Outfit>>;

    /// Live outfits among `ids` regardless of owner, in the given order
    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Outfit>>;

    /// Number of distinct live outfits among `ids` owned by `user_id`
    async fn count_owned(&self, user_id: Uuid, ids: &[Uuid]) -> AppResult<i64>;

    async fn update(&self, outfit: &Outfit) -> AppResult<()>;

    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()>;
}
