use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::AppResult;
use crate::domain::wardrobe::taxonomy::{TaxonomyEntry, TaxonomyKind};

#[async_trait]
pub trait TaxonomyRepository: Send + Sync {
    async fn list(&self, kind: TaxonomyKind) -> AppResult<Vec<TaxonomyEntry>>;

    async fn create(
        &self,
        kind: TaxonomyKind,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<TaxonomyEntry>;

    async fn update(
        &self,
        kind: TaxonomyKind,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<TaxonomyEntry>;

    async fn delete(&self, kind: TaxonomyKind, id: Uuid) -> AppResult<()>;

    /// Number of distinct live entries among `ids`
    async fn count_existing(&self, kind: TaxonomyKind, ids: &[Uuid]) -> AppResult<i64>;
}
