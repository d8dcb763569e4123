use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::AppResult;
use crate::domain::subscription::Plan;

#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Live plans that can be shown in the catalogue, cheapest first
    async fn list_active(&self) -> AppResult<Vec<Plan>>;

    /// Live plan regardless of `is_active`
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Plan>>;

    async fn default_plan(&self) -> AppResult<Plan>;

    async fn create(&self, plan: &Plan) -> AppResult<()>;

    async fn update(&self, plan: &Plan) -> AppResult<()>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}
