use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::calendar::{CalendarEvent, DateRange};
use crate::domain::errors::AppResult;

#[async_trait]
pub trait CalendarRepository: Send + Sync {
    async fn create(&self, event: &CalendarEvent) -> AppResult<()>;

    async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<CalendarEvent>>;

    /// Events within the range ordered by date
    async fn list(&self, user_id: Uuid, range: DateRange) -> AppResult<Vec<CalendarEvent>>;

    async fn update(&self, event: &CalendarEvent) -> AppResult<()>;

    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()>;
}
