use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::calendar::{CalendarEvent, DateRange};
use crate::domain::errors::{AppError, AppResult};
use crate::domain::repositories::calendar_repository::CalendarRepository;

const EVENT_COLUMNS: &str =
    "id, user_id, name, occasion_id, event_date, note, outfit_ids, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    occasion_id: Option<Uuid>,
    event_date: NaiveDate,
    note: Option<String>,
    outfit_ids: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EventRow> for CalendarEvent {
    fn from(r: EventRow) -> Self {
        CalendarEvent {
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            occasion_id: r.occasion_id,
            event_date: r.event_date,
            note: r.note,
            outfit_ids: r.outfit_ids,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

pub struct PostgresCalendarRepository {
    pool: PgPool,
}

impl PostgresCalendarRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CalendarRepository for PostgresCalendarRepository {
    async fn create(&self, event: &CalendarEvent) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO calendar_events (
                id, user_id, name, occasion_id, event_date, note, outfit_ids, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(event.id)
        .bind(event.user_id)
        .bind(&event.name)
        .bind(event.occasion_id)
        .bind(event.event_date)
        .bind(&event.note)
        .bind(&event.outfit_ids)
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<CalendarEvent>> {
        let sql = format!(
            "SELECT {} FROM calendar_events WHERE id = $1 AND user_id = $2 AND NOT is_deleted",
            EVENT_COLUMNS
        );
        Ok(sqlx::query_as::<_, EventRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .map(CalendarEvent::from))
    }

    async fn list(&self, user_id: Uuid, range: DateRange) -> AppResult<Vec<CalendarEvent>> {
        let sql = format!(
            "SELECT {} FROM calendar_events \
             WHERE user_id = $1 AND NOT is_deleted AND event_date BETWEEN $2 AND $3 \
             ORDER BY event_date, created_at",
            EVENT_COLUMNS
        );
        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .bind(user_id)
            .bind(range.from)
            .bind(range.to)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(CalendarEvent::from).collect())
    }

    async fn update(&self, event: &CalendarEvent) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE calendar_events
            SET name = $3, occasion_id = $4, event_date = $5, note = $6, outfit_ids = $7,
                updated_at = $8
            WHERE id = $1 AND user_id = $2 AND NOT is_deleted
            "#,
        )
        .bind(event.id)
        .bind(event.user_id)
        .bind(&event.name)
        .bind(event.occasion_id)
        .bind(event.event_date)
        .bind(&event.note)
        .bind(&event.outfit_ids)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Calendar event not found"));
        }
        Ok(())
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE calendar_events SET is_deleted = TRUE, updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 AND NOT is_deleted",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Calendar event not found"));
        }
        Ok(())
    }
}
