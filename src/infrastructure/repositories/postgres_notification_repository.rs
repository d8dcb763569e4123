use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::errors::{AppError, AppResult};
use crate::domain::notification::{DevicePlatform, Notification, NotificationKind};
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::repositories::notification_repository::NotificationRepository;

// Personal rows carry their own flag; broadcasts are read per user through
// notification_reads. The reader is always $1.
const VISIBLE_TO_READER: &str =
    "NOT n.is_deleted AND (n.user_id = $1 OR n.user_id IS NULL)";
const READ_STATE: &str = "CASE WHEN n.user_id IS NULL THEN EXISTS ( \
         SELECT 1 FROM notification_reads r WHERE r.notification_id = n.id AND r.user_id = $1 \
     ) ELSE n.is_read END";

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    user_id: Option<Uuid>,
    kind: NotificationKind,
    title: String,
    body: String,
    reference_id: Option<Uuid>,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(r: NotificationRow) -> Self {
        Notification {
            id: r.id,
            user_id: r.user_id,
            kind: r.kind,
            title: r.title,
            body: r.body,
            reference_id: r.reference_id,
            is_read: r.is_read,
            created_at: r.created_at,
        }
    }
}

pub struct PostgresNotificationRepository {
    pool: PgPool,
}

impl PostgresNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepository {
    async fn insert(&self, notification: &Notification) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (
                id, user_id, kind, title, body, reference_id, is_read, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            "#,
        )
        .bind(notification.id)
        .bind(notification.user_id)
        .bind(notification.kind)
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(notification.reference_id)
        .bind(notification.is_read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid, page: PageRequest) -> AppResult<Page<Notification>> {
        let count_sql = format!("SELECT COUNT(*) FROM notifications n WHERE {}", VISIBLE_TO_READER);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT n.id, n.user_id, n.kind, n.title, n.body, n.reference_id, \
             {} AS is_read, n.created_at \
             FROM notifications n WHERE {} \
             ORDER BY n.created_at DESC LIMIT $2 OFFSET $3",
            READ_STATE, VISIBLE_TO_READER
        );
        let rows = sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(user_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(
            rows.into_iter().map(Notification::from).collect(),
            total,
            page,
        ))
    }

    async fn unread_count(&self, user_id: Uuid) -> AppResult<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM notifications n WHERE {} AND NOT ({})",
            VISIBLE_TO_READER, READ_STATE
        );
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn mark_read(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        let sql = format!(
            "SELECT n.user_id FROM notifications n WHERE {} AND n.id = $2",
            VISIBLE_TO_READER
        );
        let owner: Option<Option<Uuid>> = sqlx::query_scalar(&sql)
            .bind(user_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match owner {
            None => Err(AppError::not_found("Notification not found")),
            Some(Some(_)) => {
                sqlx::query(
                    "UPDATE notifications SET is_read = TRUE, updated_at = NOW() \
                     WHERE id = $1 AND user_id = $2",
                )
                .bind(id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
                Ok(())
            }
            Some(None) => {
                sqlx::query(
                    "INSERT INTO notification_reads (notification_id, user_id) VALUES ($1, $2) \
                     ON CONFLICT DO NOTHING",
                )
                .bind(id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
                Ok(())
            }
        }
    }

    async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;

        let personal = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, updated_at = NOW() \
             WHERE user_id = $1 AND NOT is_read AND NOT is_deleted",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let system = sqlx::query(
            r#"
            INSERT INTO notification_reads (notification_id, user_id)
            SELECT n.id, $1 FROM notifications n
            WHERE n.user_id IS NULL AND NOT n.is_deleted
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(personal.rows_affected() + system.rows_affected())
    }

    async fn upsert_device(&self, user_id: Uuid, token: &str, platform: DevicePlatform) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO device_tokens (token, user_id, platform)
            VALUES ($1, $2, $3)
            ON CONFLICT (token) DO UPDATE
            SET user_id = EXCLUDED.user_id, platform = EXCLUDED.platform, updated_at = NOW()
            "#,
        )
        .bind(token)
        .bind(user_id)
        .bind(platform.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_device(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM device_tokens WHERE token = $1 AND user_id = $2")
            .bind(token)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn device_tokens(&self, user_id: Uuid) -> AppResult<Vec<String>> {
        let tokens = sqlx::query_scalar("SELECT token FROM device_tokens WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(tokens)
    }
}
