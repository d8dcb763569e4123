use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::errors::AppResult;
use crate::domain::repositories::engagement_repository::EngagementRepository;
use crate::domain::social::engagement::EngagementTarget;

/// PostgreSQL implementation of EngagementRepository
///
/// Likes and saves live in two tables with the same shape.
pub struct PostgresEngagementRepository {
    pool: PgPool,
}

impl PostgresEngagementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert(
        &self,
        table: &'static str,
        user_id: Uuid,
        target: EngagementTarget,
        target_id: Uuid,
    ) -> AppResult<bool> {
        let sql = format!(
            "INSERT INTO {} (user_id, target_type, target_id) VALUES ($1, $2, $3) \
             ON CONFLICT DO NOTHING",
            table
        );
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(target)
            .bind(target_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn remove(
        &self,
        table: &'static str,
        user_id: Uuid,
        target: EngagementTarget,
        target_id: Uuid,
    ) -> AppResult<()> {
        let sql = format!(
            "DELETE FROM {} WHERE user_id = $1 AND target_type = $2 AND target_id = $3",
            table
        );
        sqlx::query(&sql)
            .bind(user_id)
            .bind(target)
            .bind(target_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl EngagementRepository for PostgresEngagementRepository {
    async fn like(&self, user_id: Uuid, target: EngagementTarget, target_id: Uuid) -> AppResult<bool> {
        self.insert("likes", user_id, target, target_id).await
    }

    async fn unlike(&self, user_id: Uuid, target: EngagementTarget, target_id: Uuid) -> AppResult<()> {
        self.remove("likes", user_id, target, target_id).await
    }

    async fn save(&self, user_id: Uuid, target: EngagementTarget, target_id: Uuid) -> AppResult<bool> {
        self.insert("saves", user_id, target, target_id).await
    }

    async fn unsave(&self, user_id: Uuid, target: EngagementTarget, target_id: Uuid) -> AppResult<()> {
        self.remove("saves", user_id, target, target_id).await
    }
}
