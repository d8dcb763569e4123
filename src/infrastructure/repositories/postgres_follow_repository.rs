use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::errors::AppResult;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::repositories::follow_repository::FollowRepository;
use crate::domain::repositories::user_repository::UserSummary;

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: Uuid,
    display_name: String,
    avatar_url: Option<String>,
    is_premium: bool,
}

impl From<SummaryRow> for UserSummary {
    fn from(r: SummaryRow) -> Self {
        UserSummary {
            id: r.id,
            display_name: r.display_name,
            avatar_url: r.avatar_url,
            is_premium: r.is_premium,
        }
    }
}

pub struct PostgresFollowRepository {
    pool: PgPool,
}

impl PostgresFollowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Users on the `other` side of follow rows whose `anchor` column is `user_id`
    async fn connections(
        &self,
        user_id: Uuid,
        anchor: &'static str,
        other: &'static str,
        page: PageRequest,
    ) -> AppResult<Page<UserSummary>> {
        let total_sql = format!(
            "SELECT COUNT(*) FROM follows f JOIN users u ON u.id = f.{other} \
             WHERE f.{anchor} = $1 AND NOT u.is_deleted",
            other = other,
            anchor = anchor
        );
        let total: i64 = sqlx::query_scalar(&total_sql)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT u.id, u.display_name, u.avatar_url, u.is_premium \
             FROM follows f JOIN users u ON u.id = f.{other} \
             WHERE f.{anchor} = $1 AND NOT u.is_deleted \
             ORDER BY f.created_at DESC LIMIT $2 OFFSET $3",
            other = other,
            anchor = anchor
        );
        let rows = sqlx::query_as::<_, SummaryRow>(&sql)
            .bind(user_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(
            rows.into_iter().map(UserSummary::from).collect(),
            total,
            page,
        ))
    }
}

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    async fn follow(&self, follower: Uuid, followee: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO follows (follower_id, followee_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(follower)
        .bind(followee)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn unfollow(&self, follower: Uuid, followee: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followee_id = $2")
            .bind(follower)
            .bind(followee)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn followers(&self, user_id: Uuid, page: PageRequest) -> AppResult<Page<UserSummary>> {
        self.connections(user_id, "followee_id", "follower_id", page).await
    }

    async fn following(&self, user_id: Uuid, page: PageRequest) -> AppResult<Page<UserSummary>> {
        self.connections(user_id, "follower_id", "followee_id", page).await
    }
}
