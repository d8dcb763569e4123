use async_trait::async_trait;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use sqlx::PgPool;

use crate::domain::dashboard::{MonthlyRevenue, Overview, PlanShare, TopPost};
use crate::domain::errors::{AppError, AppResult};
use crate::domain::repositories::dashboard_repository::DashboardRepository;

pub struct PostgresDashboardRepository {
    pool: PgPool,
}

impl PostgresDashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DashboardRepository for PostgresDashboardRepository {
    async fn overview(&self, now: DateTime<Utc>) -> AppResult<Overview> {
        let month_start = Utc
            .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
            .single()
            .ok_or_else(|| AppError::internal("Invalid month start"))?;

        let overview = sqlx::query_as::<_, Overview>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users WHERE NOT is_deleted) AS total_users,
                (SELECT COUNT(*) FROM users WHERE NOT is_deleted AND is_premium) AS premium_users,
                (SELECT COUNT(*) FROM users
                    WHERE NOT is_deleted AND created_at >= $1) AS new_users_this_month,
                (SELECT COUNT(*) FROM posts WHERE NOT is_deleted) AS total_posts,
                (SELECT COUNT(*) FROM collections WHERE NOT is_deleted) AS total_collections,
                (SELECT COUNT(*) FROM user_subscriptions
                    WHERE status = 'active' AND NOT is_deleted) AS active_subscriptions,
                (SELECT COALESCE(SUM(amount), 0) FROM payments
                    WHERE status = 'paid') AS total_revenue
            "#,
        )
        .bind(month_start)
        .fetch_one(&self.pool)
        .await?;
        Ok(overview)
    }

    async fn revenue_by_month(&self, year: i32) -> AppResult<Vec<MonthlyRevenue>> {
        let rows = sqlx::query_as::<_, MonthlyRevenue>(
            r#"
            SELECT EXTRACT(MONTH FROM paid_at)::INT AS month,
                COALESCE(SUM(amount), 0) AS revenue,
                COUNT(*) AS payments
            FROM payments
            WHERE status = 'paid' AND EXTRACT(YEAR FROM paid_at)::INT = $1
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(year)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn plan_distribution(&self) -> AppResult<Vec<PlanShare>> {
        let rows = sqlx::query_as::<_, PlanShare>(
            r#"
            SELECT p.id AS plan_id, p.name AS plan_name, COUNT(s.id) AS subscribers
            FROM plans p
            LEFT JOIN user_subscriptions s
                ON s.plan_id = p.id AND s.status = 'active' AND NOT s.is_deleted
            WHERE NOT p.is_deleted
            GROUP BY p.id, p.name, p.price
            ORDER BY p.price, p.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn top_posts(&self, limit: i64) -> AppResult<Vec<TopPost>> {
        let rows = sqlx::query_as::<_, TopPost>(
            r#"
            SELECT t.post_id, t.author_id, t.author_name, t.body, t.like_count, t.comment_count,
                t.like_count + t.comment_count AS score
            FROM (
                SELECT p.id AS post_id, p.user_id AS author_id, u.display_name AS author_name,
                    p.body, p.created_at,
                    (SELECT COUNT(*) FROM likes l
                        WHERE l.target_type = 'post' AND l.target_id = p.id) AS like_count,
                    (SELECT COUNT(*) FROM comments c
                        WHERE c.target_type = 'post' AND c.target_id = p.id
                        AND NOT c.is_deleted AND NOT c.is_hidden) AS comment_count
                FROM posts p
                JOIN users u ON u.id = p.user_id
                WHERE NOT p.is_deleted AND NOT p.is_hidden
            ) t
            ORDER BY score DESC, t.created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
