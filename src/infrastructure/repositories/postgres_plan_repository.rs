use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::ledger::{self, PlanRow, PLAN_COLUMNS};
use crate::domain::errors::{AppError, AppResult};
use crate::domain::repositories::plan_repository::PlanRepository;
use crate::domain::subscription::Plan;

pub struct PostgresPlanRepository {
    pool: PgPool,
}

impl PostgresPlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanRepository for PostgresPlanRepository {
    async fn list_active(&self) -> AppResult<Vec<Plan>> {
        let sql = format!(
            "SELECT {} FROM plans WHERE is_active AND NOT is_deleted ORDER BY price, name",
            PLAN_COLUMNS
        );
        let rows = sqlx::query_as::<_, PlanRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Plan::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Plan>> {
        let sql = format!(
            "SELECT {} FROM plans WHERE id = $1 AND NOT is_deleted",
            PLAN_COLUMNS
        );
        Ok(sqlx::query_as::<_, PlanRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Plan::from))
    }

    async fn default_plan(&self) -> AppResult<Plan> {
        let mut conn = self.pool.acquire().await?;
        ledger::default_plan(&mut conn).await
    }

    async fn create(&self, plan: &Plan) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO plans (
                id, name, description, price, duration_days, benefits, is_default, is_active,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(plan.id)
        .bind(&plan.name)
        .bind(&plan.description)
        .bind(plan.price)
        .bind(plan.duration_days)
        .bind(Json(plan.benefits.clone()))
        .bind(plan.is_default)
        .bind(plan.is_active)
        .bind(plan.created_at)
        .bind(plan.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, plan: &Plan) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE plans
            SET name = $2, description = $3, price = $4, duration_days = $5, benefits = $6,
                is_active = $7, updated_at = $8
            WHERE id = $1 AND NOT is_deleted
            "#,
        )
        .bind(plan.id)
        .bind(&plan.name)
        .bind(&plan.description)
        .bind(plan.price)
        .bind(plan.duration_days)
        .bind(Json(plan.benefits.clone()))
        .bind(plan.is_active)
        .bind(plan.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Plan not found"));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE plans SET is_deleted = TRUE, is_active = FALSE, updated_at = NOW() \
             WHERE id = $1 AND NOT is_deleted AND NOT is_default",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Plan not found"));
        }
        Ok(())
    }
}
