use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::errors::{AppError, AppResult};
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::repositories::outfit_repository::OutfitRepository;
use crate::domain::wardrobe::outfit::Outfit;

// Item ids are aggregated from the join table, skipping deleted items
const OUTFIT_SELECT: &str = r#"
    SELECT o.id, o.user_id, o.name, o.description, o.is_favorite, o.created_at, o.updated_at,
        ARRAY(
            SELECT oi.item_id FROM outfit_items oi
            JOIN items i ON i.id = oi.item_id AND NOT i.is_deleted
            WHERE oi.outfit_id = o.id
            ORDER BY oi.position
        ) AS item_ids
    FROM outfits o
"#;

#[derive(sqlx::FromRow)]
struct OutfitRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    description: Option<String>,
    is_favorite: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    item_ids: Vec<Uuid>,
}

impl From<OutfitRow> for Outfit {
    fn from(r: OutfitRow) -> Self {
        Outfit {
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            description: r.description,
            item_ids: r.item_ids,
            is_favorite: r.is_favorite,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

async fn replace_items(conn: &mut PgConnection, outfit: &Outfit) -> AppResult<()> {
    sqlx::query("DELETE FROM outfit_items WHERE outfit_id = $1")
        .bind(outfit.id)
        .execute(&mut *conn)
        .await?;

    let positions: Vec<i32> = (0..outfit.item_ids.len() as i32).collect();
    sqlx::query(
        r#"
        INSERT INTO outfit_items (outfit_id, item_id, position)
        SELECT $1, item_id, position FROM UNNEST($2::UUID[], $3::INT[]) AS t(item_id, position)
        "#,
    )
    .bind(outfit.id)
    .bind(&outfit.item_ids)
    .bind(positions)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// PostgreSQL implementation of OutfitRepository
pub struct PostgresOutfitRepository {
    pool: PgPool,
}

impl PostgresOutfitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OutfitRepository for PostgresOutfitRepository {
    async fn create(&self, outfit: &Outfit) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO outfits (id, user_id, name, description, is_favorite, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(outfit.id)
        .bind(outfit.user_id)
        .bind(&outfit.name)
        .bind(&outfit.description)
        .bind(outfit.is_favorite)
        .bind(outfit.created_at)
        .bind(outfit.updated_at)
        .execute(&mut *tx)
        .await?;

        replace_items(&mut tx, outfit).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<Outfit>> {
        let sql = format!(
            "{} WHERE o.id = $1 AND o.user_id = $2 AND NOT o.is_deleted",
            OUTFIT_SELECT
        );
        Ok(sqlx::query_as::<_, OutfitRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .map(Outfit::from))
    }

    async fn list(
        &self,
        user_id: Uuid,
        is_favorite: Option<bool>,
        page: PageRequest,
    ) -> AppResult<Page<Outfit>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM outfits o \
             WHERE o.user_id = $1 AND NOT o.is_deleted AND ($2::BOOLEAN IS NULL OR o.is_favorite = $2)",
        )
        .bind(user_id)
        .bind(is_favorite)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            "{} WHERE o.user_id = $1 AND NOT o.is_deleted \
             AND ($2::BOOLEAN IS NULL OR o.is_favorite = $2) \
             ORDER BY o.created_at DESC LIMIT $3 OFFSET $4",
            OUTFIT_SELECT
        );
        let rows = sqlx::query_as::<_, OutfitRow>(&sql)
            .bind(user_id)
            .bind(is_favorite)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(
            rows.into_iter().map(Outfit::from).collect(),
            total,
            page,
        ))
    }

    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Outfit>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("{} WHERE o.id = ANY($1) AND NOT o.is_deleted", OUTFIT_SELECT);
        let rows = sqlx::query_as::<_, OutfitRow>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        let mut outfits: Vec<Outfit> = rows.into_iter().map(Outfit::from).collect();
        outfits.sort_by_key(|o| ids.iter().position(|id| *id == o.id));
        Ok(outfits)
    }

    async fn count_owned(&self, user_id: Uuid, ids: &[Uuid]) -> AppResult<i64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT id) FROM outfits \
             WHERE id = ANY($1) AND user_id = $2 AND NOT is_deleted",
        )
        .bind(ids)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn update(&self, outfit: &Outfit) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE outfits
            SET name = $3, description = $4, is_favorite = $5, updated_at = $6
            WHERE id = $1 AND user_id = $2 AND NOT is_deleted
            "#,
        )
        .bind(outfit.id)
        .bind(outfit.user_id)
        .bind(&outfit.name)
        .bind(&outfit.description)
        .bind(outfit.is_favorite)
        .bind(outfit.updated_at)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Outfit not found"));
        }

        replace_items(&mut tx, outfit).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE outfits SET is_deleted = TRUE, updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 AND NOT is_deleted",
        )
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Outfit not found"));
        }

        // A published collection needs at least one outfit
        sqlx::query(
            r#"
            UPDATE collections
            SET outfit_ids = array_remove(outfit_ids, $1),
                is_published = is_published AND cardinality(array_remove(outfit_ids, $1)) > 0,
                updated_at = NOW()
            WHERE user_id = $2 AND $1 = ANY(outfit_ids)
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE calendar_events SET outfit_ids = array_remove(outfit_ids, $1), updated_at = NOW() \
             WHERE user_id = $2 AND $1 = ANY(outfit_ids)",
        )
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
