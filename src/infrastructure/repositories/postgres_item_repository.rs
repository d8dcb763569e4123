use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::ledger;
use crate::domain::errors::{AppError, AppResult};
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::repositories::item_repository::ItemRepository;
use crate::domain::subscription::Feature;
use crate::domain::wardrobe::item::{Item, ItemFilter};
use crate::domain::wardrobe::taxonomy::Season;

const ITEM_COLUMNS: &str = "id, user_id, name, category_id, color, brand, material, image_url, \
     seasons, occasion_ids, style_ids, is_favorite, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    category_id: Uuid,
    color: Option<String>,
    brand: Option<String>,
    material: Option<String>,
    image_url: Option<String>,
    seasons: Vec<String>,
    occasion_ids: Vec<Uuid>,
    style_ids: Vec<Uuid>,
    is_favorite: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ItemRow> for Item {
    fn from(r: ItemRow) -> Self {
        Item {
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            category_id: r.category_id,
            color: r.color,
            brand: r.brand,
            material: r.material,
            image_url: r.image_url,
            // Unknown labels can only come from manual edits; drop them
            seasons: r.seasons.iter().filter_map(|s| s.parse().ok()).collect(),
            occasion_ids: r.occasion_ids,
            style_ids: r.style_ids,
            is_favorite: r.is_favorite,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

fn season_labels(seasons: &[Season]) -> Vec<String> {
    seasons.iter().map(|s| s.as_str().to_string()).collect()
}

/// Appends the owner scope and optional filters to a query
fn push_filters<'a>(qb: &mut QueryBuilder<'a, Postgres>, user_id: Uuid, filter: &'a ItemFilter) {
    qb.push(" WHERE NOT is_deleted AND user_id = ").push_bind(user_id);
    if let Some(category_id) = filter.category_id {
        qb.push(" AND category_id = ").push_bind(category_id);
    }
    if let Some(season) = filter.season {
        qb.push(" AND ")
            .push_bind(season.as_str())
            .push(" = ANY(seasons)");
    }
    if let Some(occasion_id) = filter.occasion_id {
        qb.push(" AND ").push_bind(occasion_id).push(" = ANY(occasion_ids)");
    }
    if let Some(style_id) = filter.style_id {
        qb.push(" AND ").push_bind(style_id).push(" = ANY(style_ids)");
    }
    if let Some(is_favorite) = filter.is_favorite {
        qb.push(" AND is_favorite = ").push_bind(is_favorite);
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR brand ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR color ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// PostgreSQL implementation of ItemRepository
pub struct PostgresItemRepository {
    pool: PgPool,
}

impl PostgresItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemRepository for PostgresItemRepository {
    async fn create(&self, item: &Item) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        ledger::consume_credit(&mut tx, item.user_id, Feature::WardrobeItems).await?;

        sqlx::query(
            r#"
            INSERT INTO items (
                id, user_id, name, category_id, color, brand, material, image_url,
                seasons, occasion_ids, style_ids, is_favorite, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(item.id)
        .bind(item.user_id)
        .bind(&item.name)
        .bind(item.category_id)
        .bind(&item.color)
        .bind(&item.brand)
        .bind(&item.material)
        .bind(&item.image_url)
        .bind(season_labels(&item.seasons))
        .bind(&item.occasion_ids)
        .bind(&item.style_ids)
        .bind(item.is_favorite)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<Item>> {
        let sql = format!(
            "SELECT {} FROM items WHERE id = $1 AND user_id = $2 AND NOT is_deleted",
            ITEM_COLUMNS
        );
        Ok(sqlx::query_as::<_, ItemRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .map(Item::from))
    }

    async fn list(
        &self,
        user_id: Uuid,
        filter: &ItemFilter,
        page: PageRequest,
    ) -> AppResult<Page<Item>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM items");
        push_filters(&mut count, user_id, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM items", ITEM_COLUMNS));
        push_filters(&mut select, user_id, filter);
        select
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows = select
            .build_query_as::<ItemRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(
            rows.into_iter().map(Item::from).collect(),
            total,
            page,
        ))
    }

    async fn list_all(&self, user_id: Uuid) -> AppResult<Vec<Item>> {
        let sql = format!(
            "SELECT {} FROM items WHERE user_id = $1 AND NOT is_deleted ORDER BY created_at DESC",
            ITEM_COLUMNS
        );
        let rows = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Item::from).collect())
    }

    async fn find_many(&self, user_id: Uuid, ids: &[Uuid]) -> AppResult<Vec<Item>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM items WHERE id = ANY($1) AND user_id = $2 AND NOT is_deleted",
            ITEM_COLUMNS
        );
        let rows = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(ids)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        let mut items: Vec<Item> = rows.into_iter().map(Item::from).collect();
        items.sort_by_key(|item| ids.iter().position(|id| *id == item.id));
        Ok(items)
    }

    async fn update(&self, item: &Item) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE items
            SET name = $3, category_id = $4, color = $5, brand = $6, material = $7,
                image_url = $8, seasons = $9, occasion_ids = $10, style_ids = $11,
                is_favorite = $12, updated_at = $13
            WHERE id = $1 AND user_id = $2 AND NOT is_deleted
            "#,
        )
        .bind(item.id)
        .bind(item.user_id)
        .bind(&item.name)
        .bind(item.category_id)
        .bind(&item.color)
        .bind(&item.brand)
        .bind(&item.material)
        .bind(&item.image_url)
        .bind(season_labels(&item.seasons))
        .bind(&item.occasion_ids)
        .bind(&item.style_ids)
        .bind(item.is_favorite)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Item not found"));
        }
        Ok(())
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE items SET is_deleted = TRUE, updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 AND NOT is_deleted",
        )
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Item not found"));
        }

        sqlx::query("DELETE FROM outfit_items WHERE item_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        ledger::release_credit(&mut tx, user_id, Feature::WardrobeItems).await?;

        tx.commit().await?;
        Ok(())
    }
}
