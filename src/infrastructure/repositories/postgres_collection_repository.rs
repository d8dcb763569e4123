use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::ledger;
use crate::domain::errors::{AppError, AppResult};
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::repositories::collection_repository::CollectionRepository;
use crate::domain::social::collection::{Collection, CollectionView};
use crate::domain::social::engagement::Engagement;
use crate::domain::subscription::Feature;

const COLLECTION_COLUMNS: &str = "id, user_id, title, description, outfit_ids, is_published, \
     published_at, is_hidden, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct CollectionRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: Option<String>,
    outfit_ids: Vec<Uuid>,
    is_published: bool,
    published_at: Option<DateTime<Utc>>,
    is_hidden: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CollectionRow> for Collection {
    fn from(r: CollectionRow) -> Self {
        Collection {
            id: r.id,
            user_id: r.user_id,
            title: r.title,
            description: r.description,
            outfit_ids: r.outfit_ids,
            is_published: r.is_published,
            published_at: r.published_at,
            is_hidden: r.is_hidden,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CollectionViewRow {
    #[sqlx(flatten)]
    collection: CollectionRow,
    author_name: String,
    #[sqlx(flatten)]
    engagement: Engagement,
}

impl From<CollectionViewRow> for CollectionView {
    fn from(r: CollectionViewRow) -> Self {
        CollectionView {
            collection: r.collection.into(),
            author_name: r.author_name,
            engagement: r.engagement,
        }
    }
}

fn push_view_select(qb: &mut QueryBuilder<'_, Postgres>, viewer: Uuid) {
    qb.push(
        r#"
        SELECT c.id, c.user_id, c.title, c.description, c.outfit_ids, c.is_published,
            c.published_at, c.is_hidden, c.created_at, c.updated_at,
            u.display_name AS author_name,
            (SELECT COUNT(*) FROM likes l
                WHERE l.target_type = 'collection' AND l.target_id = c.id) AS like_count,
            (SELECT COUNT(*) FROM comments cm
                WHERE cm.target_type = 'collection' AND cm.target_id = c.id
                AND NOT cm.is_deleted AND NOT cm.is_hidden) AS comment_count,
            (SELECT COUNT(*) FROM saves s
                WHERE s.target_type = 'collection' AND s.target_id = c.id) AS save_count,
            EXISTS (SELECT 1 FROM likes l
                WHERE l.target_type = 'collection' AND l.target_id = c.id AND l.user_id = "#,
    )
    .push_bind(viewer)
    .push(
        r#") AS is_liked,
            EXISTS (SELECT 1 FROM saves s
                WHERE s.target_type = 'collection' AND s.target_id = c.id AND s.user_id = "#,
    )
    .push_bind(viewer)
    .push(") AS is_saved FROM collections c JOIN users u ON u.id = c.user_id");
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, owner: Option<Uuid>) {
    qb.push(" WHERE NOT c.is_deleted AND NOT c.is_hidden AND NOT u.is_deleted");
    match owner {
        Some(owner) => {
            qb.push(" AND c.user_id = ").push_bind(owner);
        }
        None => {
            qb.push(" AND c.is_published");
        }
    }
}

/// PostgreSQL implementation of CollectionRepository
pub struct PostgresCollectionRepository {
    pool: PgPool,
}

impl PostgresCollectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `owner` lists one user's collections including drafts; `None`
    /// lists published ones from everybody
    async fn page_of_views(
        &self,
        viewer: Uuid,
        owner: Option<Uuid>,
        page: PageRequest,
    ) -> AppResult<Page<CollectionView>> {
        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM collections c JOIN users u ON u.id = c.user_id",
        );
        push_filter(&mut count, owner);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("");
        push_view_select(&mut select, viewer);
        push_filter(&mut select, owner);
        select.push(if owner.is_some() {
            " ORDER BY c.created_at DESC"
        } else {
            " ORDER BY c.published_at DESC"
        });
        select
            .push(" LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows = select
            .build_query_as::<CollectionViewRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(
            rows.into_iter().map(CollectionView::from).collect(),
            total,
            page,
        ))
    }
}

#[async_trait]
impl CollectionRepository for PostgresCollectionRepository {
    async fn create(&self, collection: &Collection) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        ledger::consume_credit(&mut tx, collection.user_id, Feature::Collections).await?;

        sqlx::query(
            r#"
            INSERT INTO collections (
                id, user_id, title, description, outfit_ids, is_published, published_at,
                is_hidden, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(collection.id)
        .bind(collection.user_id)
        .bind(&collection.title)
        .bind(&collection.description)
        .bind(&collection.outfit_ids)
        .bind(collection.is_published)
        .bind(collection.published_at)
        .bind(collection.is_hidden)
        .bind(collection.created_at)
        .bind(collection.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Collection>> {
        let sql = format!(
            "SELECT {} FROM collections WHERE id = $1 AND NOT is_deleted",
            COLLECTION_COLUMNS
        );
        Ok(sqlx::query_as::<_, CollectionRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Collection::from))
    }

    async fn view(&self, id: Uuid, viewer: Uuid) -> AppResult<Option<CollectionView>> {
        let mut select = QueryBuilder::<Postgres>::new("");
        push_view_select(&mut select, viewer);
        select
            .push(" WHERE NOT c.is_deleted AND c.id = ")
            .push_bind(id);
        Ok(select
            .build_query_as::<CollectionViewRow>()
            .fetch_optional(&self.pool)
            .await?
            .map(CollectionView::from))
    }

    async fn list_published(
        &self,
        viewer: Uuid,
        page: PageRequest,
    ) -> AppResult<Page<CollectionView>> {
        self.page_of_views(viewer, None, page).await
    }

    async fn list_by_owner(
        &self,
        owner: Uuid,
        page: PageRequest,
    ) -> AppResult<Page<CollectionView>> {
        self.page_of_views(owner, Some(owner), page).await
    }

    async fn update(&self, collection: &Collection) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE collections
            SET title = $2, description = $3, outfit_ids = $4, is_published = $5,
                published_at = $6, updated_at = $7
            WHERE id = $1 AND NOT is_deleted
            "#,
        )
        .bind(collection.id)
        .bind(&collection.title)
        .bind(&collection.description)
        .bind(&collection.outfit_ids)
        .bind(collection.is_published)
        .bind(collection.published_at)
        .bind(collection.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Collection not found"));
        }
        Ok(())
    }

    async fn delete(&self, collection: &Collection) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE collections SET is_deleted = TRUE, updated_at = NOW() \
             WHERE id = $1 AND NOT is_deleted",
        )
        .bind(collection.id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Collection not found"));
        }

        ledger::release_credit(&mut tx, collection.user_id, Feature::Collections).await?;

        tx.commit().await?;
        Ok(())
    }
}
