use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::errors::{AppError, AppResult};
use crate::domain::repositories::taxonomy_repository::TaxonomyRepository;
use crate::domain::wardrobe::taxonomy::{TaxonomyEntry, TaxonomyKind};

#[derive(sqlx::FromRow)]
struct EntryRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<EntryRow> for TaxonomyEntry {
    fn from(r: EntryRow) -> Self {
        TaxonomyEntry {
            id: r.id,
            name: r.name,
            description: r.description,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// PostgreSQL implementation of TaxonomyRepository
///
/// The four lookup tables share one shape, so the table name is taken from
/// `TaxonomyKind::table` and formatted into each statement.
pub struct PostgresTaxonomyRepository {
    pool: PgPool,
}

impl PostgresTaxonomyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn duplicate_name(kind: TaxonomyKind, err: sqlx::Error) -> AppError {
    match AppError::from(err) {
        AppError::Conflict(_) => AppError::conflict(format!("{} name already exists", kind.label())),
        other => other,
    }
}

#[async_trait]
impl TaxonomyRepository for PostgresTaxonomyRepository {
    async fn list(&self, kind: TaxonomyKind) -> AppResult<Vec<TaxonomyEntry>> {
        let sql = format!(
            "SELECT id, name, description, created_at, updated_at FROM {} \
             WHERE NOT is_deleted ORDER BY name",
            kind.table()
        );
        let rows = sqlx::query_as::<_, EntryRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(TaxonomyEntry::from).collect())
    }

    async fn create(
        &self,
        kind: TaxonomyKind,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<TaxonomyEntry> {
        let sql = format!(
            "INSERT INTO {} (id, name, description) VALUES ($1, $2, $3) \
             RETURNING id, name, description, created_at, updated_at",
            kind.table()
        );
        let row = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(name)
            .bind(description)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| duplicate_name(kind, e))?;
        Ok(row.into())
    }

    async fn update(
        &self,
        kind: TaxonomyKind,
        id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<TaxonomyEntry> {
        let sql = format!(
            "UPDATE {} SET name = $2, description = $3, updated_at = NOW() \
             WHERE id = $1 AND NOT is_deleted \
             RETURNING id, name, description, created_at, updated_at",
            kind.table()
        );
        sqlx::query_as::<_, EntryRow>(&sql)
            .bind(id)
            .bind(name)
            .bind(description)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| duplicate_name(kind, e))?
            .map(TaxonomyEntry::from)
            .ok_or_else(|| AppError::not_found(format!("{} not found", kind.label())))
    }

    async fn delete(&self, kind: TaxonomyKind, id: Uuid) -> AppResult<()> {
        let sql = format!(
            "UPDATE {} SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1 AND NOT is_deleted",
            kind.table()
        );
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("{} not found", kind.label())));
        }
        Ok(())
    }

    async fn count_existing(&self, kind: TaxonomyKind, ids: &[Uuid]) -> AppResult<i64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let sql = format!(
            "SELECT COUNT(DISTINCT id) FROM {} WHERE id = ANY($1) AND NOT is_deleted",
            kind.table()
        );
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(ids)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
