use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::errors::{AppError, AppResult};
use crate::domain::moderation::{Report, ReportStatus, ReportTarget, Suspension};
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::repositories::moderation_repository::{
    ModerationRepository, ResolutionEffects,
};

const REPORT_COLUMNS: &str = "id, reporter_id, target_type, target_id, reason, status, \
     resolution_note, resolved_by, resolved_at, created_at";

const SUSPENSION_COLUMNS: &str = "id, user_id, reason, start_date, end_date, lifted_at, created_by";

#[derive(sqlx::FromRow)]
struct ReportRow {
    id: Uuid,
    reporter_id: Uuid,
    target_type: ReportTarget,
    target_id: Uuid,
    reason: String,
    status: ReportStatus,
    resolution_note: Option<String>,
    resolved_by: Option<Uuid>,
    resolved_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<ReportRow> for Report {
    fn from(r: ReportRow) -> Self {
        Report {
            id: r.id,
            reporter_id: r.reporter_id,
            target_type: r.target_type,
            target_id: r.target_id,
            reason: r.reason,
            status: r.status,
            resolution_note: r.resolution_note,
            resolved_by: r.resolved_by,
            resolved_at: r.resolved_at,
            created_at: r.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SuspensionRow {
    id: Uuid,
    user_id: Uuid,
    reason: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    lifted_at: Option<DateTime<Utc>>,
    created_by: Option<Uuid>,
}

impl From<SuspensionRow> for Suspension {
    fn from(r: SuspensionRow) -> Self {
        Suspension {
            id: r.id,
            user_id: r.user_id,
            reason: r.reason,
            start_date: r.start_date,
            end_date: r.end_date,
            lifted_at: r.lifted_at,
            created_by: r.created_by,
        }
    }
}

async fn insert_suspension<'e, E>(executor: E, suspension: &Suspension) -> AppResult<()>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO suspensions (id, user_id, reason, start_date, end_date, lifted_at, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(suspension.id)
    .bind(suspension.user_id)
    .bind(&suspension.reason)
    .bind(suspension.start_date)
    .bind(suspension.end_date)
    .bind(suspension.lifted_at)
    .bind(suspension.created_by)
    .execute(executor)
    .await?;
    Ok(())
}

/// PostgreSQL implementation of ModerationRepository
pub struct PostgresModerationRepository {
    pool: PgPool,
}

impl PostgresModerationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ModerationRepository for PostgresModerationRepository {
    async fn content_owner(&self, target: ReportTarget, id: Uuid) -> AppResult<Option<Uuid>> {
        let sql = match target.content_table() {
            Some(table) => format!(
                "SELECT user_id FROM {} WHERE id = $1 AND NOT is_deleted",
                table
            ),
            None => "SELECT id FROM users WHERE id = $1 AND NOT is_deleted".to_string(),
        };
        let owner = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(owner)
    }

    async fn create_report(&self, report: &Report) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO reports (id, reporter_id, target_type, target_id, reason, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(report.id)
        .bind(report.reporter_id)
        .bind(report.target_type)
        .bind(report.target_id)
        .bind(&report.reason)
        .bind(report.status)
        .bind(report.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => {
                AppError::conflict("You already have a pending report for this content")
            }
            other => other,
        })?;
        Ok(())
    }

    async fn find_report(&self, id: Uuid) -> AppResult<Option<Report>> {
        let sql = format!("SELECT {} FROM reports WHERE id = $1", REPORT_COLUMNS);
        Ok(sqlx::query_as::<_, ReportRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Report::from))
    }

    async fn list_reports(
        &self,
        status: Option<ReportStatus>,
        page: PageRequest,
    ) -> AppResult<Page<Report>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reports WHERE ($1::report_status IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            "SELECT {} FROM reports WHERE ($1::report_status IS NULL OR status = $1) \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
            REPORT_COLUMNS
        );
        let rows = sqlx::query_as::<_, ReportRow>(&sql)
            .bind(status)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(
            rows.into_iter().map(Report::from).collect(),
            total,
            page,
        ))
    }

    async fn close_report(&self, report: &Report, effects: &ResolutionEffects) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        // Claim first so concurrent resolves cannot both apply effects
        let claimed = sqlx::query(
            r#"
            UPDATE reports
            SET status = $2, resolution_note = $3, resolved_by = $4, resolved_at = $5,
                updated_at = NOW()
            WHERE id = $1 AND status = $6
            "#,
        )
        .bind(report.id)
        .bind(report.status)
        .bind(&report.resolution_note)
        .bind(report.resolved_by)
        .bind(report.resolved_at)
        .bind(ReportStatus::Pending)
        .execute(&mut *tx)
        .await?;
        if claimed.rows_affected() == 0 {
            return Ok(false);
        }

        if let Some((target, id)) = effects.hide {
            let table = target
                .content_table()
                .ok_or_else(|| AppError::bad_request("Users cannot be hidden"))?;
            let sql = format!(
                "UPDATE {} SET is_hidden = TRUE, updated_at = NOW() WHERE id = $1 AND NOT is_deleted",
                table
            );
            let hidden = sqlx::query(&sql).bind(id).execute(&mut *tx).await?;
            if hidden.rows_affected() == 0 {
                return Err(AppError::not_found("Reported content no longer exists"));
            }
        }
        if let Some(suspension) = &effects.suspension {
            insert_suspension(&mut *tx, suspension).await?;
        }
        if let Some(violation) = &effects.violation {
            sqlx::query(
                "INSERT INTO violations (id, user_id, report_id, reason, created_at) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(violation.id)
            .bind(violation.user_id)
            .bind(violation.report_id)
            .bind(&violation.reason)
            .bind(violation.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn set_hidden(&self, target: ReportTarget, id: Uuid, hidden: bool) -> AppResult<bool> {
        let table = target
            .content_table()
            .ok_or_else(|| AppError::bad_request("Users cannot be hidden"))?;
        let sql = format!(
            "UPDATE {} SET is_hidden = $2, updated_at = NOW() WHERE id = $1 AND NOT is_deleted",
            table
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(hidden)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn count_violations_since(&self, user_id: Uuid, since: DateTime<Utc>) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM violations WHERE user_id = $1 AND created_at >= $2",
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn create_suspension(&self, suspension: &Suspension) -> AppResult<()> {
        insert_suspension(&self.pool, suspension).await
    }

    async fn active_suspension(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Suspension>> {
        let sql = format!(
            "SELECT {} FROM suspensions \
             WHERE user_id = $1 AND lifted_at IS NULL AND start_date <= $2 AND end_date > $2 \
             ORDER BY end_date DESC LIMIT 1",
            SUSPENSION_COLUMNS
        );
        Ok(sqlx::query_as::<_, SuspensionRow>(&sql)
            .bind(user_id)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?
            .map(Suspension::from))
    }

    async fn list_active_suspensions(
        &self,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> AppResult<Page<Suspension>> {
        let filter = "lifted_at IS NULL AND start_date <= $1 AND end_date > $1";
        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM suspensions WHERE {}", filter))
                .bind(now)
                .fetch_one(&self.pool)
                .await?;

        let sql = format!(
            "SELECT {} FROM suspensions WHERE {} ORDER BY end_date LIMIT $2 OFFSET $3",
            SUSPENSION_COLUMNS, filter
        );
        let rows = sqlx::query_as::<_, SuspensionRow>(&sql)
            .bind(now)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(
            rows.into_iter().map(Suspension::from).collect(),
            total,
            page,
        ))
    }

    async fn lift_suspension(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE suspensions SET lifted_at = $2, updated_at = NOW() \
             WHERE id = $1 AND lifted_at IS NULL",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
