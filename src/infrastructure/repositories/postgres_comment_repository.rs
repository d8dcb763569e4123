use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::errors::{AppError, AppResult};
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::repositories::comment_repository::CommentRepository;
use crate::domain::social::comment::{Comment, CommentView};
use crate::domain::social::engagement::EngagementTarget;

const COMMENT_COLUMNS: &str =
    "id, user_id, target_type, target_id, parent_id, body, is_hidden, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    user_id: Uuid,
    target_type: EngagementTarget,
    target_id: Uuid,
    parent_id: Option<Uuid>,
    body: String,
    is_hidden: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(r: CommentRow) -> Self {
        Comment {
            id: r.id,
            user_id: r.user_id,
            target_type: r.target_type,
            target_id: r.target_id,
            parent_id: r.parent_id,
            body: r.body,
            is_hidden: r.is_hidden,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentViewRow {
    #[sqlx(flatten)]
    comment: CommentRow,
    author_name: String,
    author_avatar_url: Option<String>,
}

pub struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create(&self, comment: &Comment) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO comments (
                id, user_id, target_type, target_id, parent_id, body, is_hidden, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(comment.id)
        .bind(comment.user_id)
        .bind(comment.target_type)
        .bind(comment.target_id)
        .bind(comment.parent_id)
        .bind(&comment.body)
        .bind(comment.is_hidden)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Comment>> {
        let sql = format!(
            "SELECT {} FROM comments WHERE id = $1 AND NOT is_deleted",
            COMMENT_COLUMNS
        );
        Ok(sqlx::query_as::<_, CommentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Comment::from))
    }

    async fn list(
        &self,
        target: EngagementTarget,
        target_id: Uuid,
        page: PageRequest,
    ) -> AppResult<Page<CommentView>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM comments \
             WHERE target_type = $1 AND target_id = $2 AND NOT is_deleted AND NOT is_hidden",
        )
        .bind(target)
        .bind(target_id)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, CommentViewRow>(
            r#"
            SELECT c.id, c.user_id, c.target_type, c.target_id, c.parent_id, c.body, c.is_hidden,
                c.created_at, c.updated_at,
                u.display_name AS author_name, u.avatar_url AS author_avatar_url
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.target_type = $1 AND c.target_id = $2 AND NOT c.is_deleted AND NOT c.is_hidden
            ORDER BY c.created_at
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(target)
        .bind(target_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(|r| CommentView {
                comment: r.comment.into(),
                author_name: r.author_name,
                author_avatar_url: r.author_avatar_url,
            })
            .collect();
        Ok(Page::new(items, total, page))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE comments SET is_deleted = TRUE, updated_at = NOW() \
             WHERE (id = $1 OR parent_id = $1) AND NOT is_deleted",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Comment not found"));
        }
        Ok(())
    }
}
