use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::errors::{AppError, AppResult};
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::repositories::post_repository::PostRepository;
use crate::domain::social::engagement::Engagement;
use crate::domain::social::post::{Post, PostView};

const POST_COLUMNS: &str =
    "id, user_id, body, image_urls, outfit_id, hashtags, is_hidden, created_at, updated_at";

/// Which posts a listing covers
enum Scope<'a> {
    Feed,
    Author(Uuid),
    Hashtag(&'a str),
    Saved,
}

/// Post columns plus author and engagement as seen by `viewer`
fn push_view_select(qb: &mut QueryBuilder<'_, Postgres>, viewer: Uuid) {
    qb.push(
        r#"
        SELECT p.id, p.user_id, p.body, p.image_urls, p.outfit_id, p.hashtags, p.is_hidden,
            p.created_at, p.updated_at,
            u.display_name AS author_name, u.avatar_url AS author_avatar_url,
            (SELECT COUNT(*) FROM likes l
                WHERE l.target_type = 'post' AND l.target_id = p.id) AS like_count,
            (SELECT COUNT(*) FROM comments c
                WHERE c.target_type = 'post' AND c.target_id = p.id
                AND NOT c.is_deleted AND NOT c.is_hidden) AS comment_count,
            (SELECT COUNT(*) FROM saves s
                WHERE s.target_type = 'post' AND s.target_id = p.id) AS save_count,
            EXISTS (SELECT 1 FROM likes l
                WHERE l.target_type = 'post' AND l.target_id = p.id AND l.user_id = "#,
    )
    .push_bind(viewer)
    .push(
        r#") AS is_liked,
            EXISTS (SELECT 1 FROM saves s
                WHERE s.target_type = 'post' AND s.target_id = p.id AND s.user_id = "#,
    )
    .push_bind(viewer)
    .push(") AS is_saved FROM posts p JOIN users u ON u.id = p.user_id");
}

/// Joins and WHERE clause restricting a listing to visible posts in scope
fn push_scope(qb: &mut QueryBuilder<'_, Postgres>, viewer: Uuid, scope: &Scope<'_>) {
    if let Scope::Saved = scope {
        qb.push(" JOIN saves sv ON sv.target_type = 'post' AND sv.target_id = p.id AND sv.user_id = ")
            .push_bind(viewer);
    }
    qb.push(" WHERE NOT p.is_deleted AND NOT p.is_hidden AND NOT u.is_deleted");
    match scope {
        Scope::Feed => {
            qb.push(" AND (p.user_id = ")
                .push_bind(viewer)
                .push(" OR p.user_id IN (SELECT f.followee_id FROM follows f WHERE f.follower_id = ")
                .push_bind(viewer)
                .push("))");
        }
        Scope::Author(author) => {
            qb.push(" AND p.user_id = ").push_bind(*author);
        }
        Scope::Hashtag(tag) => {
            qb.push(" AND ").push_bind(tag.to_string()).push(" = ANY(p.hashtags)");
        }
        Scope::Saved => {}
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    user_id: Uuid,
    body: String,
    image_urls: Vec<String>,
    outfit_id: Option<Uuid>,
    hashtags: Vec<String>,
    is_hidden: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(r: PostRow) -> Self {
        Post {
            id: r.id,
            user_id: r.user_id,
            body: r.body,
            image_urls: r.image_urls,
            outfit_id: r.outfit_id,
            hashtags: r.hashtags,
            is_hidden: r.is_hidden,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PostViewRow {
    #[sqlx(flatten)]
    post: PostRow,
    author_name: String,
    author_avatar_url: Option<String>,
    #[sqlx(flatten)]
    engagement: Engagement,
}

impl From<PostViewRow> for PostView {
    fn from(r: PostViewRow) -> Self {
        PostView {
            post: r.post.into(),
            author_name: r.author_name,
            author_avatar_url: r.author_avatar_url,
            engagement: r.engagement,
        }
    }
}

/// PostgreSQL implementation of PostRepository
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn page_of_views(
        &self,
        viewer: Uuid,
        scope: Scope<'_>,
        page: PageRequest,
    ) -> AppResult<Page<PostView>> {
        let mut count =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts p JOIN users u ON u.id = p.user_id");
        push_scope(&mut count, viewer, &scope);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("");
        push_view_select(&mut select, viewer);
        push_scope(&mut select, viewer, &scope);
        select.push(match scope {
            Scope::Saved => " ORDER BY sv.created_at DESC",
            _ => " ORDER BY p.created_at DESC",
        });
        select
            .push(" LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows = select
            .build_query_as::<PostViewRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(
            rows.into_iter().map(PostView::from).collect(),
            total,
            page,
        ))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: &Post) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (
                id, user_id, body, image_urls, outfit_id, hashtags, is_hidden, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(post.id)
        .bind(post.user_id)
        .bind(&post.body)
        .bind(&post.image_urls)
        .bind(post.outfit_id)
        .bind(&post.hashtags)
        .bind(post.is_hidden)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Post>> {
        let sql = format!(
            "SELECT {} FROM posts WHERE id = $1 AND NOT is_deleted",
            POST_COLUMNS
        );
        Ok(sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Post::from))
    }

    async fn view(&self, id: Uuid, viewer: Uuid) -> AppResult<Option<PostView>> {
        let mut select = QueryBuilder::<Postgres>::new("");
        push_view_select(&mut select, viewer);
        select
            .push(" WHERE NOT p.is_deleted AND p.id = ")
            .push_bind(id);
        Ok(select
            .build_query_as::<PostViewRow>()
            .fetch_optional(&self.pool)
            .await?
            .map(PostView::from))
    }

    async fn feed(&self, viewer: Uuid, page: PageRequest) -> AppResult<Page<PostView>> {
        self.page_of_views(viewer, Scope::Feed, page).await
    }

    async fn list_by_author(
        &self,
        author: Uuid,
        viewer: Uuid,
        page: PageRequest,
    ) -> AppResult<Page<PostView>> {
        self.page_of_views(viewer, Scope::Author(author), page).await
    }

    async fn list_by_hashtag(
        &self,
        hashtag: &str,
        viewer: Uuid,
        page: PageRequest,
    ) -> AppResult<Page<PostView>> {
        self.page_of_views(viewer, Scope::Hashtag(hashtag), page).await
    }

    async fn list_saved(&self, viewer: Uuid, page: PageRequest) -> AppResult<Page<PostView>> {
        self.page_of_views(viewer, Scope::Saved, page).await
    }

    async fn update(&self, post: &Post) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET body = $2, image_urls = $3, outfit_id = $4, hashtags = $5, updated_at = $6
            WHERE id = $1 AND NOT is_deleted
            "#,
        )
        .bind(post.id)
        .bind(&post.body)
        .bind(&post.image_urls)
        .bind(post.outfit_id)
        .bind(&post.hashtags)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Post not found"));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE posts SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Post not found"));
        }
        Ok(())
    }
}
