use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::errors::{AppError, AppResult};
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::repositories::user_repository::{
    ProfileUpdate, PublicProfile, User, UserRepository,
};
use crate::domain::user::value_objects::{Email, Role};

const USER_COLUMNS: &str = "id, email, password_hash, display_name, bio, avatar_url, role, \
     is_premium, job_id, style_ids, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    display_name: String,
    bio: Option<String>,
    avatar_url: Option<String>,
    role: Role,
    is_premium: bool,
    job_id: Option<Uuid>,
    style_ids: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let email = Email::new(&r.email)
            .map_err(|e| AppError::internal(format!("Invalid email from database: {}", e)))?;
        Ok(User {
            id: r.id,
            email,
            password_hash: r.password_hash,
            display_name: r.display_name,
            bio: r.bio,
            avatar_url: r.avatar_url,
            role: r.role,
            is_premium: r.is_premium,
            job_id: r.job_id,
            style_ids: r.style_ids,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    display_name: String,
    bio: Option<String>,
    avatar_url: Option<String>,
    is_premium: bool,
    follower_count: i64,
    following_count: i64,
    post_count: i64,
    is_following: bool,
}

/// PostgreSQL implementation of UserRepository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new PostgresUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, password_hash, display_name, bio, avatar_url, role,
                is_premium, job_id, style_ids, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(user.id)
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(&user.bio)
        .bind(&user.avatar_url)
        .bind(user.role)
        .bind(user.is_premium)
        .bind(user.job_id)
        .bind(&user.style_ids)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => AppError::conflict("Email is already registered"),
            other => other,
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE id = $1 AND NOT is_deleted",
            USER_COLUMNS
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AppResult<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE LOWER(email) = $1 AND NOT is_deleted",
            USER_COLUMNS
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> AppResult<User> {
        let sql = format!(
            r#"
            UPDATE users
            SET display_name = $2, bio = $3, avatar_url = $4, job_id = $5,
                style_ids = $6, updated_at = NOW()
            WHERE id = $1 AND NOT is_deleted
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(&update.display_name)
            .bind(&update.bio)
            .bind(&update.avatar_url)
            .bind(update.job_id)
            .bind(&update.style_ids)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
            .and_then(User::try_from)
    }

    async fn update_last_login(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn public_profile(&self, id: Uuid, viewer: Uuid) -> AppResult<Option<PublicProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT u.id, u.display_name, u.bio, u.avatar_url, u.is_premium,
                (SELECT COUNT(*) FROM follows f WHERE f.followee_id = u.id) AS follower_count,
                (SELECT COUNT(*) FROM follows f WHERE f.follower_id = u.id) AS following_count,
                (SELECT COUNT(*) FROM posts p
                    WHERE p.user_id = u.id AND NOT p.is_deleted AND NOT p.is_hidden) AS post_count,
                EXISTS (SELECT 1 FROM follows f
                    WHERE f.follower_id = $2 AND f.followee_id = u.id) AS is_following
            FROM users u
            WHERE u.id = $1 AND NOT u.is_deleted
            "#,
        )
        .bind(id)
        .bind(viewer)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| PublicProfile {
            id: r.id,
            display_name: r.display_name,
            bio: r.bio,
            avatar_url: r.avatar_url,
            is_premium: r.is_premium,
            follower_count: r.follower_count,
            following_count: r.following_count,
            post_count: r.post_count,
            is_following: r.is_following,
        }))
    }

    async fn search(&self, search: Option<&str>, page: PageRequest) -> AppResult<Page<User>> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));
        let filter = "NOT is_deleted AND ($1::TEXT IS NULL OR email ILIKE $1 OR display_name ILIKE $1)";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users WHERE {}", filter))
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT {} FROM users WHERE {} ORDER BY created_at DESC LIMIT $2 OFFSET $3",
            USER_COLUMNS, filter
        );
        let users = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&pattern)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Page::new(users, total, page))
    }
}
