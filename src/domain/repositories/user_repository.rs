use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{validate_length, AppResult};
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::user::value_objects::{Email, Role};
use crate::domain::wardrobe::item::{dedup, optional_text, validate_image_url};

/// User data for persistence
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: Email,
    pub password_hash: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub is_premium: bool,
    pub job_id: Option<Uuid>,
    pub style_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable profile fields
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdate {
    pub display_name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub job_id: Option<Uuid>,
    #[serde(default)]
    pub style_ids: Vec<Uuid>,
}

impl ProfileUpdate {
    /// Trims text fields and drops duplicate styles
    ///
    /// Whether `job_id` and `style_ids` exist is checked against the taxonomy by the caller.
    pub fn normalize(mut self) -> AppResult<Self> {
        validate_length("Display name", &self.display_name, 1, 50)?;
        self.display_name = self.display_name.trim().to_string();
        self.bio = optional_text("Bio", self.bio, 500)?;
        self.avatar_url = validate_image_url(self.avatar_url)?;
        dedup(&mut self.style_ids);
        Ok(self)
    }
}

/// Minimal user card used in follower lists and authorship
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub is_premium: bool,
}

/// Profile as seen by another user
#[derive(Debug, Clone, Serialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub display_name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub is_premium: bool,
    pub follower_count: i64,
    pub following_count: i64,
    pub post_count: i64,
    pub is_following: bool,
}

/// Repository trait for User aggregate
///
/// Soft-deleted users are invisible to every method.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user; a live account with the same email is a conflict
    async fn create(&self, user: &User) -> AppResult<()>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> AppResult<Option<User>>;

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> AppResult<User>;

    async fn update_last_login(&self, id: Uuid) -> AppResult<()>;

    async fn public_profile(&self, id: Uuid, viewer: Uuid) -> AppResult<Option<PublicProfile>>;

    /// Admin listing, matching email or display name case-insensitively
    async fn search(&self, search: Option<&str>, page: PageRequest) -> AppResult<Page<User>>;
}
