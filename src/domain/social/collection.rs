use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::engagement::Engagement;
use crate::domain::errors::{validate_length, AppError, AppResult};
use crate::domain::wardrobe::item::{dedup, optional_text};

pub const MAX_COLLECTION_OUTFITS: usize = 50;

/// A curated, publishable grouping of outfits
#[derive(Debug, Clone, Serialize)]
pub struct Collection {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub outfit_ids: Vec<Uuid>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub is_hidden: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Collection {
    /// Whether `viewer` may see this collection
    ///
    /// Hidden collections are reserved for admins; drafts for their owner.
    pub fn visible_to(&self, viewer: Uuid, is_admin: bool) -> bool {
        if is_admin {
            return true;
        }
        if self.is_hidden {
            return false;
        }
        self.is_published || self.user_id == viewer
    }

    pub fn publish(&mut self, now: DateTime<Utc>) {
        if !self.is_published {
            self.is_published = true;
            self.published_at = Some(now);
        }
        self.updated_at = now;
    }

    pub fn unpublish(&mut self, now: DateTime<Utc>) {
        self.is_published = false;
        self.published_at = None;
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionView {
    #[serde(flatten)]
    pub collection: Collection,
    pub author_name: String,
    #[serde(flatten)]
    pub engagement: Engagement,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionDraft {
    pub title: String,
    pub description: Option<String>,
    pub outfit_ids: Vec<Uuid>,
}

impl CollectionDraft {
    pub fn normalize(mut self) -> AppResult<Self> {
        validate_length("Collection title", &self.title, 1, 100)?;
        self.title = self.title.trim().to_string();
        self.description = optional_text("Description", self.description, 2000)?;
        dedup(&mut self.outfit_ids);
        if self.outfit_ids.is_empty() {
            return Err(AppError::bad_request("A collection needs at least one outfit"));
        }
        if self.outfit_ids.len() > MAX_COLLECTION_OUTFITS {
            return Err(AppError::bad_request(format!(
                "A collection can have at most {} outfits",
                MAX_COLLECTION_OUTFITS
            )));
        }
        Ok(self)
    }

    pub fn into_collection(self, user_id: Uuid, now: DateTime<Utc>) -> Collection {
        Collection {
            id: Uuid::new_v4(),
            user_id,
            title: self.title,
            description: self.description,
            outfit_ids: self.outfit_ids,
            is_published: false,
            published_at: None,
            is_hidden: false,
            created_at: now,
            updated_at: now,
        }
    }
}
