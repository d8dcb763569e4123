use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::taxonomy::Season;
use crate::domain::errors::{validate_length, AppError, AppResult};

/// A clothing item in a user's wardrobe
#[derive(Debug, Clone, Serialize)]
pub struct Item {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub category_id: Uuid,
    pub color: Option<String>,
    pub brand: Option<String>,
    pub material: Option<String>,
    pub image_url: Option<String>,
    pub seasons: Vec<Season>,
    pub occasion_ids: Vec<Uuid>,
    pub style_ids: Vec<Uuid>,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client input for creating or replacing an item
#[derive(Debug, Clone, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    pub category_id: Uuid,
    pub color: Option<String>,
    pub brand: Option<String>,
    pub material: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub seasons: Vec<Season>,
    #[serde(default)]
    pub occasion_ids: Vec<Uuid>,
    #[serde(default)]
    pub style_ids: Vec<Uuid>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
}

impl ItemDraft {
    /// Validates field lengths and normalizes list fields
    ///
    /// Duplicate seasons and ids are dropped, keeping first occurrence.
    pub fn normalize(mut self) -> AppResult<Self> {
        validate_length("Item name", &self.name, 1, 100)?;
        self.name = self.name.trim().to_string();
        self.color = optional_text("Color", self.color, 50)?;
        self.brand = optional_text("Brand", self.brand, 100)?;
        self.material = optional_text("Material", self.material, 100)?;
        self.image_url = validate_image_url(self.image_url)?;
        dedup(&mut self.seasons);
        dedup(&mut self.occasion_ids);
        dedup(&mut self.style_ids);
        Ok(self)
    }

    pub fn into_item(self, user_id: Uuid, now: DateTime<Utc>) -> Item {
        Item {
            id: Uuid::new_v4(),
            user_id,
            name: self.name,
            category_id: self.category_id,
            color: self.color,
            brand: self.brand,
            material: self.material,
            image_url: self.image_url,
            seasons: self.seasons,
            occasion_ids: self.occasion_ids,
            style_ids: self.style_ids,
            is_favorite: self.is_favorite.unwrap_or(false),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Filters for listing a wardrobe
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemFilter {
    pub category_id: Option<Uuid>,
    pub season: Option<Season>,
    pub occasion_id: Option<Uuid>,
    pub style_id: Option<Uuid>,
    pub is_favorite: Option<bool>,
    pub search: Option<String>,
}

/// Trims an optional text field; blank becomes `None`
pub fn optional_text(field: &str, value: Option<String>, max: usize) -> AppResult<Option<String>> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if v.is_empty() => Ok(None),
        Some(v) if v.chars().count() > max => Err(AppError::bad_request(format!(
            "{} must be at most {} characters",
            field, max
        ))),
        other => Ok(other),
    }
}

/// Image URLs are supplied by the client after uploading elsewhere
pub fn validate_image_url(url: Option<String>) -> AppResult<Option<String>> {
    match optional_text("Image URL", url, 2048)? {
        Some(u) if !(u.starts_with("https://") || u.starts_with("http://")) => {
            Err(AppError::bad_request("Image URL must be an http(s) URL"))
        }
        other => Ok(other),
    }
}

pub(crate) fn dedup<T: PartialEq + Copy>(values: &mut Vec<T>) {
    let mut seen: Vec<T> = Vec::with_capacity(values.len());
    values.retain(|v| {
        if seen.contains(v) {
            false
        } else {
            seen.push(*v);
            true
        }
    });
}
