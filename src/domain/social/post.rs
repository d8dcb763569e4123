use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::engagement::Engagement;
use crate::domain::errors::{validate_length, AppError, AppResult};
use crate::domain::wardrobe::item::validate_image_url;

pub const MAX_POST_IMAGES: usize = 10;
pub const MAX_HASHTAG_LEN: usize = 30;

#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub body: String,
    pub image_urls: Vec<String>,
    pub outfit_id: Option<Uuid>,
    pub hashtags: Vec<String>,
    pub is_hidden: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A post together with its author and the viewer's engagement
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub author_name: String,
    pub author_avatar_url: Option<String>,
    #[serde(flatten)]
    pub engagement: Engagement,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostDraft {
    pub body: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub outfit_id: Option<Uuid>,
}

impl PostDraft {
    pub fn normalize(mut self) -> AppResult<Self> {
        validate_length("Post body", &self.body, 1, 2000)?;
        self.body = self.body.trim().to_string();
        if self.image_urls.len() > MAX_POST_IMAGES {
            return Err(AppError::bad_request(format!(
                "A post can have at most {} images",
                MAX_POST_IMAGES
            )));
        }
        self.image_urls = self
            .image_urls
            .into_iter()
            .map(|url| validate_image_url(Some(url)))
            .collect::<AppResult<Vec<_>>>()?
            .into_iter()
            .flatten()
            .collect();
        Ok(self)
    }

    pub fn into_post(self, user_id: Uuid, now: DateTime<Utc>) -> Post {
        let hashtags = extract_hashtags(&self.body);
        Post {
            id: Uuid::new_v4(),
            user_id,
            body: self.body,
            image_urls: self.image_urls,
            outfit_id: self.outfit_id,
            hashtags,
            is_hidden: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Extracts `#tags` from free text
///
/// A tag is `#` followed by letters, digits or underscores. Tags are
/// lowercased, deduplicated in order of first appearance, and tags longer
/// than `MAX_HASHTAG_LEN` are dropped.
pub fn extract_hashtags(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    let mut chars = text.char_indices().peekable();
    let mut prev: Option<char> = None;

    while let Some((_, c)) = chars.next() {
        // "a#b" is not a tag; the '#' must start a word
        if c == '#' && !prev.map_or(false, is_tag_char) {
            let mut tag = String::new();
            while let Some(&(_, next)) = chars.peek() {
                if is_tag_char(next) {
                    tag.extend(next.to_lowercase());
                    chars.next();
                } else {
                    break;
                }
            }
            let len = tag.chars().count();
            if len > 0 && len <= MAX_HASHTAG_LEN && !tags.contains(&tag) {
                tags.push(tag);
            }
            prev = Some('#');
            continue;
        }
        prev = Some(c);
    }
    tags
}

/// Normalizes a hashtag taken from a URL path (`#Summer` or `summer`)
pub fn normalize_hashtag(tag: &str) -> Option<String> {
    let tag = tag.trim().trim_start_matches('#').to_lowercase();
    let len = tag.chars().count();
    (len > 0 && len <= MAX_HASHTAG_LEN && tag.chars().all(is_tag_char)).then_some(tag)
}

fn is_tag_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
