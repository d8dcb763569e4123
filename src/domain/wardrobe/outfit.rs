use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::item::{dedup, optional_text, Item};
use super::taxonomy::Season;
use crate::domain::errors::{validate_length, AppError, AppResult};

pub const MAX_OUTFIT_ITEMS: usize = 12;
pub const MAX_SUGGESTED_CATEGORIES: usize = 6;

/// A named set of wardrobe items
#[derive(Debug, Clone, Serialize)]
pub struct Outfit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub item_ids: Vec<Uuid>,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutfitDraft {
    pub name: String,
    pub description: Option<String>,
    pub item_ids: Vec<Uuid>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
}

impl OutfitDraft {
    /// # Business Rules Enforced
    /// - Name is 1..=100 characters
    /// - Between 1 and 12 distinct items
    ///
    /// Ownership of the items is checked by the caller against storage.
    pub fn normalize(mut self) -> AppResult<Self> {
        validate_length("Outfit name", &self.name, 1, 100)?;
        self.name = self.name.trim().to_string();
        self.description = optional_text("Description", self.description, 1000)?;
        dedup(&mut self.item_ids);
        if self.item_ids.is_empty() {
            return Err(AppError::bad_request("An outfit needs at least one item"));
        }
        if self.item_ids.len() > MAX_OUTFIT_ITEMS {
            return Err(AppError::bad_request(format!(
                "An outfit can have at most {} items",
                MAX_OUTFIT_ITEMS
            )));
        }
        Ok(self)
    }

    pub fn into_outfit(self, user_id: Uuid, now: DateTime<Utc>) -> Outfit {
        Outfit {
            id: Uuid::new_v4(),
            user_id,
            name: self.name,
            description: self.description,
            item_ids: self.item_ids,
            is_favorite: self.is_favorite.unwrap_or(false),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SuggestionRequest {
    pub season: Option<Season>,
    pub occasion_id: Option<Uuid>,
}

/// Picks one item per category from a wardrobe
///
/// Items with no seasons or occasions match any filter. Within a category
/// the winner has the most styles in common with `preferred_styles`, then
/// is a favorite, then is newest. Categories keep the order in which they
/// first appear in `items`; at most `MAX_SUGGESTED_CATEGORIES` are returned.
pub fn suggest_outfit(
    items: &[Item],
    request: SuggestionRequest,
    preferred_styles: &[Uuid],
) -> Vec<Item> {
    let mut picks: Vec<&Item> = Vec::new();
    for item in items.iter().filter(|i| matches_request(i, request)) {
        match picks.iter().position(|p| p.category_id == item.category_id) {
            Some(idx) => {
                if score(item, preferred_styles) > score(picks[idx], preferred_styles) {
                    picks[idx] = item;
                }
            }
            None if picks.len() < MAX_SUGGESTED_CATEGORIES => picks.push(item),
            None => {}
        }
    }
    picks.into_iter().cloned().collect()
}

fn matches_request(item: &Item, request: SuggestionRequest) -> bool {
    let season_ok = match request.season {
        Some(season) => item.seasons.is_empty() || item.seasons.contains(&season),
        None => true,
    };
    let occasion_ok = match request.occasion_id {
        Some(occasion) => item.occasion_ids.is_empty() || item.occasion_ids.contains(&occasion),
        None => true,
    };
    season_ok && occasion_ok
}

fn score(item: &Item, preferred_styles: &[Uuid]) -> (usize, bool, DateTime<Utc>) {
    let overlap = item
        .style_ids
        .iter()
        .filter(|s| preferred_styles.contains(s))
        .count();
    (overlap, item.is_favorite, item.created_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn item(category: Uuid, age_days: i64) -> Item {
        let created = Utc::now() - Duration::days(age_days);
        Item {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: "item".to_string(),
            category_id: category,
            color: None,
            brand: None,
            material: None,
            image_url: None,
            seasons: vec![],
            occasion_ids: vec![],
            style_ids: vec![],
            is_favorite: false,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn draft_requires_items() {
        let d = OutfitDraft {
            name: "Weekend".to_string(),
            description: None,
            item_ids: vec![],
            is_favorite: None,
        };
        assert!(d.normalize().is_err());
    }

    #[test]
    fn draft_dedups_before_counting() {
        let id = Uuid::new_v4();
        let d = OutfitDraft {
            name: "Weekend".to_string(),
            description: None,
            item_ids: vec![id; 20],
            is_favorite: None,
        }
        .normalize()
        .unwrap();
        assert_eq!(d.item_ids, vec![id]);
    }

    #[test]
    fn draft_rejects_too_many_items() {
        let d = OutfitDraft {
            name: "Everything".to_string(),
            description: None,
            item_ids: (0..13).map(|_| Uuid::new_v4()).collect(),
            is_favorite: None,
        };
        assert!(d.normalize().is_err());
    }

    #[test]
    fn suggestion_takes_one_item_per_category() {
        let tops = Uuid::new_v4();
        let shoes = Uuid::new_v4();
        let items = vec![item(tops, 1), item(shoes, 2), item(tops, 3)];
        let picked = suggest_outfit(&items, SuggestionRequest::default(), &[]);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0].id, items[0].id);
        assert_eq!(picked[1].category_id, shoes);
    }

    #[test]
    fn suggestion_prefers_style_overlap_then_favorite() {
        let tops = Uuid::new_v4();
        let minimal = Uuid::new_v4();
        let newest = item(tops, 0);
        let mut favorite = item(tops, 5);
        favorite.is_favorite = true;
        let mut styled = item(tops, 10);
        styled.style_ids = vec![minimal];

        let items = vec![newest.clone(), favorite.clone(), styled.clone()];
        let picked = suggest_outfit(&items, SuggestionRequest::default(), &[minimal]);
        assert_eq!(picked[0].id, styled.id);

        let picked = suggest_outfit(&items, SuggestionRequest::default(), &[]);
        assert_eq!(picked[0].id, favorite.id);
    }

    #[test]
    fn suggestion_filters_by_season_with_untagged_items_matching() {
        let tops = Uuid::new_v4();
        let coats = Uuid::new_v4();
        let mut summer_top = item(tops, 1);
        summer_top.seasons = vec![Season::Summer];
        let mut winter_coat = item(coats, 1);
        winter_coat.seasons = vec![Season::Winter];
        let untagged = item(Uuid::new_v4(), 1);

        let request = SuggestionRequest {
            season: Some(Season::Summer),
            occasion_id: None,
        };
        let picked = suggest_outfit(&[summer_top.clone(), winter_coat, untagged.clone()], request, &[]);
        let ids: Vec<Uuid> = picked.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![summer_top.id, untagged.id]);
    }

    #[test]
    fn suggestion_filters_by_occasion() {
        let work = Uuid::new_v4();
        let mut office = item(Uuid::new_v4(), 1);
        office.occasion_ids = vec![work];
        let mut gym = item(Uuid::new_v4(), 1);
        gym.occasion_ids = vec![Uuid::new_v4()];

        let request = SuggestionRequest {
            season: None,
            occasion_id: Some(work),
        };
        let picked = suggest_outfit(&[office.clone(), gym], request, &[]);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].id, office.id);
    }

    #[test]
    fn suggestion_caps_category_count() {
        let items: Vec<Item> = (0..10).map(|_| item(Uuid::new_v4(), 1)).collect();
        let picked = suggest_outfit(&items, SuggestionRequest::default(), &[]);
        assert_eq!(picked.len(), MAX_SUGGESTED_CATEGORIES);
    }

    #[test]
    fn suggestion_empty_wardrobe() {
        assert!(suggest_outfit(&[], SuggestionRequest::default(), &[]).is_empty());
    }
}
