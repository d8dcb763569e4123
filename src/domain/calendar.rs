use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{validate_length, AppError, AppResult};
use crate::domain::wardrobe::item::{dedup, optional_text};

pub const MAX_RANGE_DAYS: i64 = 366;

/// A planned occasion on the user's calendar with the outfits for it
#[derive(Debug, Clone, Serialize)]
pub struct CalendarEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub occasion_id: Option<Uuid>,
    pub event_date: NaiveDate,
    pub note: Option<String>,
    pub outfit_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarEventDraft {
    pub name: String,
    pub occasion_id: Option<Uuid>,
    pub event_date: NaiveDate,
    pub note: Option<String>,
    #[serde(default)]
    pub outfit_ids: Vec<Uuid>,
}

impl CalendarEventDraft {
    pub fn normalize(mut self) -> AppResult<Self> {
        validate_length("Event name", &self.name, 1, 100)?;
        self.name = self.name.trim().to_string();
        self.note = optional_text("Note", self.note, 1000)?;
        dedup(&mut self.outfit_ids);
        Ok(self)
    }

    pub fn into_event(self, user_id: Uuid, now: DateTime<Utc>) -> CalendarEvent {
        CalendarEvent {
            id: Uuid::new_v4(),
            user_id,
            name: self.name,
            occasion_id: self.occasion_id,
            event_date: self.event_date,
            note: self.note,
            outfit_ids: self.outfit_ids,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Inclusive date window for calendar queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn validate(self) -> AppResult<Self> {
        if self.from > self.to {
            return Err(AppError::bad_request("'from' must not be after 'to'"));
        }
        if (self.to - self.from).num_days() >= MAX_RANGE_DAYS {
            return Err(AppError::bad_request(format!(
                "Date range must be at most {} days",
                MAX_RANGE_DAYS
            )));
        }
        Ok(self)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}
