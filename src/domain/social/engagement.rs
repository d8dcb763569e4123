use serde::{Deserialize, Serialize};
use std::fmt;

/// Content that can be liked, saved and commented on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "engagement_target", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EngagementTarget {
    Post,
    Collection,
}

impl fmt::Display for EngagementTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngagementTarget::Post => write!(f, "post"),
            EngagementTarget::Collection => write!(f, "collection"),
        }
    }
}

/// Counters and the viewer's own state for one piece of content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Engagement {
    pub like_count: i64,
    pub comment_count: i64,
    pub save_count: i64,
    pub is_liked: bool,
    pub is_saved: bool,
}
