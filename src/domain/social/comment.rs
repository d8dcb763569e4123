use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::engagement::EngagementTarget;
use crate::domain::errors::{validate_length, AppError, AppResult};

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub target_type: EngagementTarget,
    pub target_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub body: String,
    pub is_hidden: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author_name: String,
    pub author_avatar_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentDraft {
    pub body: String,
    pub parent_id: Option<Uuid>,
}

impl CommentDraft {
    pub fn normalize(mut self) -> AppResult<Self> {
        validate_length("Comment", &self.body, 1, 1000)?;
        self.body = self.body.trim().to_string();
        Ok(self)
    }

    /// Builds the comment after checking the reply rule against `parent`
    ///
    /// Replies go one level deep and must stay on the same target.
    pub fn into_comment(
        self,
        user_id: Uuid,
        target_type: EngagementTarget,
        target_id: Uuid,
        parent: Option<&Comment>,
        now: DateTime<Utc>,
    ) -> AppResult<Comment> {
        if let Some(parent) = parent {
            if parent.target_type != target_type || parent.target_id != target_id {
                return Err(AppError::bad_request("Reply must be on the same content"));
            }
            if parent.parent_id.is_some() {
                return Err(AppError::bad_request("Replies cannot be nested"));
            }
        }
        Ok(Comment {
            id: Uuid::new_v4(),
            user_id,
            target_type,
            target_id,
            parent_id: parent.map(|p| p.id),
            body: self.body,
            is_hidden: false,
            created_at: now,
            updated_at: now,
        })
    }
}
