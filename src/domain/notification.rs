use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{validate_length, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    System,
    Follow,
    Like,
    Comment,
    Subscription,
    Moderation,
}

/// A notification addressed to one user, or to everyone when `user_id` is `None`
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub reference_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn personal(
        user_id: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
        reference_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: Some(user_id),
            kind,
            title: title.into(),
            body: body.into(),
            reference_id,
            is_read: false,
            created_at: Utc::now(),
        }
    }

    pub fn broadcast(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: None,
            kind: NotificationKind::System,
            title: title.into(),
            body: body.into(),
            reference_id: None,
            is_read: false,
            created_at: Utc::now(),
        }
    }

    pub fn is_system(&self) -> bool {
        self.user_id.is_none()
    }
}

/// Admin input for a system broadcast
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastDraft {
    pub title: String,
    pub body: String,
}

impl BroadcastDraft {
    pub fn into_notification(self) -> AppResult<Notification> {
        validate_length("Title", &self.title, 1, 200)?;
        validate_length("Body", &self.body, 1, 2000)?;
        Ok(Notification::broadcast(self.title.trim(), self.body.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePlatform {
    Android,
    Ios,
    Web,
}

impl DevicePlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            DevicePlatform::Android => "android",
            DevicePlatform::Ios => "ios",
            DevicePlatform::Web => "web",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_is_system_kind() {
        let n = Notification::broadcast("Maintenance", "Back soon");
        assert!(n.is_system());
        assert_eq!(n.kind, NotificationKind::System);
    }

    #[test]
    fn personal_notification_is_unread() {
        let user = Uuid::new_v4();
        let n = Notification::personal(user, NotificationKind::Follow, "New follower", "x", None);
        assert_eq!(n.user_id, Some(user));
        assert!(!n.is_read);
        assert!(!n.is_system());
    }

    #[test]
    fn broadcast_draft_requires_title() {
        let draft = BroadcastDraft {
            title: " ".to_string(),
            body: "body".to_string(),
        };
        assert!(draft.into_notification().is_err());
    }

    #[test]
    fn platform_parses_lowercase() {
        let p: DevicePlatform = serde_json::from_str("\"ios\"").unwrap();
        assert_eq!(p, DevicePlatform::Ios);
        assert_eq!(p.as_str(), "ios");
    }
}
