use std::sync::Arc;
use uuid::Uuid;

use crate::domain::errors::AppResult;
use crate::domain::notification::{BroadcastDraft, Notification, NotificationKind};
use crate::domain::ports::PushSender;
use crate::domain::repositories::NotificationRepository;

/// Stores notifications and fans personal ones out to the user's devices
#[derive(Clone)]
pub struct NotificationService {
    repo: Arc<dyn NotificationRepository>,
    push: Arc<dyn PushSender>,
}

impl NotificationService {
    pub fn new(repo: Arc<dyn NotificationRepository>, push: Arc<dyn PushSender>) -> Self {
        Self { repo, push }
    }

    /// Stores a personal notification, then pushes it
    ///
    /// Push failures are logged; only the insert can fail the call.
    pub async fn notify(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
        reference_id: Option<Uuid>,
    ) -> AppResult<Notification> {
        let notification = Notification::personal(user_id, kind, title, body, reference_id);
        self.repo.insert(&notification).await?;
        self.push_to_devices(&notification).await;
        Ok(notification)
    }

    /// Like `notify`, for notifications that are a side effect of another action
    pub async fn notify_quietly(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
        reference_id: Option<Uuid>,
    ) {
        if let Err(e) = self.notify(user_id, kind, title, body, reference_id).await {
            tracing::error!(%user_id, ?kind, error = %e, "failed to store notification");
        }
    }

    pub async fn broadcast(&self, draft: BroadcastDraft) -> AppResult<Notification> {
        let notification = draft.into_notification()?;
        self.repo.insert(&notification).await?;
        tracing::info!(notification_id = %notification.id, "system broadcast created");
        Ok(notification)
    }

    async fn push_to_devices(&self, notification: &Notification) {
        let Some(user_id) = notification.user_id else {
            return;
        };
        let tokens = match self.repo.device_tokens(user_id).await {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "could not load device tokens");
                return;
            }
        };
        if let Err(e) = self
            .push
            .send(&tokens, &notification.title, &notification.body)
            .await
        {
            tracing::warn!(%user_id, error = %e, "push delivery failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::notification::DevicePlatform;
    use crate::services::testing::{MemoryNotifications, RecordingPush};

    fn service(push: Arc<RecordingPush>) -> (NotificationService, Arc<MemoryNotifications>) {
        let repo = Arc::new(MemoryNotifications::default());
        (NotificationService::new(repo.clone(), push), repo)
    }

    #[tokio::test]
    async fn notify_stores_and_pushes() {
        let push = Arc::new(RecordingPush::default());
        let (service, repo) = service(push.clone());
        let user = Uuid::new_v4();
        repo.upsert_device(user, "device-1", DevicePlatform::Ios)
            .await
            .unwrap();

        service
            .notify(user, NotificationKind::Follow, "New follower", "Ana followed you", None)
            .await
            .unwrap();

        assert_eq!(repo.stored().len(), 1);
        let sent = push.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, vec!["device-1".to_string()]);
        assert_eq!(sent[0].1, "New follower");
    }

    #[tokio::test]
    async fn push_failure_does_not_fail_notify() {
        let push = Arc::new(RecordingPush::failing());
        let (service, repo) = service(push);
        let user = Uuid::new_v4();
        repo.upsert_device(user, "device-1", DevicePlatform::Android)
            .await
            .unwrap();

        let result = service
            .notify(user, NotificationKind::Like, "Like", "Someone liked your post", None)
            .await;
        assert!(result.is_ok());
        assert_eq!(repo.stored().len(), 1);
    }

    #[tokio::test]
    async fn broadcast_is_not_pushed() {
        let push = Arc::new(RecordingPush::default());
        let (service, repo) = service(push.clone());

        let n = service
            .broadcast(BroadcastDraft {
                title: "Maintenance".to_string(),
                body: "Back at 6am".to_string(),
            })
            .await
            .unwrap();

        assert!(n.is_system());
        assert_eq!(repo.stored().len(), 1);
        assert!(push.sent().is_empty());
    }
}
