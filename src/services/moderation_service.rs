use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::errors::{AppError, AppResult};
use crate::domain::moderation::{
    should_auto_suspend, Report, ReportDraft, ReportTarget, ResolutionAction, ResolveReport,
    Suspension, Violation, AUTO_SUSPEND_DAYS, VIOLATION_WINDOW_DAYS,
};
use crate::domain::notification::NotificationKind;
use crate::domain::repositories::{ModerationRepository, ResolutionEffects};
use crate::services::NotificationService;

/// Reports, content hiding and suspensions
#[derive(Clone)]
pub struct ModerationService {
    repo: Arc<dyn ModerationRepository>,
    notifications: NotificationService,
    suspend_threshold: i64,
}

impl ModerationService {
    pub fn new(
        repo: Arc<dyn ModerationRepository>,
        notifications: NotificationService,
        suspend_threshold: i64,
    ) -> Self {
        Self {
            repo,
            notifications,
            suspend_threshold,
        }
    }

    pub async fn report(
        &self,
        reporter_id: Uuid,
        draft: ReportDraft,
        now: DateTime<Utc>,
    ) -> AppResult<Report> {
        let owner = self
            .repo
            .content_owner(draft.target_type, draft.target_id)
            .await?
            .ok_or_else(|| AppError::not_found("Reported content not found"))?;
        let report = draft.into_report(reporter_id, owner, now)?;
        self.repo.create_report(&report).await?;
        tracing::info!(
            report_id = %report.id,
            target = %report.target_type,
            target_id = %report.target_id,
            "report filed"
        );
        Ok(report)
    }

    /// Closes a pending report, applying the chosen action to the content owner
    pub async fn resolve(
        &self,
        admin_id: Uuid,
        report_id: Uuid,
        request: ResolveReport,
        now: DateTime<Utc>,
    ) -> AppResult<Report> {
        let mut report = self
            .repo
            .find_report(report_id)
            .await?
            .ok_or_else(|| AppError::not_found("Report not found"))?;

        // Validate everything before touching content
        report
            .clone()
            .close(request.action, admin_id, None, now)?;
        let days = match request.action {
            ResolutionAction::SuspendUser => Some(request.suspension_days()?),
            _ => None,
        };
        if request.action == ResolutionAction::HideContent
            && report.target_type == ReportTarget::User
        {
            return Err(AppError::bad_request("Users cannot be hidden; suspend them instead"));
        }

        let mut effects = ResolutionEffects::default();
        let mut owner = None;
        if request.action != ResolutionAction::Dismiss {
            let owner_id = self
                .repo
                .content_owner(report.target_type, report.target_id)
                .await?
                .ok_or_else(|| AppError::not_found("Reported content no longer exists"))?;
            match (request.action, days) {
                (ResolutionAction::HideContent, _) => {
                    effects.hide = Some((report.target_type, report.target_id));
                }
                (ResolutionAction::SuspendUser, Some(days)) => {
                    effects.suspension = Some(Suspension::new(
                        owner_id,
                        report.reason.clone(),
                        days,
                        Some(admin_id),
                        now,
                    ));
                }
                _ => {}
            }
            effects.violation = Some(Violation::new(
                owner_id,
                Some(report.id),
                report.reason.clone(),
            ));
            owner = Some(owner_id);
        }

        report.close(request.action, admin_id, request.note, now)?;
        if !self.repo.close_report(&report, &effects).await? {
            return Err(AppError::bad_request("Report has already been handled"));
        }

        if effects.hide.is_some() {
            if let Some(owner_id) = owner {
                self.notifications
                    .notify_quietly(
                        owner_id,
                        NotificationKind::Moderation,
                        "Content hidden",
                        format!(
                            "Your {} was hidden for violating community guidelines.",
                            report.target_type
                        ),
                        Some(report.target_id),
                    )
                    .await;
            }
        }
        if let Some(suspension) = &effects.suspension {
            self.notify_suspended(suspension).await;
        }
        if let Some(owner_id) = owner {
            self.check_auto_suspend(owner_id, now).await?;
        }
        tracing::info!(report_id = %report.id, %admin_id, action = ?request.action, "report resolved");
        Ok(report)
    }

    async fn check_auto_suspend(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<()> {
        let since = now - Duration::days(VIOLATION_WINDOW_DAYS);
        let recent = self.repo.count_violations_since(user_id, since).await?;
        let suspended = self.repo.active_suspension(user_id, now).await?.is_some();
        if !should_auto_suspend(recent, self.suspend_threshold, suspended) {
            return Ok(());
        }

        let suspension = Suspension::new(
            user_id,
            format!("{} violations in {} days", recent, VIOLATION_WINDOW_DAYS),
            AUTO_SUSPEND_DAYS,
            None,
            now,
        );
        self.repo.create_suspension(&suspension).await?;
        tracing::warn!(%user_id, violations = recent, "user suspended automatically");
        self.notify_suspended(&suspension).await;
        Ok(())
    }

    async fn notify_suspended(&self, suspension: &Suspension) {
        self.notifications
            .notify_quietly(
                suspension.user_id,
                NotificationKind::Moderation,
                "Account suspended",
                format!(
                    "Your account is suspended until {}. Reason: {}",
                    suspension.end_date.format("%Y-%m-%d %H:%M UTC"),
                    suspension.reason
                ),
                Some(suspension.id),
            )
            .await;
    }

    pub async fn unhide(&self, target: ReportTarget, id: Uuid) -> AppResult<()> {
        if !self.repo.set_hidden(target, id, false).await? {
            return Err(AppError::not_found(format!("{} not found", target)));
        }
        Ok(())
    }

    pub async fn lift_suspension(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<()> {
        if !self.repo.lift_suspension(id, now).await? {
            return Err(AppError::not_found("Suspension not found or already lifted"));
        }
        tracing::info!(suspension_id = %id, "suspension lifted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{MemoryModeration, MemoryNotifications, RecordingPush};

    fn service(threshold: i64) -> (ModerationService, Arc<MemoryModeration>, Arc<MemoryNotifications>) {
        let repo = Arc::new(MemoryModeration::default());
        let notifications = Arc::new(MemoryNotifications::default());
        let service = ModerationService::new(
            repo.clone(),
            NotificationService::new(notifications.clone(), Arc::new(RecordingPush::default())),
            threshold,
        );
        (service, repo, notifications)
    }

    fn draft(target_type: ReportTarget, target_id: Uuid) -> ReportDraft {
        ReportDraft {
            target_type,
            target_id,
            reason: "spam".to_string(),
        }
    }

    fn resolve(action: ResolutionAction, days: Option<i64>) -> ResolveReport {
        ResolveReport {
            action,
            note: None,
            days,
        }
    }

    #[tokio::test]
    async fn reporting_unknown_content_is_not_found() {
        let (service, _, _) = service(3);
        let err = service
            .report(Uuid::new_v4(), draft(ReportTarget::Post, Uuid::new_v4()), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn hide_content_records_violation_and_notifies() {
        let (service, repo, notifications) = service(3);
        let owner = Uuid::new_v4();
        let post = repo.add_content(ReportTarget::Post, owner);

        let report = service
            .report(Uuid::new_v4(), draft(ReportTarget::Post, post), Utc::now())
            .await
            .unwrap();
        let resolved = service
            .resolve(Uuid::new_v4(), report.id, resolve(ResolutionAction::HideContent, None), Utc::now())
            .await
            .unwrap();

        assert_eq!(resolved.status, crate::domain::moderation::ReportStatus::Resolved);
        assert!(repo.is_hidden(post));
        assert_eq!(repo.violations(owner), 1);
        assert_eq!(notifications.stored().len(), 1);
    }

    #[tokio::test]
    async fn hiding_a_user_is_rejected_before_side_effects() {
        let (service, repo, _) = service(3);
        let user = Uuid::new_v4();
        repo.add_content(ReportTarget::User, user);
        let report = service
            .report(Uuid::new_v4(), draft(ReportTarget::User, user), Utc::now())
            .await
            .unwrap();

        let err = service
            .resolve(Uuid::new_v4(), report.id, resolve(ResolutionAction::HideContent, None), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(repo.violations(user), 0);
    }

    #[tokio::test]
    async fn suspend_requires_valid_days() {
        let (service, repo, _) = service(3);
        let owner = Uuid::new_v4();
        let post = repo.add_content(ReportTarget::Post, owner);
        let report = service
            .report(Uuid::new_v4(), draft(ReportTarget::Post, post), Utc::now())
            .await
            .unwrap();

        let err = service
            .resolve(Uuid::new_v4(), report.id, resolve(ResolutionAction::SuspendUser, Some(0)), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let now = Utc::now();
        service
            .resolve(Uuid::new_v4(), report.id, resolve(ResolutionAction::SuspendUser, Some(3)), now)
            .await
            .unwrap();
        let suspension = repo.active_suspension(owner, now).await.unwrap().unwrap();
        assert_eq!(suspension.end_date, now + Duration::days(3));
    }

    #[tokio::test]
    async fn repeated_violations_trigger_auto_suspension() {
        let (service, repo, _) = service(2);
        let owner = Uuid::new_v4();
        let now = Utc::now();

        for _ in 0..2 {
            let post = repo.add_content(ReportTarget::Post, owner);
            let report = service
                .report(Uuid::new_v4(), draft(ReportTarget::Post, post), now)
                .await
                .unwrap();
            service
                .resolve(Uuid::new_v4(), report.id, resolve(ResolutionAction::HideContent, None), now)
                .await
                .unwrap();
        }

        let suspension = repo.active_suspension(owner, now).await.unwrap().unwrap();
        assert_eq!(suspension.created_by, None);
        assert_eq!(suspension.end_date, now + Duration::days(AUTO_SUSPEND_DAYS));
    }

    #[tokio::test]
    async fn dismiss_leaves_content_alone_and_cannot_repeat() {
        let (service, repo, _) = service(3);
        let owner = Uuid::new_v4();
        let post = repo.add_content(ReportTarget::Post, owner);
        let report = service
            .report(Uuid::new_v4(), draft(ReportTarget::Post, post), Utc::now())
            .await
            .unwrap();

        service
            .resolve(Uuid::new_v4(), report.id, resolve(ResolutionAction::Dismiss, None), Utc::now())
            .await
            .unwrap();
        assert!(!repo.is_hidden(post));
        assert_eq!(repo.violations(owner), 0);

        let err = service
            .resolve(Uuid::new_v4(), report.id, resolve(ResolutionAction::HideContent, None), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn concurrent_resolves_apply_once() {
        let (service, repo, notifications) = service(3);
        let owner = Uuid::new_v4();
        let post = repo.add_content(ReportTarget::Post, owner);
        let report = service
            .report(Uuid::new_v4(), draft(ReportTarget::Post, post), Utc::now())
            .await
            .unwrap();

        let now = Utc::now();
        let (first, second) = tokio::join!(
            service.resolve(Uuid::new_v4(), report.id, resolve(ResolutionAction::HideContent, None), now),
            service.resolve(Uuid::new_v4(), report.id, resolve(ResolutionAction::HideContent, None), now),
        );

        let failures: Vec<_> = [first, second].into_iter().filter_map(Result::err).collect();
        assert_eq!(failures.len(), 1);
        assert!(matches!(failures[0], AppError::BadRequest(_)));
        assert_eq!(repo.violations(owner), 1);
        assert_eq!(notifications.stored().len(), 1);
    }

    #[tokio::test]
    async fn unhide_and_lift() {
        let (service, repo, _) = service(3);
        let post = repo.add_content(ReportTarget::Post, Uuid::new_v4());
        repo.set_hidden(ReportTarget::Post, post, true).await.unwrap();
        service.unhide(ReportTarget::Post, post).await.unwrap();
        assert!(!repo.is_hidden(post));

        let err = service.lift_suspension(Uuid::new_v4(), Utc::now()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
