use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::AppResult;
use crate::domain::moderation::{Report, ReportStatus, ReportTarget, Suspension, Violation};
use crate::domain::pagination::{Page, PageRequest};

/// Writes that commit together with closing a report
#[derive(Debug, Clone, Default)]
pub struct ResolutionEffects {
    pub hide: Option<(ReportTarget, Uuid)>,
    pub suspension: Option<Suspension>,
    pub violation: Option<Violation>,
}

#[async_trait]
pub trait ModerationRepository: Send + Sync {
    /// Owner of live content (or the user itself for user targets)
    async fn content_owner(&self, target: ReportTarget, id: Uuid) -> AppResult<Option<Uuid>>;

    /// Conflict when the reporter already has a pending report on the target
    async fn create_report(&self, report: &Report) -> AppResult<()>;

    async fn find_report(&self, id: Uuid) -> AppResult<Option<Report>>;

    async fn list_reports(
        &self,
        status: Option<ReportStatus>,
        page: PageRequest,
    ) -> AppResult<Page<Report>>;

    /// Claims a pending report and applies its effects in one transaction.
    ///
    /// Returns false when the report was no longer pending; nothing is written then.
    async fn close_report(&self, report: &Report, effects: &ResolutionEffects) -> AppResult<bool>;

    /// Returns false when no live content matched
    async fn set_hidden(&self, target: ReportTarget, id: Uuid, hidden: bool) -> AppResult<bool>;

    async fn count_violations_since(&self, user_id: Uuid, since: DateTime<Utc>) -> AppResult<i64>;

    async fn create_suspension(&self, suspension: &Suspension) -> AppResult<()>;

    /// Suspension with the latest end date that is in force at `now`
    async fn active_suspension(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Suspension>>;

    async fn list_active_suspensions(
        &self,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> AppResult<Page<Suspension>>;

    /// Returns false when the suspension was already lifted or unknown
    async fn lift_suspension(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<bool>;
}
