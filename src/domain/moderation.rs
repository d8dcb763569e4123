use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::errors::{validate_length, AppError, AppResult};
use crate::domain::social::EngagementTarget;

pub const AUTO_SUSPEND_DAYS: i64 = 7;
pub const VIOLATION_WINDOW_DAYS: i64 = 30;
pub const MAX_SUSPENSION_DAYS: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "report_target", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportTarget {
    Post,
    Collection,
    Comment,
    User,
}

impl ReportTarget {
    /// Table holding hideable content of this kind
    pub fn content_table(&self) -> Option<&'static str> {
        match self {
            ReportTarget::Post => Some("posts"),
            ReportTarget::Collection => Some("collections"),
            ReportTarget::Comment => Some("comments"),
            ReportTarget::User => None,
        }
    }
}

impl From<EngagementTarget> for ReportTarget {
    fn from(target: EngagementTarget) -> Self {
        match target {
            EngagementTarget::Post => ReportTarget::Post,
            EngagementTarget::Collection => ReportTarget::Collection,
        }
    }
}

impl fmt::Display for ReportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportTarget::Post => write!(f, "post"),
            ReportTarget::Collection => write!(f, "collection"),
            ReportTarget::Comment => write!(f, "comment"),
            ReportTarget::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for ReportTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" | "posts" => Ok(ReportTarget::Post),
            "collection" | "collections" => Ok(ReportTarget::Collection),
            "comment" | "comments" => Ok(ReportTarget::Comment),
            "user" | "users" => Ok(ReportTarget::User),
            other => Err(format!("Unknown report target: {}", other)),
        }
    }
}

/// Report status
///
/// # Status Transitions
/// ```text
/// Pending -> Resolved
///         -> Dismissed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "report_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Resolved,
    Dismissed,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub target_type: ReportTarget,
    pub target_id: Uuid,
    pub reason: String,
    pub status: ReportStatus,
    pub resolution_note: Option<String>,
    pub resolved_by: Option<Uuid>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Report {
    /// Closes a pending report
    pub fn close(
        &mut self,
        action: ResolutionAction,
        admin_id: Uuid,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        if self.status != ReportStatus::Pending {
            return Err(AppError::bad_request("Report has already been handled"));
        }
        self.status = match action {
            ResolutionAction::Dismiss => ReportStatus::Dismissed,
            ResolutionAction::HideContent | ResolutionAction::SuspendUser => ReportStatus::Resolved,
        };
        self.resolution_note = note;
        self.resolved_by = Some(admin_id);
        self.resolved_at = Some(now);
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportDraft {
    pub target_type: ReportTarget,
    pub target_id: Uuid,
    pub reason: String,
}

impl ReportDraft {
    /// `target_owner` is the user behind the reported content (or the user itself)
    pub fn into_report(
        self,
        reporter_id: Uuid,
        target_owner: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Report> {
        validate_length("Reason", &self.reason, 1, 500)?;
        if target_owner == reporter_id {
            return Err(AppError::bad_request("You cannot report yourself or your own content"));
        }
        Ok(Report {
            id: Uuid::new_v4(),
            reporter_id,
            target_type: self.target_type,
            target_id: self.target_id,
            reason: self.reason.trim().to_string(),
            status: ReportStatus::Pending,
            resolution_note: None,
            resolved_by: None,
            resolved_at: None,
            created_at: now,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionAction {
    Dismiss,
    HideContent,
    SuspendUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolveReport {
    pub action: ResolutionAction,
    pub note: Option<String>,
    pub days: Option<i64>,
}

impl ResolveReport {
    pub fn suspension_days(&self) -> AppResult<i64> {
        match self.days {
            Some(days) if (1..=MAX_SUSPENSION_DAYS).contains(&days) => Ok(days),
            Some(_) => Err(AppError::bad_request(format!(
                "Suspension must be between 1 and {} days",
                MAX_SUSPENSION_DAYS
            ))),
            None => Err(AppError::bad_request("Suspension length in days is required")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Suspension {
    pub id: Uuid,
    pub user_id: Uuid,
    pub reason: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub lifted_at: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
}

impl Suspension {
    pub fn new(
        user_id: Uuid,
        reason: impl Into<String>,
        days: i64,
        created_by: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            reason: reason.into(),
            start_date: now,
            end_date: now + Duration::days(days),
            lifted_at: None,
            created_by,
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.lifted_at.is_none() && self.start_date <= now && now < self.end_date
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub report_id: Option<Uuid>,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl Violation {
    pub fn new(user_id: Uuid, report_id: Option<Uuid>, reason: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            report_id,
            reason: reason.into(),
            created_at: Utc::now(),
        }
    }
}

/// Whether repeated violations should trigger an automatic suspension
pub fn should_auto_suspend(recent_violations: i64, threshold: i64, already_suspended: bool) -> bool {
    threshold > 0 && !already_suspended && recent_violations >= threshold
}
