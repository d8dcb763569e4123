use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::dashboard::{MonthlyRevenue, Overview, PlanShare, TopPost};
use crate::domain::errors::AppResult;

/// Read-only aggregates for the admin dashboard
#[async_trait]
pub trait DashboardRepository: Send + Sync {
    async fn overview(&self, now: DateTime<Utc>) -> AppResult<Overview>;

    /// Months of `year` that had paid payments; missing months are absent
    async fn revenue_by_month(&self, year: i32) -> AppResult<Vec<MonthlyRevenue>>;

    async fn plan_distribution(&self) -> AppResult<Vec<PlanShare>>;

    async fn top_posts(&self, limit: i64) -> AppResult<Vec<TopPost>>;
}
