use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

pub const DEFAULT_TOP_POSTS: i64 = 10;
pub const MAX_TOP_POSTS: i64 = 50;

#[derive(Debug, Clone, Default, PartialEq, Serialize, sqlx::FromRow)]
pub struct Overview {
    pub total_users: i64,
    pub premium_users: i64,
    pub new_users_this_month: i64,
    pub total_posts: i64,
    pub total_collections: i64,
    pub active_subscriptions: i64,
    pub total_revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct MonthlyRevenue {
    pub month: i32,
    pub revenue: Decimal,
    pub payments: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct PlanShare {
    pub plan_id: Uuid,
    pub plan_name: String,
    pub subscribers: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct TopPost {
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub body: String,
    pub like_count: i64,
    pub comment_count: i64,
    pub score: i64,
}

/// Expands sparse monthly rows into January..December, zero-filling gaps
pub fn fill_months(rows: Vec<MonthlyRevenue>) -> Vec<MonthlyRevenue> {
    (1..=12)
        .map(|month| {
            rows.iter()
                .find(|r| r.month == month)
                .cloned()
                .unwrap_or(MonthlyRevenue {
                    month,
                    revenue: Decimal::ZERO,
                    payments: 0,
                })
        })
        .collect()
}

/// `limit` query for top posts, defaulting to ten and capped at fifty
pub fn top_posts_limit(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(DEFAULT_TOP_POSTS)
        .clamp(1, MAX_TOP_POSTS)
}
