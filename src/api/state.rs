use chrono::Duration;
use sqlx::PgPool;
use std::sync::Arc;

use crate::config::Config;
use crate::domain::ports::{PaymentGateway, PushSender};
use crate::domain::repositories::{
    CalendarRepository, CollectionRepository, CommentRepository, DashboardRepository,
    EngagementRepository, FollowRepository, ItemRepository, ModerationRepository,
    NotificationRepository, OutfitRepository, PaymentRepository, PlanRepository, PostRepository,
    SubscriptionRepository, TaxonomyRepository, UserRepository,
};
use crate::infrastructure::repositories::{
    PostgresCalendarRepository, PostgresCollectionRepository, PostgresCommentRepository,
    PostgresDashboardRepository, PostgresEngagementRepository, PostgresFollowRepository,
    PostgresItemRepository, PostgresModerationRepository, PostgresNotificationRepository,
    PostgresOutfitRepository, PostgresPaymentRepository, PostgresPlanRepository,
    PostgresPostRepository, PostgresSubscriptionRepository, PostgresTaxonomyRepository,
    PostgresUserRepository,
};
use crate::infrastructure::{LocalCheckoutGateway, LogPushSender};
use crate::services::{ModerationService, NotificationService, SubscriptionService};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub users: Arc<dyn UserRepository>,
    pub taxonomy: Arc<dyn TaxonomyRepository>,
    pub items: Arc<dyn ItemRepository>,
    pub outfits: Arc<dyn OutfitRepository>,
    pub calendar: Arc<dyn CalendarRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub collections: Arc<dyn CollectionRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub engagement: Arc<dyn EngagementRepository>,
    pub follows: Arc<dyn FollowRepository>,
    pub notification_repo: Arc<dyn NotificationRepository>,
    pub plans: Arc<dyn PlanRepository>,
    pub subscription_repo: Arc<dyn SubscriptionRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub moderation_repo: Arc<dyn ModerationRepository>,
    pub dashboard: Arc<dyn DashboardRepository>,
    pub notifications: NotificationService,
    pub subscriptions: SubscriptionService,
    pub moderation: ModerationService,
}

impl AppState {
    /// Wires the Postgres adapters and the local gateway/push implementations
    pub fn from_pool(pool: PgPool, config: Config) -> Self {
        let gateway: Arc<dyn PaymentGateway> =
            Arc::new(LocalCheckoutGateway::new(config.checkout_base_url.clone()));
        let push: Arc<dyn PushSender> = Arc::new(LogPushSender);

        let notification_repo: Arc<dyn NotificationRepository> =
            Arc::new(PostgresNotificationRepository::new(pool.clone()));
        let plans: Arc<dyn PlanRepository> = Arc::new(PostgresPlanRepository::new(pool.clone()));
        let subscription_repo: Arc<dyn SubscriptionRepository> =
            Arc::new(PostgresSubscriptionRepository::new(pool.clone()));
        let payments: Arc<dyn PaymentRepository> =
            Arc::new(PostgresPaymentRepository::new(pool.clone()));
        let moderation_repo: Arc<dyn ModerationRepository> =
            Arc::new(PostgresModerationRepository::new(pool.clone()));

        let notifications = NotificationService::new(notification_repo.clone(), push);
        let subscriptions = SubscriptionService::new(
            plans.clone(),
            subscription_repo.clone(),
            payments.clone(),
            gateway,
            notifications.clone(),
            config.payment_webhook_secret.clone(),
            Duration::minutes(config.payment_link_ttl_minutes),
        );
        let moderation = ModerationService::new(
            moderation_repo.clone(),
            notifications.clone(),
            config.violation_suspend_threshold,
        );

        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            taxonomy: Arc::new(PostgresTaxonomyRepository::new(pool.clone())),
            items: Arc::new(PostgresItemRepository::new(pool.clone())),
            outfits: Arc::new(PostgresOutfitRepository::new(pool.clone())),
            calendar: Arc::new(PostgresCalendarRepository::new(pool.clone())),
            posts: Arc::new(PostgresPostRepository::new(pool.clone())),
            collections: Arc::new(PostgresCollectionRepository::new(pool.clone())),
            comments: Arc::new(PostgresCommentRepository::new(pool.clone())),
            engagement: Arc::new(PostgresEngagementRepository::new(pool.clone())),
            follows: Arc::new(PostgresFollowRepository::new(pool.clone())),
            dashboard: Arc::new(PostgresDashboardRepository::new(pool)),
            config: Arc::new(config),
            notification_repo,
            plans,
            subscription_repo,
            payments,
            moderation_repo,
            notifications,
            subscriptions,
            moderation,
        }
    }
}
