// Repository implementations (data access layer)
// Adapters that implement the domain repository interfaces

mod ledger;

pub mod postgres_calendar_repository;
pub mod postgres_collection_repository;
pub mod postgres_comment_repository;
pub mod postgres_dashboard_repository;
pub mod postgres_engagement_repository;
pub mod postgres_follow_repository;
pub mod postgres_item_repository;
pub mod postgres_moderation_repository;
pub mod postgres_notification_repository;
pub mod postgres_outfit_repository;
pub mod postgres_payment_repository;
pub mod postgres_plan_repository;
pub mod postgres_post_repository;
pub mod postgres_subscription_repository;
pub mod postgres_taxonomy_repository;
pub mod postgres_user_repository;

pub use postgres_calendar_repository::PostgresCalendarRepository;
pub use postgres_collection_repository::PostgresCollectionRepository;
pub use postgres_comment_repository::PostgresCommentRepository;
pub use postgres_dashboard_repository::PostgresDashboardRepository;
pub use postgres_engagement_repository::PostgresEngagementRepository;
pub use postgres_follow_repository::PostgresFollowRepository;
pub use postgres_item_repository::PostgresItemRepository;
pub use postgres_moderation_repository::PostgresModerationRepository;
pub use postgres_notification_repository::PostgresNotificationRepository;
pub use postgres_outfit_repository::PostgresOutfitRepository;
pub use postgres_payment_repository::PostgresPaymentRepository;
pub use postgres_plan_repository::PostgresPlanRepository;
pub use postgres_post_repository::PostgresPostRepository;
pub use postgres_subscription_repository::PostgresSubscriptionRepository;
pub use postgres_taxonomy_repository::PostgresTaxonomyRepository;
pub use postgres_user_repository::PostgresUserRepository;
