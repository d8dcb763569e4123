// Repository interfaces (ports)
// Implemented by the Postgres adapters in infrastructure

pub mod calendar_repository;
pub mod collection_repository;
pub mod comment_repository;
pub mod dashboard_repository;
pub mod engagement_repository;
pub mod follow_repository;
pub mod item_repository;
pub mod moderation_repository;
pub mod notification_repository;
pub mod outfit_repository;
pub mod payment_repository;
pub mod plan_repository;
pub mod post_repository;
pub mod subscription_repository;
pub mod taxonomy_repository;
pub mod user_repository;

pub use calendar_repository::CalendarRepository;
pub use collection_repository::CollectionRepository;
pub use comment_repository::CommentRepository;
pub use dashboard_repository::DashboardRepository;
pub use engagement_repository::EngagementRepository;
pub use follow_repository::FollowRepository;
pub use item_repository::ItemRepository;
pub use moderation_repository::{ModerationRepository, ResolutionEffects};
pub use notification_repository::NotificationRepository;
pub use outfit_repository::OutfitRepository;
pub use payment_repository::PaymentRepository;
pub use plan_repository::PlanRepository;
pub use post_repository::PostRepository;
pub use subscription_repository::SubscriptionRepository;
pub use taxonomy_repository::TaxonomyRepository;
pub use user_repository::{ProfileUpdate, PublicProfile, User, UserRepository, UserSummary};
