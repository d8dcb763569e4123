// Application services
// Flows that span several repositories or call out to third-party ports

pub mod moderation_service;
pub mod notification_service;
pub mod subscription_service;

#[cfg(test)]
pub(crate) mod testing;

pub use moderation_service::ModerationService;
pub use notification_service::NotificationService;
pub use subscription_service::{ReconcileReport, SubscriptionOverview, SubscriptionService};
