// HTTP handlers, one module per resource

pub mod auth;
pub mod calendar;
pub mod collections;
pub mod comments;
pub mod dashboard;
pub mod items;
pub mod moderation;
pub mod notifications;
pub mod outfits;
pub mod posts;
pub mod subscriptions;
pub mod taxonomy;
pub mod users;
