// Domain layer module exports
// Entities, value objects and the repository and service ports
// Independent of HTTP and SQL details

pub mod calendar;
pub mod dashboard;
pub mod errors;
pub mod moderation;
pub mod notification;
pub mod pagination;
pub mod ports;
pub mod repositories;
pub mod social;
pub mod subscription;
pub mod user;
pub mod wardrobe;
