// Infrastructure layer module
// Database adapters and the local stand-ins for third-party services

pub mod db;
pub mod payment_gateway;
pub mod push;
pub mod repositories;

pub use payment_gateway::LocalCheckoutGateway;
pub use push::LogPushSender;
