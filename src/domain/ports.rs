// Outbound ports for third-party services
// Implementations live in infrastructure

use async_trait::async_trait;

use crate::domain::errors::AppResult;
use crate::domain::subscription::{GatewayStatus, Payment, Plan};

/// Hosted checkout provider
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a checkout link for a pending payment
    async fn create_checkout(&self, payment: &Payment, plan: &Plan) -> AppResult<String>;

    /// Asks the provider for the current status of an order
    async fn fetch_status(&self, order_code: i64) -> AppResult<GatewayStatus>;

    /// Invalidates the checkout link of an order
    async fn cancel_checkout(&self, order_code: i64) -> AppResult<()>;
}

/// Push notification delivery to registered devices
#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(&self, device_tokens: &[String], title: &str, body: &str) -> AppResult<()>;
}
