use async_trait::async_trait;

use crate::domain::errors::AppResult;
use crate::domain::ports::PaymentGateway;
use crate::domain::subscription::{GatewayStatus, Payment, Plan};

/// Checkout served by this deployment
///
/// Links point at `{base_url}/{order_code}` and confirmation arrives only
/// through the signed webhook, so status polling always reports pending.
pub struct LocalCheckoutGateway {
    base_url: String,
}

impl LocalCheckoutGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PaymentGateway for LocalCheckoutGateway {
    async fn create_checkout(&self, payment: &Payment, plan: &Plan) -> AppResult<String> {
        tracing::debug!(
            order_code = payment.order_code,
            plan = %plan.name,
            amount = %payment.amount,
            "checkout link created"
        );
        Ok(format!("{}/{}", self.base_url, payment.order_code))
    }

    async fn fetch_status(&self, _order_code: i64) -> AppResult<GatewayStatus> {
        Ok(GatewayStatus::Pending)
    }

    async fn cancel_checkout(&self, order_code: i64) -> AppResult<()> {
        tracing::debug!(order_code, "checkout link cancelled");
        Ok(())
    }
}
