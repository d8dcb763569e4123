use async_trait::async_trait;

use crate::domain::errors::AppResult;
use crate::domain::ports::PushSender;

/// Push sender that records deliveries in the log instead of calling a vendor
#[derive(Debug, Default)]
pub struct LogPushSender;

#[async_trait]
impl PushSender for LogPushSender {
    async fn send(&self, device_tokens: &[String], title: &str, _body: &str) -> AppResult<()> {
        if device_tokens.is_empty() {
            return Ok(());
        }
        tracing::info!(devices = device_tokens.len(), title, "push notification dispatched");
        Ok(())
    }
}
