// libs/notification-cell/src/services/notifier.rs
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, error, info};

use crate::models::{NotificationError, RescheduleNotice};

/// Delivery backend for reschedule notices. One attempt per notice; retries
/// are out of scope, the dispatcher logs failures and moves on.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: &RescheduleNotice) -> Result<(), NotificationError>;
}

/// POSTs each notice as JSON to a configured webhook URL.
pub struct WebhookNotifier {
    client: Client,
    webhook_url: String,
}

impl WebhookNotifier {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            webhook_url: webhook_url.into(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, notice: &RescheduleNotice) -> Result<(), NotificationError> {
        debug!("Posting reschedule notice to {}", self.webhook_url);

        let body = json!({
            "recipient": notice.recipient,
            "new_date": notice.new_date,
            "new_time": notice.new_time.format("%H:%M").to_string(),
        });

        let response = self
            .client
            .post(&self.webhook_url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            error!("Reschedule notice webhook failed: HTTP {}", status);
            return Err(NotificationError::Delivery(format!(
                "webhook returned HTTP {}",
                status
            )));
        }

        info!("Delivered reschedule notice to {}", notice.recipient);
        Ok(())
    }
}

/// Fallback when no webhook is configured: the notice is only logged.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notice: &RescheduleNotice) -> Result<(), NotificationError> {
        info!(
            "Reschedule notice for {}: moved to {} {}",
            notice.recipient,
            notice.new_date,
            notice.new_time.format("%H:%M")
        );
        Ok(())
    }
}
