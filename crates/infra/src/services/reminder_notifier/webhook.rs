use super::IReminderNotifier;
use reqwest::Client;
use std::time::Duration;
use subtrack_domain::ReminderEvent;
use tracing::info;

pub const WEBHOOK_KEY_HEADER: &str = "subtrack-webhook-key";

/// Posts every `ReminderEvent` as json to a configured endpoint
pub struct WebhookReminderNotifier {
    client: Client,
    url: String,
    key: String,
}

impl WebhookReminderNotifier {
    pub fn new(url: String, key: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url, key })
    }
}

#[async_trait::async_trait]
impl IReminderNotifier for WebhookReminderNotifier {
    async fn send(&self, event: &ReminderEvent) -> anyhow::Result<()> {
        self.client
            .post(&self.url)
            .header(WEBHOOK_KEY_HEADER, &self.key)
            .json(event)
            .send()
            .await?
            .error_for_status()?;

        info!(
            "Sent {} reminder for subscription {} to webhook",
            event.label, event.subscription_id
        );
        Ok(())
    }
}
