mod inmemory;
mod logging;
mod webhook;

use crate::config::Config;
pub use inmemory::InMemoryReminderNotifier;
pub use logging::LogReminderNotifier;
use std::{sync::Arc, time::Duration};
use subtrack_domain::ReminderEvent;
pub use webhook::WebhookReminderNotifier;

/// Delivers renewal reminders to the owner of a `Subscription`.
///
/// Implementations must return an error whenever the reminder was not
/// handed over, the reminder workflow relies on it to retry the step.
#[async_trait::async_trait]
pub trait IReminderNotifier: Send + Sync {
    async fn send(&self, event: &ReminderEvent) -> anyhow::Result<()>;
}

pub fn create_reminder_notifier(config: &Config) -> anyhow::Result<Arc<dyn IReminderNotifier>> {
    let notifier: Arc<dyn IReminderNotifier> = match &config.reminder_webhook {
        Some(webhook) => Arc::new(WebhookReminderNotifier::new(
            webhook.url.clone(),
            webhook.key.clone(),
            Duration::from_secs(webhook.timeout_secs),
        )?),
        None => Arc::new(LogReminderNotifier {}),
    };
    Ok(notifier)
}
