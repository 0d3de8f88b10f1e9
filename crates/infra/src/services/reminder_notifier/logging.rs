use super::IReminderNotifier;
use subtrack_domain::ReminderEvent;
use tracing::info;

/// Used when no reminder webhook is configured
pub struct LogReminderNotifier {}

#[async_trait::async_trait]
impl IReminderNotifier for LogReminderNotifier {
    async fn send(&self, event: &ReminderEvent) -> anyhow::Result<()> {
        info!(
            recipient = %event.recipient_email,
            subscription_id = %event.subscription_id,
            renewal_date = %event.renewal_date_display(),
            price = %event.price_display(),
            payment_method = %event.payment_method,
            "Reminder: {} renews {}",
            event.subscription_name,
            event.label
        );
        Ok(())
    }
}
