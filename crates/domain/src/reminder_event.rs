use crate::{
    date::format_display_date,
    reminder::ReminderOffset,
    shared::entity::ID,
    subscription::{Currency, Frequency, Subscription},
    user::User,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAYMENT_METHOD_LABEL: &str = "your payment method";
const DEFAULT_RECIPIENT_NAME: &str = "Valued Customer";

/// The payload handed to the notifier when a renewal reminder fires.
/// It is built from the current state of the `Subscription` at dispatch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderEvent {
    pub recipient_email: String,
    pub recipient_name: String,
    pub offset: ReminderOffset,
    pub label: String,
    pub subscription_id: ID,
    pub subscription_name: String,
    pub renewal_date: DateTime<Utc>,
    pub price: f64,
    pub currency: Currency,
    pub frequency: Frequency,
    pub payment_method: String,
}

impl ReminderEvent {
    pub fn new(subscription: &Subscription, owner: &User, offset: ReminderOffset) -> Self {
        let recipient_name = if owner.name.trim().is_empty() {
            DEFAULT_RECIPIENT_NAME.to_string()
        } else {
            owner.name.clone()
        };

        Self {
            recipient_email: owner.email.clone(),
            recipient_name,
            offset,
            label: offset.label(),
            subscription_id: subscription.id.clone(),
            subscription_name: subscription.name.clone(),
            renewal_date: subscription.end_date,
            price: subscription.price,
            currency: subscription.currency.unwrap_or_default(),
            frequency: subscription.frequency,
            payment_method: subscription
                .payment_method
                .map(|method| method.as_str().to_string())
                .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD_LABEL.to_string()),
        }
    }

    /// e.g. `Jan 10, 2025`
    pub fn renewal_date_display(&self) -> String {
        format_display_date(&self.renewal_date)
    }

    /// e.g. `USD 9.99 (monthly)`
    pub fn price_display(&self) -> String {
        format!("{} {} ({})", self.currency, self.price, self.frequency)
    }
}
