use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use subtrack_domain::{
    Category, Currency, Frequency, PaymentMethod, Plan, Subscription, SubscriptionStatus, ID,
};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDTO {
    pub id: ID,
    pub user_id: ID,
    pub name: String,
    pub plan: Plan,
    pub category: Category,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: SubscriptionStatus,
    pub price: f64,
    pub currency: Option<Currency>,
    pub frequency: Frequency,
    pub payment_method: Option<PaymentMethod>,
    pub description: Option<String>,
}

impl SubscriptionDTO {
    pub fn new(subscription: Subscription) -> Self {
        Self {
            id: subscription.id,
            user_id: subscription.user_id,
            name: subscription.name,
            plan: subscription.plan,
            category: subscription.category,
            start_date: subscription.start_date,
            end_date: subscription.end_date,
            status: subscription.status,
            price: subscription.price,
            currency: subscription.currency,
            frequency: subscription.frequency,
            payment_method: subscription.payment_method,
            description: subscription.description,
        }
    }
}
