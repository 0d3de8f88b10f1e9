use crate::dtos::SubscriptionDTO;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use subtrack_domain::{Category, Currency, Frequency, PaymentMethod, Plan, Subscription, ID};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub subscription: SubscriptionDTO,
}

impl SubscriptionResponse {
    pub fn new(subscription: Subscription) -> Self {
        Self {
            subscription: SubscriptionDTO::new(subscription),
        }
    }
}

pub mod create_subscription {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub user_id: ID,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub name: String,
        pub plan: Plan,
        pub category: Category,
        #[serde(default)]
        pub start_date: Option<DateTime<Utc>>,
        pub end_date: DateTime<Utc>,
        pub price: f64,
        #[serde(default)]
        pub currency: Option<Currency>,
        pub frequency: Frequency,
        #[serde(default)]
        pub payment_method: Option<PaymentMethod>,
        #[serde(default)]
        pub description: Option<String>,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub subscription: SubscriptionDTO,
        pub workflow_run_id: ID,
    }

    impl APIResponse {
        pub fn new(subscription: Subscription, workflow_run_id: ID) -> Self {
            Self {
                subscription: SubscriptionDTO::new(subscription),
                workflow_run_id,
            }
        }
    }
}

pub mod get_user_subscriptions {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub user_id: ID,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub subscriptions: Vec<SubscriptionDTO>,
    }

    impl APIResponse {
        pub fn new(subscriptions: Vec<Subscription>) -> Self {
            Self {
                subscriptions: subscriptions
                    .into_iter()
                    .map(SubscriptionDTO::new)
                    .collect(),
            }
        }
    }
}

pub mod update_subscription {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub subscription_id: ID,
    }

    #[derive(Debug, Default, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        #[serde(default)]
        pub name: Option<String>,
        #[serde(default)]
        pub end_date: Option<DateTime<Utc>>,
        #[serde(default)]
        pub price: Option<f64>,
        #[serde(default)]
        pub currency: Option<Currency>,
        #[serde(default)]
        pub frequency: Option<Frequency>,
        #[serde(default)]
        pub payment_method: Option<PaymentMethod>,
        #[serde(default)]
        pub description: Option<String>,
    }

    pub type APIResponse = SubscriptionResponse;
}

pub mod cancel_subscription {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub subscription_id: ID,
    }

    pub type APIResponse = SubscriptionResponse;
}

pub mod delete_subscription {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub subscription_id: ID,
    }

    pub type APIResponse = SubscriptionResponse;
}
