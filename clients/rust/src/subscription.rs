use crate::{APIResponse, BaseClient, ID};
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use std::sync::Arc;
use subtrack_api_structs::*;
use subtrack_domain::{Category, Currency, Frequency, PaymentMethod, Plan};

#[derive(Clone)]
pub struct SubscriptionClient {
    base: Arc<BaseClient>,
}

pub struct CreateSubscriptionInput {
    pub user_id: ID,
    pub name: String,
    pub plan: Plan,
    pub category: Category,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: DateTime<Utc>,
    pub price: f64,
    pub currency: Option<Currency>,
    pub frequency: Frequency,
    pub payment_method: Option<PaymentMethod>,
    pub description: Option<String>,
}

#[derive(Default)]
pub struct UpdateSubscriptionInput {
    pub subscription_id: ID,
    pub name: Option<String>,
    pub end_date: Option<DateTime<Utc>>,
    pub price: Option<f64>,
    pub currency: Option<Currency>,
    pub frequency: Option<Frequency>,
    pub payment_method: Option<PaymentMethod>,
    pub description: Option<String>,
}

impl SubscriptionClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn create(
        &self,
        input: CreateSubscriptionInput,
    ) -> APIResponse<create_subscription::APIResponse> {
        let body = create_subscription::RequestBody {
            name: input.name,
            plan: input.plan,
            category: input.category,
            start_date: input.start_date,
            end_date: input.end_date,
            price: input.price,
            currency: input.currency,
            frequency: input.frequency,
            payment_method: input.payment_method,
            description: input.description,
        };
        self.base
            .post(
                body,
                format!("user/{}/subscriptions", input.user_id),
                StatusCode::CREATED,
            )
            .await
    }

    pub async fn get_by_user(
        &self,
        user_id: ID,
    ) -> APIResponse<get_user_subscriptions::APIResponse> {
        self.base
            .get(format!("user/{}/subscriptions", user_id), StatusCode::OK)
            .await
    }

    pub async fn update(
        &self,
        input: UpdateSubscriptionInput,
    ) -> APIResponse<update_subscription::APIResponse> {
        let body = update_subscription::RequestBody {
            name: input.name,
            end_date: input.end_date,
            price: input.price,
            currency: input.currency,
            frequency: input.frequency,
            payment_method: input.payment_method,
            description: input.description,
        };
        self.base
            .put(
                body,
                format!("subscriptions/{}", input.subscription_id),
                StatusCode::OK,
            )
            .await
    }

    pub async fn cancel(
        &self,
        subscription_id: ID,
    ) -> APIResponse<cancel_subscription::APIResponse> {
        self.base
            .put(
                (),
                format!("subscriptions/{}/cancel", subscription_id),
                StatusCode::OK,
            )
            .await
    }

    pub async fn delete(
        &self,
        subscription_id: ID,
    ) -> APIResponse<delete_subscription::APIResponse> {
        self.base
            .delete(format!("subscriptions/{}", subscription_id), StatusCode::OK)
            .await
    }
}
