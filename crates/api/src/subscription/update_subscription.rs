use crate::{
    error::SubtrackError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use subtrack_api_structs::update_subscription::*;
use subtrack_domain::{Currency, Frequency, PaymentMethod, Subscription, ID};
use subtrack_infra::SubtrackContext;

pub async fn update_subscription_controller(
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<SubtrackContext>,
) -> Result<HttpResponse, SubtrackError> {
    let body = body.0;
    let usecase = UpdateSubscriptionUseCase {
        subscription_id: path_params.subscription_id.clone(),
        name: body.name,
        end_date: body.end_date,
        price: body.price,
        currency: body.currency,
        frequency: body.frequency,
        payment_method: body.payment_method,
        description: body.description,
    };

    execute(usecase, &ctx)
        .await
        .map(|subscription| HttpResponse::Ok().json(APIResponse::new(subscription)))
        .map_err(SubtrackError::from)
}

/// Changes the renewal date or the details shown in reminders.
///
/// Reminder workflows that are already running keep the schedule they derived
/// when they started, but every reminder they send shows the updated details.
#[derive(Debug)]
struct UpdateSubscriptionUseCase {
    subscription_id: ID,
    name: Option<String>,
    end_date: Option<DateTime<Utc>>,
    price: Option<f64>,
    currency: Option<Currency>,
    frequency: Option<Frequency>,
    payment_method: Option<PaymentMethod>,
    description: Option<String>,
}

#[derive(Debug)]
enum UseCaseError {
    NotFound(ID),
    EmptyName,
    InvalidPrice(f64),
    RenewalBeforeStart,
    StorageError,
}

impl From<UseCaseError> for SubtrackError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(id) => {
                Self::NotFound(format!("A subscription with id: {}, was not found.", id))
            }
            UseCaseError::EmptyName => {
                Self::BadClientData("A subscription must have a name.".into())
            }
            UseCaseError::InvalidPrice(price) => Self::BadClientData(format!(
                "The price: {}, must be a number greater than or equal to 0.",
                price
            )),
            UseCaseError::RenewalBeforeStart => Self::UnprocessableEntity(
                "The renewal date must be after the start date.".into(),
            ),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateSubscriptionUseCase {
    type Response = Subscription;
    type Error = UseCaseError;

    const NAME: &'static str = "UpdateSubscription";

    async fn execute(&mut self, ctx: &SubtrackContext) -> Result<Self::Response, Self::Error> {
        let mut subscription = ctx
            .repos
            .subscriptions
            .find(&self.subscription_id)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.subscription_id.clone()))?;

        if let Some(name) = &self.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(UseCaseError::EmptyName);
            }
            subscription.name = name.to_string();
        }
        if let Some(end_date) = self.end_date {
            if end_date <= subscription.start_date {
                return Err(UseCaseError::RenewalBeforeStart);
            }
            subscription.end_date = end_date;
        }
        if let Some(price) = self.price {
            if !price.is_finite() || price < 0.0 {
                return Err(UseCaseError::InvalidPrice(price));
            }
            subscription.price = price;
        }
        if let Some(currency) = self.currency {
            subscription.currency = Some(currency);
        }
        if let Some(frequency) = self.frequency {
            subscription.frequency = frequency;
        }
        if let Some(payment_method) = self.payment_method {
            subscription.payment_method = Some(payment_method);
        }
        if let Some(description) = &self.description {
            subscription.description = Some(description.clone());
        }

        ctx.repos
            .subscriptions
            .save(&subscription)
            .await
            .map(|_| subscription)
            .map_err(|_| UseCaseError::StorageError)
    }
}
