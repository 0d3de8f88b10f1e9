use crate::error::SubtrackError;
use crate::shared::usecase::{execute, UseCase};
use crate::workflow::trigger_reminder_workflow::{self, StartReminderWorkflowUseCase};
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use subtrack_api_structs::create_subscription::*;
use subtrack_domain::{
    Category, Currency, Frequency, PaymentMethod, Plan, Subscription, SubscriptionStatus, ID,
};
use subtrack_infra::SubtrackContext;

pub async fn create_subscription_controller(
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<SubtrackContext>,
) -> Result<HttpResponse, SubtrackError> {
    let body = body.0;
    let usecase = CreateSubscriptionUseCase {
        user_id: path_params.user_id.clone(),
        name: body.name,
        plan: body.plan,
        category: body.category,
        start_date: body.start_date,
        end_date: body.end_date,
        price: body.price,
        currency: body.currency,
        frequency: body.frequency,
        payment_method: body.payment_method,
        description: body.description,
    };

    execute(usecase, &ctx)
        .await
        .map(|res| {
            HttpResponse::Created().json(APIResponse::new(res.subscription, res.workflow_run_id))
        })
        .map_err(SubtrackError::from)
}

/// Stores a new active `Subscription` and starts its renewal reminder workflow
#[derive(Debug)]
pub struct CreateSubscriptionUseCase {
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

#[derive(Debug)]
pub struct UseCaseRes {
    pub subscription: Subscription,
    pub workflow_run_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
    UserNotFound(ID),
    EmptyName,
    InvalidPrice(f64),
    RenewalBeforeStart,
    WorkflowNotStarted(trigger_reminder_workflow::UseCaseError),
}

impl From<UseCaseError> for SubtrackError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError => Self::InternalError,
            UseCaseError::UserNotFound(id) => {
                Self::NotFound(format!("A user with id: {}, was not found.", id))
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
            UseCaseError::WorkflowNotStarted(e) => e.into(),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateSubscriptionUseCase {
    type Response = UseCaseRes;
    type Error = UseCaseError;

    const NAME: &'static str = "CreateSubscription";

    async fn execute(&mut self, ctx: &SubtrackContext) -> Result<Self::Response, Self::Error> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(UseCaseError::EmptyName);
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(UseCaseError::InvalidPrice(self.price));
        }
        let start_date = self.start_date.unwrap_or_else(|| ctx.sys.get_datetime());
        if self.end_date <= start_date {
            return Err(UseCaseError::RenewalBeforeStart);
        }

        if ctx.repos.users.find(&self.user_id).await.is_none() {
            return Err(UseCaseError::UserNotFound(self.user_id.clone()));
        }

        let subscription = Subscription {
            id: Default::default(),
            user_id: self.user_id.clone(),
            name,
            plan: self.plan,
            category: self.category,
            start_date,
            end_date: self.end_date,
            status: SubscriptionStatus::Active,
            price: self.price,
            currency: self.currency,
            frequency: self.frequency,
            payment_method: self.payment_method,
            description: self.description.clone(),
        };
        ctx.repos
            .subscriptions
            .insert(&subscription)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        // A subscription without reminders is not reported as created
        let start_workflow = StartReminderWorkflowUseCase {
            subscription_id: subscription.id.clone(),
        };
        let run = execute(start_workflow, ctx)
            .await
            .map_err(UseCaseError::WorkflowNotStarted)?;

        Ok(UseCaseRes {
            subscription,
            workflow_run_id: run.id,
        })
    }
}
