use crate::{
    error::SubtrackError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use subtrack_api_structs::cancel_subscription::*;
use subtrack_domain::{Subscription, ID};
use subtrack_infra::SubtrackContext;

pub async fn cancel_subscription_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<SubtrackContext>,
) -> Result<HttpResponse, SubtrackError> {
    let usecase = CancelSubscriptionUseCase {
        subscription_id: path_params.subscription_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|subscription| HttpResponse::Ok().json(APIResponse::new(subscription)))
        .map_err(SubtrackError::from)
}

/// Running reminder workflows notice the cancellation the next time they wake up
/// and stop without sending anything.
#[derive(Debug)]
struct CancelSubscriptionUseCase {
    subscription_id: ID,
}

#[derive(Debug)]
enum UseCaseError {
    NotFound(ID),
    AlreadyCancelled(ID),
    StorageError,
}

impl From<UseCaseError> for SubtrackError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(id) => {
                Self::NotFound(format!("A subscription with id: {}, was not found.", id))
            }
            UseCaseError::AlreadyCancelled(id) => Self::Conflict(format!(
                "The subscription with id: {}, is already cancelled.",
                id
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CancelSubscriptionUseCase {
    type Response = Subscription;
    type Error = UseCaseError;

    const NAME: &'static str = "CancelSubscription";

    async fn execute(&mut self, ctx: &SubtrackContext) -> Result<Self::Response, Self::Error> {
        let mut subscription = ctx
            .repos
            .subscriptions
            .find(&self.subscription_id)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.subscription_id.clone()))?;

        if !subscription.is_active() {
            return Err(UseCaseError::AlreadyCancelled(subscription.id));
        }
        subscription.cancel();

        ctx.repos
            .subscriptions
            .save(&subscription)
            .await
            .map(|_| subscription)
            .map_err(|_| UseCaseError::StorageError)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::subscription::test_helpers::insert_subscription;
    use subtrack_domain::SubscriptionStatus;

    #[actix_web::main]
    #[test]
    async fn cancels_subscription() {
        let ctx = SubtrackContext::create_inmemory();
        let subscription = insert_subscription(&ctx).await;

        let mut usecase = CancelSubscriptionUseCase {
            subscription_id: subscription.id.clone(),
        };
        let res = usecase.execute(&ctx).await.unwrap();
        assert_eq!(res.status, SubscriptionStatus::Cancelled);

        let stored = ctx.repos.subscriptions.find(&subscription.id).await.unwrap();
        assert_eq!(stored.status, SubscriptionStatus::Cancelled);

        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::AlreadyCancelled(_))
        ));
    }
}
