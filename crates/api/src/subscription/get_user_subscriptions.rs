use crate::{
    error::SubtrackError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use subtrack_api_structs::get_user_subscriptions::*;
use subtrack_domain::{Subscription, ID};
use subtrack_infra::SubtrackContext;

pub async fn get_user_subscriptions_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<SubtrackContext>,
) -> Result<HttpResponse, SubtrackError> {
    let usecase = GetUserSubscriptionsUseCase {
        user_id: path_params.user_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|subscriptions| HttpResponse::Ok().json(APIResponse::new(subscriptions)))
        .map_err(SubtrackError::from)
}

#[derive(Debug)]
struct GetUserSubscriptionsUseCase {
    user_id: ID,
}

#[derive(Debug)]
enum UseCaseError {
    UserNotFound(ID),
}

impl From<UseCaseError> for SubtrackError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::UserNotFound(id) => {
                Self::NotFound(format!("A user with id: {}, was not found.", id))
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetUserSubscriptionsUseCase {
    type Response = Vec<Subscription>;
    type Error = UseCaseError;

    const NAME: &'static str = "GetUserSubscriptions";

    async fn execute(&mut self, ctx: &SubtrackContext) -> Result<Self::Response, Self::Error> {
        if ctx.repos.users.find(&self.user_id).await.is_none() {
            return Err(UseCaseError::UserNotFound(self.user_id.clone()));
        }

        Ok(ctx.repos.subscriptions.find_by_user(&self.user_id).await)
    }
}
