use crate::error::SubtrackError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use subtrack_api_structs::create_user::*;
use subtrack_domain::User;
use subtrack_infra::SubtrackContext;

pub async fn create_user_controller(
    body: web::Json<RequestBody>,
    ctx: web::Data<SubtrackContext>,
) -> Result<HttpResponse, SubtrackError> {
    let body = body.0;
    let usecase = CreateUserUseCase {
        name: body.name,
        email: body.email,
    };

    execute(usecase, &ctx)
        .await
        .map(|usecase_res| HttpResponse::Created().json(APIResponse::new(usecase_res.user)))
        .map_err(SubtrackError::from)
}

#[derive(Debug)]
pub struct CreateUserUseCase {
    pub name: String,
    pub email: String,
}

#[derive(Debug)]
pub struct UseCaseRes {
    pub user: User,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
    InvalidEmail(String),
    EmptyName,
    EmailAlreadyInUse(String),
}

impl From<UseCaseError> for SubtrackError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError => Self::InternalError,
            UseCaseError::InvalidEmail(email) => {
                Self::BadClientData(format!("The provided email: {}, is not valid.", email))
            }
            UseCaseError::EmptyName => Self::BadClientData("A user must have a name.".into()),
            UseCaseError::EmailAlreadyInUse(email) => Self::Conflict(format!(
                "A user with the email: {}, already exists.",
                email
            )),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateUserUseCase {
    type Response = UseCaseRes;
    type Error = UseCaseError;

    const NAME: &'static str = "CreateUser";

    async fn execute(&mut self, ctx: &SubtrackContext) -> Result<Self::Response, Self::Error> {
        let user = User::new(
            self.name.trim().to_string(),
            self.email.trim().to_lowercase(),
        );
        if user.name.is_empty() {
            return Err(UseCaseError::EmptyName);
        }
        if !user.has_valid_email() {
            return Err(UseCaseError::InvalidEmail(user.email));
        }

        if ctx.repos.users.find_by_email(&user.email).await.is_some() {
            return Err(UseCaseError::EmailAlreadyInUse(user.email));
        }

        ctx.repos
            .users
            .insert(&user)
            .await
            .map(|_| UseCaseRes { user })
            .map_err(|_| UseCaseError::StorageError)
    }
}
