mod base;
mod status;
mod subscription;
mod user;
mod workflow;

pub(crate) use base::BaseClient;
pub use base::{APIError, APIErrorVariant, APIResponse};
pub use reqwest::StatusCode;
use status::StatusClient;
use std::sync::Arc;
use subscription::SubscriptionClient;
pub use subscription::{CreateSubscriptionInput, UpdateSubscriptionInput};
pub use subtrack_api_structs::dtos::*;
pub use subtrack_domain::{
    Category, Currency, FailureKind, Frequency, PaymentMethod, Plan, RunFailure, RunStatus, Step,
    SubscriptionStatus, ID,
};
use user::UserClient;
pub use user::CreateUserInput;
use workflow::WorkflowClient;

// Domain
pub use subtrack_api_structs::dtos::SubscriptionDTO as Subscription;
pub use subtrack_api_structs::dtos::UserDTO as User;
pub use subtrack_api_structs::dtos::WorkflowRunDTO as WorkflowRun;

/// Subtrack Server SDK
///
/// The SDK contains methods for interacting with the Subtrack server
/// API.
#[derive(Clone)]
pub struct SubtrackSDK {
    pub status: StatusClient,
    pub subscription: SubscriptionClient,
    pub user: UserClient,
    pub workflow: WorkflowClient,
}

impl SubtrackSDK {
    pub fn new(address: String) -> Self {
        let base = Arc::new(BaseClient::new(address));
        let status = StatusClient::new(base.clone());
        let subscription = SubscriptionClient::new(base.clone());
        let user = UserClient::new(base.clone());
        let workflow = WorkflowClient::new(base);

        Self {
            status,
            subscription,
            user,
            workflow,
        }
    }
}
