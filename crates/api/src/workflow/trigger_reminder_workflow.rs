use super::execute_run::spawn_workflow_run;
use crate::error::SubtrackError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use subtrack_api_structs::trigger_reminder_workflow::*;
use subtrack_domain::{WorkflowRun, ID};
use subtrack_infra::SubtrackContext;

pub async fn trigger_reminder_workflow_controller(
    body: web::Json<RequestBody>,
    ctx: web::Data<SubtrackContext>,
) -> Result<HttpResponse, SubtrackError> {
    let usecase = StartReminderWorkflowUseCase {
        subscription_id: body.0.subscription_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|run| {
            HttpResponse::Accepted().json(APIResponse {
                workflow_run_id: run.id,
            })
        })
        .map_err(SubtrackError::from)
}

/// Starts a new run of the renewal reminder workflow for a `Subscription`.
///
/// The run is stored before it is executed in the background, so a response
/// only confirms that the run was started. Triggering twice starts two runs.
#[derive(Debug)]
pub struct StartReminderWorkflowUseCase {
    pub subscription_id: ID,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
    SubscriptionNotFound(ID),
}

impl From<UseCaseError> for SubtrackError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError => Self::InternalError,
            UseCaseError::SubscriptionNotFound(id) => {
                Self::NotFound(format!("A subscription with id: {}, was not found.", id))
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for StartReminderWorkflowUseCase {
    type Response = WorkflowRun;
    type Error = UseCaseError;

    const NAME: &'static str = "StartReminderWorkflow";

    async fn execute(&mut self, ctx: &SubtrackContext) -> Result<Self::Response, Self::Error> {
        if ctx
            .repos
            .subscriptions
            .find(&self.subscription_id)
            .await
            .is_none()
        {
            return Err(UseCaseError::SubscriptionNotFound(
                self.subscription_id.clone(),
            ));
        }

        let run = WorkflowRun::new(
            self.subscription_id.clone(),
            ctx.sys.get_timestamp_millis(),
        );
        ctx.repos
            .workflow_runs
            .insert(&run)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        spawn_workflow_run(run.clone(), ctx.clone());

        Ok(run)
    }
}
