use super::execute_run::spawn_workflow_run;
use crate::{
    error::SubtrackError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use subtrack_api_structs::retry_workflow_run::*;
use subtrack_domain::{WorkflowRun, ID};
use subtrack_infra::SubtrackContext;

pub async fn retry_workflow_run_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<SubtrackContext>,
) -> Result<HttpResponse, SubtrackError> {
    let usecase = RetryWorkflowRunUseCase {
        run_id: path_params.run_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|run| HttpResponse::Accepted().json(APIResponse::new(run)))
        .map_err(SubtrackError::from)
}

/// Re-queues a failed run. Its successful steps are kept, so only the
/// step that failed and the ones after it are executed again. Concurrent
/// retries of the same run start at most one execution.
#[derive(Debug)]
struct RetryWorkflowRunUseCase {
    run_id: ID,
}

#[derive(Debug)]
enum UseCaseError {
    NotFound(ID),
    NotRetryable(ID),
    StorageError,
}

impl From<UseCaseError> for SubtrackError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(id) => {
                Self::NotFound(format!("A workflow run with id: {}, was not found.", id))
            }
            UseCaseError::NotRetryable(id) => Self::Conflict(format!(
                "The workflow run with id: {}, has not failed with a retryable failure.",
                id
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for RetryWorkflowRunUseCase {
    type Response = WorkflowRun;
    type Error = UseCaseError;

    const NAME: &'static str = "RetryWorkflowRun";

    async fn execute(&mut self, ctx: &SubtrackContext) -> Result<Self::Response, Self::Error> {
        let claimed = ctx
            .repos
            .workflow_runs
            .claim_retry(&self.run_id, ctx.sys.get_timestamp_millis())
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        match claimed {
            Some(run) => {
                spawn_workflow_run(run.clone(), ctx.clone());
                Ok(run)
            }
            None => match ctx.repos.workflow_runs.find(&self.run_id).await {
                Some(_) => Err(UseCaseError::NotRetryable(self.run_id.clone())),
                None => Err(UseCaseError::NotFound(self.run_id.clone())),
            },
        }
    }
}
