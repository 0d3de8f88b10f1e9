use crate::{
    error::SubtrackError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use subtrack_api_structs::get_workflow_run::*;
use subtrack_domain::{WorkflowRun, ID};
use subtrack_infra::SubtrackContext;

pub async fn get_workflow_run_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<SubtrackContext>,
) -> Result<HttpResponse, SubtrackError> {
    let usecase = GetWorkflowRunUseCase {
        run_id: path_params.run_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|run| HttpResponse::Ok().json(APIResponse::new(run)))
        .map_err(SubtrackError::from)
}

#[derive(Debug)]
struct GetWorkflowRunUseCase {
    run_id: ID,
}

#[derive(Debug)]
enum UseCaseError {
    NotFound(ID),
}

impl From<UseCaseError> for SubtrackError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(id) => {
                Self::NotFound(format!("A workflow run with id: {}, was not found.", id))
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetWorkflowRunUseCase {
    type Response = WorkflowRun;
    type Error = UseCaseError;

    const NAME: &'static str = "GetWorkflowRun";

    async fn execute(&mut self, ctx: &SubtrackContext) -> Result<Self::Response, Self::Error> {
        ctx.repos
            .workflow_runs
            .find(&self.run_id)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.run_id.clone()))
    }
}
