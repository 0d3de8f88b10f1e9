use super::execute_run::execute_workflow_run;
use crate::shared::usecase::UseCase;
use futures::future::join_all;
use subtrack_infra::SubtrackContext;
use tracing::{info, info_span};
use tracing_futures::Instrument;

/// Claims every sleeping workflow run whose wake time has been reached, and
/// every run that was abandoned mid execution, and replays them concurrently.
#[derive(Debug)]
pub struct ResumeDueWorkflowRunsUseCase {}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

#[derive(Debug, PartialEq)]
pub struct UseCaseRes {
    pub resumed: usize,
    pub failed: usize,
}

#[async_trait::async_trait(?Send)]
impl UseCase for ResumeDueWorkflowRunsUseCase {
    type Response = UseCaseRes;
    type Error = UseCaseError;

    const NAME: &'static str = "ResumeDueWorkflowRuns";

    async fn execute(&mut self, ctx: &SubtrackContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.get_timestamp_millis();
        let stale_before = now - (ctx.config.workflow_orphan_timeout_secs as i64) * 1000;

        let runs = ctx
            .repos
            .workflow_runs
            .claim_due(now, stale_before)
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        if runs.is_empty() {
            return Ok(UseCaseRes {
                resumed: 0,
                failed: 0,
            });
        }
        info!("Resuming {} workflow runs", runs.len());

        let executions = runs.into_iter().map(|run| {
            let span = info_span!("Workflow run", run_id = %run.id, subscription_id = %run.subscription_id);
            execute_workflow_run(run, ctx).instrument(span)
        });
        let results = join_all(executions).await;

        Ok(UseCaseRes {
            resumed: results.len(),
            failed: results.iter().filter(|res| res.is_err()).count(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Arc;
    use subtrack_domain::{RunStatus, WorkflowRun};
    use subtrack_infra::StaticTimeSys;

    #[actix_web::main]
    #[test]
    async fn resumes_due_runs_only() {
        let mut ctx = SubtrackContext::create_inmemory();
        let sys = Arc::new(StaticTimeSys::new(1000));
        ctx.sys = sys.clone();

        let mut due = WorkflowRun::new(Default::default(), 0);
        due.transition(RunStatus::Deriving, 0).unwrap();
        due.suspend(500, 1000).unwrap();
        let mut not_due = due.clone();
        not_due.id = Default::default();
        not_due.wake_at = Some(5000);
        for run in &[&due, &not_due] {
            ctx.repos.workflow_runs.insert(run).await.unwrap();
        }

        let mut usecase = ResumeDueWorkflowRunsUseCase {};
        let res = usecase.execute(&ctx).await.unwrap();
        // The subscription of the run does not exist
        assert_eq!(
            res,
            UseCaseRes {
                resumed: 1,
                failed: 1
            }
        );

        let due = ctx.repos.workflow_runs.find(&due.id).await.unwrap();
        assert_eq!(due.status, RunStatus::Failed);
        let not_due = ctx.repos.workflow_runs.find(&not_due.id).await.unwrap();
        assert_eq!(not_due.status, RunStatus::Sleeping);
    }
}
