use crate::{
    shared::usecase::execute,
    workflow::resume_due_runs::ResumeDueWorkflowRunsUseCase,
};
use actix_web::rt::time::interval;
use std::time::Duration;
use subtrack_infra::SubtrackContext;
use tracing::warn;

/// Periodically resumes the sleeping workflow runs that are due
pub fn start_resume_workflow_runs_job(ctx: SubtrackContext) {
    actix_web::rt::spawn(async move {
        let mut interval = interval(Duration::from_secs(ctx.config.workflow_poll_interval_secs));
        loop {
            interval.tick().await;

            let usecase = ResumeDueWorkflowRunsUseCase {};
            if let Ok(res) = execute(usecase, &ctx).await {
                if res.failed > 0 {
                    warn!(
                        "{} of {} resumed workflow runs failed",
                        res.failed, res.resumed
                    );
                }
            }
        }
    });
}
