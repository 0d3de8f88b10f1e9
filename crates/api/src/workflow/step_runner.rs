use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use subtrack_domain::{FailureKind, RunFailure, Step, WorkflowRun, WorkflowRunError};
use subtrack_infra::SubtrackContext;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum StepError {
    /// Not a failure. The run is sleeping and the workflow body has to unwind.
    #[error("Workflow run is suspended until {wake_at}")]
    Suspended { wake_at: i64 },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unable to dispatch reminder: {0}")]
    DispatchFailure(String),
    #[error("Unable to store workflow run: {0}")]
    Storage(String),
    #[error("Workflow run is in an invalid state: {0}")]
    Internal(String),
}

impl StepError {
    /// The `RunFailure` a run is failed with when the workflow body returns this error.
    /// `None` for suspensions.
    pub fn into_failure(self, step: Option<Step>) -> Option<RunFailure> {
        let kind = match &self {
            Self::Suspended { .. } => return None,
            Self::NotFound(_) => FailureKind::NotFound,
            Self::DispatchFailure(_) => FailureKind::DispatchFailure,
            Self::Storage(_) => FailureKind::Storage,
            Self::Internal(_) => FailureKind::Internal,
        };
        Some(RunFailure::new(kind, self.to_string(), step))
    }
}

impl From<WorkflowRunError> for StepError {
    fn from(e: WorkflowRunError) -> Self {
        Self::Internal(e.to_string())
    }
}

/// Gives a workflow body durable steps on top of a `WorkflowRun`.
///
/// The body is replayed from the start every time the run is resumed. Every
/// step that already has a checkpoint returns the recorded output without
/// doing any work, so the body continues exactly where it left off.
pub struct DurableContext<'a> {
    run: WorkflowRun,
    ctx: &'a SubtrackContext,
    failed_step: Option<Step>,
}

impl<'a> DurableContext<'a> {
    pub fn new(run: WorkflowRun, ctx: &'a SubtrackContext) -> Self {
        Self {
            run,
            ctx,
            failed_step: None,
        }
    }

    pub fn ctx(&self) -> &'a SubtrackContext {
        self.ctx
    }

    pub fn run(&self) -> &WorkflowRun {
        &self.run
    }

    pub fn is_checkpointed(&self, step: &Step) -> bool {
        self.run.checkpoint(step).is_some()
    }

    /// Gives back the run together with the step that failed, if any
    pub fn finish(self) -> (WorkflowRun, Option<Step>) {
        (self.run, self.failed_step)
    }

    /// Executes `work` at most once for the lifetime of the run. The output is
    /// checkpointed and the run saved before it is returned. Failures are not
    /// checkpointed, so a retried run executes the step again.
    pub async fn run_step<T, F, Fut>(&mut self, step: Step, work: F) -> Result<T, StepError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, StepError>>,
    {
        if let Some(checkpoint) = self.run.checkpoint(&step) {
            debug!("Replaying step `{}` from checkpoint", step.label());
            return serde_json::from_value(checkpoint.output.clone()).map_err(|e| {
                StepError::Internal(format!(
                    "Checkpoint of step `{}` could not be read: {}",
                    step.label(),
                    e
                ))
            });
        }

        self.enter_phase(&step).await?;

        let output = match work().await {
            Ok(output) => output,
            Err(e) => {
                self.failed_step = Some(step);
                return Err(e);
            }
        };

        let value = serde_json::to_value(&output).map_err(|e| {
            StepError::Internal(format!(
                "Output of step `{}` could not be recorded: {}",
                step.label(),
                e
            ))
        })?;
        let now = self.ctx.sys.get_timestamp_millis();
        self.run.record_checkpoint(step, value, now)?;
        self.persist().await?;

        Ok(output)
    }

    /// Continues once `wake_at` has been reached and returns the instant the run
    /// was observed awake. Before that the run is suspended and
    /// `StepError::Suspended` is returned, which the body must propagate.
    pub async fn sleep_until(&mut self, step: Step, wake_at: i64) -> Result<i64, StepError> {
        if let Some(checkpoint) = self.run.checkpoint(&step) {
            return serde_json::from_value(checkpoint.output.clone()).map_err(|e| {
                StepError::Internal(format!(
                    "Checkpoint of step `{}` could not be read: {}",
                    step.label(),
                    e
                ))
            });
        }

        let now = self.ctx.sys.get_timestamp_millis();
        if now < wake_at {
            info!(
                "Workflow run {} is going to sleep until {} for step `{}`",
                self.run.id,
                wake_at,
                step.label()
            );
            self.run.suspend(wake_at, now)?;
            self.persist().await?;
            return Err(StepError::Suspended { wake_at });
        }

        self.run
            .record_checkpoint(step, serde_json::json!(now), now)?;
        self.persist().await?;

        Ok(now)
    }

    async fn enter_phase(&mut self, step: &Step) -> Result<(), StepError> {
        let phase = step.phase();
        if self.run.status == phase {
            return Ok(());
        }
        let now = self.ctx.sys.get_timestamp_millis();
        self.run.transition(phase, now)?;
        self.persist().await
    }

    async fn persist(&self) -> Result<(), StepError> {
        self.ctx
            .repos
            .workflow_runs
            .save(&self.run)
            .await
            .map_err(|e| StepError::Storage(e.to_string()))
    }
}
