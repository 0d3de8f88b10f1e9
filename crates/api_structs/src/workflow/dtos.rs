use serde::{Deserialize, Serialize};
use subtrack_domain::{Checkpoint, RunFailure, RunStatus, Step, WorkflowRun, ID};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedStepDTO {
    pub step: Step,
    pub label: String,
    pub completed_at: i64,
}

impl CompletedStepDTO {
    pub fn new(checkpoint: Checkpoint) -> Self {
        Self {
            label: checkpoint.step.label(),
            step: checkpoint.step,
            completed_at: checkpoint.completed_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRunDTO {
    pub id: ID,
    pub subscription_id: ID,
    pub status: RunStatus,
    pub wake_at: Option<i64>,
    pub completed_steps: Vec<CompletedStepDTO>,
    pub failure: Option<RunFailure>,
    pub created: i64,
    pub updated: i64,
}

impl WorkflowRunDTO {
    pub fn new(run: WorkflowRun) -> Self {
        Self {
            id: run.id,
            subscription_id: run.subscription_id,
            status: run.status,
            wake_at: run.wake_at,
            completed_steps: run
                .checkpoints
                .into_iter()
                .map(CompletedStepDTO::new)
                .collect(),
            failure: run.failure,
            created: run.created,
            updated: run.updated,
        }
    }
}
