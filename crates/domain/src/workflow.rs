use crate::{
    reminder::ReminderOffset,
    shared::entity::{Entity, ID},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The kinds of steps a reminder workflow is made of. Checkpoints are
/// keyed by `Step`, so two different kinds of steps can never be mistaken
/// for each other when a run is replayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Step {
    FetchSubscription,
    DeriveSchedule,
    Sleep { offset: ReminderOffset },
    Dispatch { offset: ReminderOffset },
}

impl Step {
    pub fn label(&self) -> String {
        match self {
            Self::FetchSubscription => "get subscription".into(),
            Self::DeriveSchedule => "derive schedule".into(),
            Self::Sleep { offset } => format!("sleep until {}", offset.label()),
            Self::Dispatch { offset } => offset.label(),
        }
    }

    /// The `RunStatus` a run is in while the work of this step executes
    pub fn phase(&self) -> RunStatus {
        match self {
            Self::FetchSubscription | Self::DeriveSchedule => RunStatus::Deriving,
            Self::Sleep { .. } | Self::Dispatch { .. } => RunStatus::Dispatching,
        }
    }
}

/// A durably recorded step result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub step: Step,
    pub output: serde_json::Value,
    pub completed_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunStatus {
    Created,
    Deriving,
    Dispatching,
    Sleeping,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn can_transition_to(&self, next: RunStatus) -> bool {
        use RunStatus::*;

        if *self == next {
            return !self.is_terminal();
        }
        matches!(
            (self, next),
            (Created, Deriving)
                | (Created, Failed)
                | (Deriving, Dispatching)
                | (Deriving, Sleeping)
                | (Deriving, Completed)
                | (Deriving, Failed)
                | (Dispatching, Sleeping)
                | (Dispatching, Completed)
                | (Dispatching, Failed)
                | (Sleeping, Dispatching)
                | (Sleeping, Failed)
                | (Failed, Created)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    /// The subscription or its owner is gone, this cannot resolve itself
    NotFound,
    /// The notifier failed
    DispatchFailure,
    /// The checkpoint or subscription store failed
    Storage,
    /// The run or one of its checkpoints is in a state the workflow cannot continue from
    Internal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunFailure {
    pub kind: FailureKind,
    pub message: String,
    pub retryable: bool,
    /// The step that failed, if the failure happened inside of a step
    pub step: Option<Step>,
}

impl RunFailure {
    pub fn new(kind: FailureKind, message: String, step: Option<Step>) -> Self {
        Self {
            retryable: matches!(kind, FailureKind::DispatchFailure | FailureKind::Storage),
            kind,
            message,
            step,
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum WorkflowRunError {
    #[error("Invalid workflow run transition from {from:?} to {to:?}")]
    InvalidTransition { from: RunStatus, to: RunStatus },
    #[error("Workflow run is sleeping until {wake_at} and cannot be woken at {now}")]
    NotDue { wake_at: i64, now: i64 },
    #[error("Workflow run failure is not retryable")]
    NotRetryable,
    #[error("Step `{0}` has already been checkpointed")]
    DuplicateCheckpoint(String),
}

/// The persisted state of one reminder workflow execution: its status and the
/// ordered log of checkpointed steps the workflow body is replayed against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRun {
    pub id: ID,
    pub subscription_id: ID,
    pub status: RunStatus,
    /// When `Sleeping`, the earliest timestamp in millis the run may be resumed at
    pub wake_at: Option<i64>,
    pub checkpoints: Vec<Checkpoint>,
    pub failure: Option<RunFailure>,
    pub created: i64,
    pub updated: i64,
}

impl WorkflowRun {
    pub fn new(subscription_id: ID, now: i64) -> Self {
        Self {
            id: Default::default(),
            subscription_id,
            status: RunStatus::Created,
            wake_at: None,
            checkpoints: Vec::new(),
            failure: None,
            created: now,
            updated: now,
        }
    }

    pub fn checkpoint(&self, step: &Step) -> Option<&Checkpoint> {
        self.checkpoints.iter().find(|c| &c.step == step)
    }

    pub fn record_checkpoint(
        &mut self,
        step: Step,
        output: serde_json::Value,
        now: i64,
    ) -> Result<(), WorkflowRunError> {
        if self.checkpoint(&step).is_some() {
            return Err(WorkflowRunError::DuplicateCheckpoint(step.label()));
        }
        self.checkpoints.push(Checkpoint {
            step,
            output,
            completed_at: now,
        });
        self.updated = now;
        Ok(())
    }

    pub fn transition(&mut self, next: RunStatus, now: i64) -> Result<(), WorkflowRunError> {
        if !self.status.can_transition_to(next) {
            return Err(WorkflowRunError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated = now;
        Ok(())
    }

    pub fn suspend(&mut self, wake_at: i64, now: i64) -> Result<(), WorkflowRunError> {
        self.transition(RunStatus::Sleeping, now)?;
        self.wake_at = Some(wake_at);
        Ok(())
    }

    pub fn is_due(&self, now: i64) -> bool {
        self.status == RunStatus::Sleeping && self.wake_at.map(|ts| ts <= now).unwrap_or(false)
    }

    /// A run that is neither sleeping nor finished but has not been touched since
    /// `stale_before` was abandoned by a process that went away mid execution.
    pub fn is_orphaned(&self, stale_before: i64) -> bool {
        matches!(
            self.status,
            RunStatus::Created | RunStatus::Deriving | RunStatus::Dispatching
        ) && self.updated <= stale_before
    }

    /// Takes ownership of a due or orphaned run so that it can be replayed.
    /// Returns false if the run is not ready to be resumed.
    pub fn claim(&mut self, now: i64, stale_before: i64) -> bool {
        if self.is_due(now) {
            return self.wake(now).is_ok();
        }
        if self.is_orphaned(stale_before) {
            self.updated = now;
            return true;
        }
        false
    }

    /// Moves a sleeping run back to `Dispatching`. Never earlier than its wake time.
    pub fn wake(&mut self, now: i64) -> Result<(), WorkflowRunError> {
        if self.status == RunStatus::Sleeping && !self.is_due(now) {
            return Err(WorkflowRunError::NotDue {
                wake_at: self.wake_at.unwrap_or_default(),
                now,
            });
        }
        self.transition(RunStatus::Dispatching, now)?;
        self.wake_at = None;
        Ok(())
    }

    pub fn complete(&mut self, now: i64) -> Result<(), WorkflowRunError> {
        self.transition(RunStatus::Completed, now)?;
        self.wake_at = None;
        Ok(())
    }

    pub fn fail(&mut self, failure: RunFailure, now: i64) -> Result<(), WorkflowRunError> {
        self.transition(RunStatus::Failed, now)?;
        self.wake_at = None;
        self.failure = Some(failure);
        Ok(())
    }

    pub fn is_retryable(&self) -> bool {
        self.status == RunStatus::Failed
            && self.failure.as_ref().map(|f| f.retryable).unwrap_or(false)
    }

    /// Re-queues a failed run. Only successful steps were checkpointed, so the
    /// failed step is executed again when the run is replayed.
    pub fn retry(&mut self, now: i64) -> Result<(), WorkflowRunError> {
        if !self.is_retryable() {
            return Err(WorkflowRunError::NotRetryable);
        }
        self.transition(RunStatus::Created, now)?;
        self.failure = None;
        Ok(())
    }
}

impl Entity for WorkflowRun {
    fn id(&self) -> &ID {
        &self.id
    }
}
