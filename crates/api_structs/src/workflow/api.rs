use crate::dtos::WorkflowRunDTO;
use serde::{Deserialize, Serialize};
use subtrack_domain::{WorkflowRun, ID};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRunResponse {
    pub workflow_run: WorkflowRunDTO,
}

impl WorkflowRunResponse {
    pub fn new(run: WorkflowRun) -> Self {
        Self {
            workflow_run: WorkflowRunDTO::new(run),
        }
    }
}

pub mod trigger_reminder_workflow {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub subscription_id: ID,
    }

    /// Only confirms that the run was started, not that any reminder was delivered
    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub workflow_run_id: ID,
    }
}

pub mod get_workflow_run {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub run_id: ID,
    }

    pub type APIResponse = WorkflowRunResponse;
}

pub mod retry_workflow_run {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub run_id: ID,
    }

    pub type APIResponse = WorkflowRunResponse;
}
