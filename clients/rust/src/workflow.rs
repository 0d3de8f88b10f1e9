use crate::{APIResponse, BaseClient, ID};
use reqwest::StatusCode;
use std::sync::Arc;
use subtrack_api_structs::*;

#[derive(Clone)]
pub struct WorkflowClient {
    base: Arc<BaseClient>,
}

impl WorkflowClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    /// Starts a renewal reminder run. The response only confirms that the
    /// run was started.
    pub async fn trigger_reminders(
        &self,
        subscription_id: ID,
    ) -> APIResponse<trigger_reminder_workflow::APIResponse> {
        let body = trigger_reminder_workflow::RequestBody { subscription_id };
        self.base
            .post(
                body,
                "workflows/subscription/reminder".into(),
                StatusCode::ACCEPTED,
            )
            .await
    }

    pub async fn get_run(&self, run_id: ID) -> APIResponse<get_workflow_run::APIResponse> {
        self.base
            .get(format!("workflows/{}", run_id), StatusCode::OK)
            .await
    }

    pub async fn retry_run(&self, run_id: ID) -> APIResponse<retry_workflow_run::APIResponse> {
        self.base
            .post(
                (),
                format!("workflows/{}/retry", run_id),
                StatusCode::ACCEPTED,
            )
            .await
    }
}
