use super::IWorkflowRunRepo;
use crate::repos::shared::inmemory_repo::*;
use subtrack_domain::{WorkflowRun, ID};

pub struct InMemoryWorkflowRunRepo {
    runs: std::sync::Mutex<Vec<WorkflowRun>>,
}

impl InMemoryWorkflowRunRepo {
    pub fn new() -> Self {
        Self {
            runs: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IWorkflowRunRepo for InMemoryWorkflowRunRepo {
    async fn insert(&self, run: &WorkflowRun) -> anyhow::Result<()> {
        insert(run, &self.runs);
        Ok(())
    }

    async fn save(&self, run: &WorkflowRun) -> anyhow::Result<()> {
        save(run, &self.runs);
        Ok(())
    }

    async fn find(&self, run_id: &ID) -> Option<WorkflowRun> {
        find(run_id, &self.runs)
    }

    async fn find_by_subscription(&self, subscription_id: &ID) -> Vec<WorkflowRun> {
        find_by(&self.runs, |r| r.subscription_id == *subscription_id)
    }

    async fn claim_due(&self, now: i64, stale_before: i64) -> anyhow::Result<Vec<WorkflowRun>> {
        let claimed = find_and_update_by(
            &self.runs,
            |r| r.is_due(now) || r.is_orphaned(stale_before),
            |r| {
                r.claim(now, stale_before);
            },
        );
        Ok(claimed)
    }

    async fn claim_retry(&self, run_id: &ID, now: i64) -> anyhow::Result<Option<WorkflowRun>> {
        let claimed = find_and_update_by(
            &self.runs,
            |r| r.id == *run_id && r.is_retryable(),
            |r| {
                let _ = r.retry(now);
            },
        );
        Ok(claimed.into_iter().next())
    }
}
