mod inmemory;
mod postgres;

pub use inmemory::InMemoryWorkflowRunRepo;
pub use postgres::PostgresWorkflowRunRepo;
use subtrack_domain::{WorkflowRun, ID};

/// Durable storage of `WorkflowRun`s and their checkpoint logs.
///
/// A sleeping run is nothing more than a row with a `wake_at` timestamp, so
/// this repo doubles as the timer registry the job scheduler polls.
#[async_trait::async_trait]
pub trait IWorkflowRunRepo: Send + Sync {
    async fn insert(&self, run: &WorkflowRun) -> anyhow::Result<()>;
    async fn save(&self, run: &WorkflowRun) -> anyhow::Result<()>;
    async fn find(&self, run_id: &ID) -> Option<WorkflowRun>;
    async fn find_by_subscription(&self, subscription_id: &ID) -> Vec<WorkflowRun>;
    /// Atomically claims every sleeping run with `wake_at <= now`, moving it to
    /// `Dispatching`, together with every unfinished run not updated since
    /// `stale_before`. A run is only ever handed out to one caller at a time.
    async fn claim_due(&self, now: i64, stale_before: i64) -> anyhow::Result<Vec<WorkflowRun>>;
    /// Atomically moves a run that failed with a retryable failure back to
    /// `Created`. Returns `None` if the run does not exist or cannot be retried,
    /// so only one of several concurrent retries gets the run.
    async fn claim_retry(&self, run_id: &ID, now: i64) -> anyhow::Result<Option<WorkflowRun>>;
}
