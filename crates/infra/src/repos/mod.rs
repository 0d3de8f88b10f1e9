mod shared;
mod subscription;
mod user;
mod workflow_run;

use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use subscription::ISubscriptionRepo;
use subscription::{InMemorySubscriptionRepo, PostgresSubscriptionRepo};
use tracing::info;
pub use user::IUserRepo;
use user::{InMemoryUserRepo, PostgresUserRepo};
pub use workflow_run::IWorkflowRunRepo;
use workflow_run::{InMemoryWorkflowRunRepo, PostgresWorkflowRunRepo};

#[derive(Clone)]
pub struct Repos {
    pub users: Arc<dyn IUserRepo>,
    pub subscriptions: Arc<dyn ISubscriptionRepo>,
    pub workflow_runs: Arc<dyn IWorkflowRunRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;

        info!("DB CHECKING CONNECTION ...");
        sqlx::migrate!().run(&pool).await?;
        info!("DB CHECKING CONNECTION ... [done]");

        Ok(Self {
            users: Arc::new(PostgresUserRepo::new(pool.clone())),
            subscriptions: Arc::new(PostgresSubscriptionRepo::new(pool.clone())),
            workflow_runs: Arc::new(PostgresWorkflowRunRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepo::new()),
            subscriptions: Arc::new(InMemorySubscriptionRepo::new()),
            workflow_runs: Arc::new(InMemoryWorkflowRunRepo::new()),
        }
    }
}
