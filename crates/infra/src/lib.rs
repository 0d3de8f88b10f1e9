mod config;
mod repos;
mod services;
mod system;

pub use config::{Config, ReminderWebhookConfig};
pub use repos::{ISubscriptionRepo, IUserRepo, IWorkflowRunRepo, Repos};
pub use services::*;
use std::sync::Arc;
pub use system::{ISys, StaticTimeSys};
use system::RealSys;
use tracing::warn;

#[derive(Clone)]
pub struct SubtrackContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub notifier: Arc<dyn IReminderNotifier>,
}

struct ContextParams {
    pub postgres_connection_string: String,
}

impl SubtrackContext {
    async fn create(params: ContextParams) -> Self {
        let repos = Repos::create_postgres(&params.postgres_connection_string)
            .await
            .expect("Postgres credentials must be set and valid");
        Self::with_repos(repos)
    }

    fn with_repos(repos: Repos) -> Self {
        let config = Config::new();
        let notifier =
            create_reminder_notifier(&config).expect("Reminder notifier must be configured correctly");
        Self {
            repos,
            config,
            sys: Arc::new(RealSys {}),
            notifier,
        }
    }

    pub fn create_inmemory() -> Self {
        Self::with_repos(Repos::create_inmemory())
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> SubtrackContext {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    match std::env::var(PSQL_CONNECTION_STRING) {
        Ok(postgres_connection_string) => {
            SubtrackContext::create(ContextParams {
                postgres_connection_string,
            })
            .await
        }
        Err(_) => {
            warn!(
                "{} env var was not found. Everything will be stored in memory and lost on restart.",
                PSQL_CONNECTION_STRING
            );
            SubtrackContext::create_inmemory()
        }
    }
}
